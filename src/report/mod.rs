//! The unified report and the metric names that address its fields.

mod metric_name;
mod unified_report;

pub use metric_name::{MetricKind, MetricName, Week};
pub use unified_report::{PageEntry, SourceEntry, UnifiedReport};
