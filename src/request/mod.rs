//! Describing what to ask a provider for.
//!
//! A [`RequestDescriptor`] is one metric query carrying the [`MetricName`](crate::MetricName)
//! that later selects its mapper. A [`RequestBatch`] groups the descriptors of one reporting
//! run; [`RequestBatch::standard_http`] and [`RequestBatch::standard_reporting`] build the six
//! queries behind the weekly dashboard.

mod batch;
mod date_range;
mod descriptor;

pub use batch::{RequestBatch, TOP_LIMIT};
pub use date_range::DateRange;
pub use descriptor::{Endpoint, HttpQuery, PAGE_PROPERTY, ReportingQuery, RequestDescriptor, SOURCE_PROPERTY};
