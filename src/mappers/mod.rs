//! Folding raw provider results into a [`UnifiedReport`].
//!
//! Each provider has its own family of six mappers, one per [`MetricName`]. A mapper takes
//! the report built so far plus one raw result and returns the report with exactly one
//! field updated. The table is an exhaustive `match`, so adding a metric without a mapper
//! does not compile.

mod http;
mod reporting;

use crate::Result;
use crate::providers::{NamedResult, ProviderKind, RawResult};
use crate::report::{MetricName, UnifiedReport};

/// A pure fold step for one metric.
pub type MapFn = fn(UnifiedReport, &RawResult) -> Result<UnifiedReport>;

/// The mapper that folds `name` results of the `kind` provider.
#[must_use]
pub const fn mapper_for(kind: ProviderKind, name: MetricName) -> MapFn {
    match kind {
        ProviderKind::Http => match name {
            MetricName::VisitorsThisWeek => http::visitors_this_week,
            MetricName::VisitorsLastWeek => http::visitors_last_week,
            MetricName::MostVisitedPagesThisWeek => http::most_visited_pages_this_week,
            MetricName::MostVisitedPagesLastWeek => http::most_visited_pages_last_week,
            MetricName::TopSourcesThisWeek => http::top_sources_this_week,
            MetricName::TopSourcesLastWeek => http::top_sources_last_week,
        },
        ProviderKind::Reporting => match name {
            MetricName::VisitorsThisWeek => reporting::visitors_this_week,
            MetricName::VisitorsLastWeek => reporting::visitors_last_week,
            MetricName::MostVisitedPagesThisWeek => reporting::most_visited_pages_this_week,
            MetricName::MostVisitedPagesLastWeek => reporting::most_visited_pages_last_week,
            MetricName::TopSourcesThisWeek => reporting::top_sources_this_week,
            MetricName::TopSourcesLastWeek => reporting::top_sources_last_week,
        },
    }
}

/// Look up a mapper by its textual report name.
///
/// Fails with a mapping error naming `name` when it is not one of the known metrics.
pub fn mapper_for_name(kind: ProviderKind, name: &str) -> Result<MapFn> {
    MetricName::parse(name).map(|name| mapper_for(kind, name))
}

/// Fold one named result into `report` with the `kind` provider's mapper.
pub fn apply(kind: ProviderKind, report: UnifiedReport, result: &NamedResult) -> Result<UnifiedReport> {
    mapper_for(kind, result.name)(report, &result.raw)
}

/// Fold a sequence of results, in order, starting from an empty report.
pub fn fold<'a>(kind: ProviderKind, results: impl IntoIterator<Item = &'a NamedResult>) -> Result<UnifiedReport> {
    results
        .into_iter()
        .try_fold(UnifiedReport::default(), |report, result| apply(kind, report, result))
}
