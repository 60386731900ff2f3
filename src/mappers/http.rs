//! Mappers for the Plausible-style HTTP provider.
//!
//! Aggregate results look like `{"results": {"visitors": {"value": 42}}}` and overwrite
//! the scalar field. Breakdown results look like `{"results": [{"page": "/", "visitors": 3}]}`
//! and replace the list field wholesale; their keys already match [`PageEntry`] and
//! [`SourceEntry`].

use crate::providers::RawResult;
use crate::report::{MetricName, PageEntry, SourceEntry, UnifiedReport};
use crate::{AnalyticsError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Aggregate {
    results: AggregateResults,
}

#[derive(Debug, Deserialize)]
struct AggregateResults {
    visitors: AggregateValue,
}

#[derive(Debug, Deserialize)]
struct AggregateValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Breakdown<T> {
    results: Vec<T>,
}

pub fn visitors_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    overwrite_visitors(MetricName::VisitorsThisWeek, report, raw)
}

pub fn visitors_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    overwrite_visitors(MetricName::VisitorsLastWeek, report, raw)
}

pub fn most_visited_pages_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    replace_pages(MetricName::MostVisitedPagesThisWeek, report, raw)
}

pub fn most_visited_pages_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    replace_pages(MetricName::MostVisitedPagesLastWeek, report, raw)
}

pub fn top_sources_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    replace_sources(MetricName::TopSourcesThisWeek, report, raw)
}

pub fn top_sources_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    replace_sources(MetricName::TopSourcesLastWeek, report, raw)
}

fn overwrite_visitors(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    let aggregate: Aggregate = decode(name, raw)?;
    *report.visitors_mut(name.week()) = aggregate.results.visitors.value;
    Ok(report)
}

fn replace_pages(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    let breakdown: Breakdown<PageEntry> = decode(name, raw)?;
    *report.pages_mut(name.week()) = breakdown.results;
    Ok(report)
}

fn replace_sources(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    let breakdown: Breakdown<SourceEntry> = decode(name, raw)?;
    *report.sources_mut(name.week()) = breakdown.results;
    Ok(report)
}

fn decode<'a, T: Deserialize<'a>>(name: MetricName, raw: &'a RawResult) -> Result<T> {
    let RawResult::Http(value) = raw else {
        return Err(AnalyticsError::mapping(name.as_str(), "expected an HTTP provider payload"));
    };

    T::deserialize(value).map_err(|e| AnalyticsError::mapping(name.as_str(), format!("unexpected payload shape: {e}")))
}
