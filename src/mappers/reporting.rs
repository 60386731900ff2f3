//! Mappers for the Google-style reporting provider.
//!
//! Every row carries its dimension label first and the metric value first, both as
//! strings. Scalar metrics sum the metric over all rows and add the total to the field;
//! breakdowns append one entry per row, in row order.

use crate::providers::RawResult;
use crate::providers::reporting::{Row, RunReportResponse};
use crate::report::{MetricName, PageEntry, SourceEntry, UnifiedReport};
use crate::{AnalyticsError, Result};

pub fn visitors_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    add_visitors(MetricName::VisitorsThisWeek, report, raw)
}

pub fn visitors_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    add_visitors(MetricName::VisitorsLastWeek, report, raw)
}

pub fn most_visited_pages_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    append_pages(MetricName::MostVisitedPagesThisWeek, report, raw)
}

pub fn most_visited_pages_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    append_pages(MetricName::MostVisitedPagesLastWeek, report, raw)
}

pub fn top_sources_this_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    append_sources(MetricName::TopSourcesThisWeek, report, raw)
}

pub fn top_sources_last_week(report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    append_sources(MetricName::TopSourcesLastWeek, report, raw)
}

fn add_visitors(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    let total = response(name, raw)?
        .rows
        .iter()
        .try_fold(0u64, |sum, row| metric(name, row).map(|value| sum.saturating_add(value)))?;

    let field = report.visitors_mut(name.week());
    *field = field.saturating_add(total);
    Ok(report)
}

fn append_pages(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    for row in &response(name, raw)?.rows {
        report.pages_mut(name.week()).push(PageEntry {
            page: label(name, row)?,
            visitors: metric(name, row)?,
        });
    }

    Ok(report)
}

fn append_sources(name: MetricName, mut report: UnifiedReport, raw: &RawResult) -> Result<UnifiedReport> {
    for row in &response(name, raw)?.rows {
        report.sources_mut(name.week()).push(SourceEntry {
            source: label(name, row)?,
            visitors: metric(name, row)?,
        });
    }

    Ok(report)
}

fn response(name: MetricName, raw: &RawResult) -> Result<&RunReportResponse> {
    match raw {
        RawResult::Reporting(response) => Ok(response),
        RawResult::Http(_) => Err(AnalyticsError::mapping(name.as_str(), "expected a reporting provider payload")),
    }
}

fn label(name: MetricName, row: &Row) -> Result<String> {
    row.dimension_values
        .first()
        .map(|cell| cell.value.clone())
        .ok_or_else(|| AnalyticsError::mapping(name.as_str(), "row has no dimension value"))
}

fn metric(name: MetricName, row: &Row) -> Result<u64> {
    let cell = row
        .metric_values
        .first()
        .ok_or_else(|| AnalyticsError::mapping(name.as_str(), "row has no metric value"))?;

    cell.value
        .trim()
        .parse()
        .map_err(|e| AnalyticsError::mapping(name.as_str(), format!("metric value '{}' is not an integer: {e}", cell.value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::reporting::CellValue;

    fn row(label: &str, value: &str) -> Row {
        Row {
            dimension_values: vec![CellValue { value: label.into() }],
            metric_values: vec![CellValue { value: value.into() }],
        }
    }

    fn rows(rows: Vec<Row>) -> RawResult {
        RawResult::Reporting(RunReportResponse { rows, row_count: None })
    }

    #[test]
    fn test_visitors_accumulate() {
        let report = visitors_this_week(UnifiedReport::default(), &rows(vec![row("Netherlands", "10"), row("Belgium", "5")])).unwrap();
        assert_eq!(report.visitors_this_week, 15);

        let report = visitors_this_week(report, &rows(vec![row("Germany", "2")])).unwrap();
        assert_eq!(report.visitors_this_week, 17);
        assert_eq!(report.visitors_last_week, 0);
    }

    #[test]
    fn test_no_rows_adds_nothing() {
        let report = UnifiedReport {
            visitors_last_week: 4,
            ..UnifiedReport::default()
        };

        let report = visitors_last_week(report, &rows(vec![])).unwrap();
        assert_eq!(report.visitors_last_week, 4);
    }

    #[test]
    fn test_pages_append_in_row_order() {
        let report = most_visited_pages_this_week(UnifiedReport::default(), &rows(vec![row("/", "8"), row("/about/", "3")])).unwrap();
        let report = most_visited_pages_this_week(report, &rows(vec![row("/contact/", "1")])).unwrap();

        let pages: Vec<_> = report
            .most_visited_pages_this_week
            .iter()
            .map(|p| (p.page.as_str(), p.visitors))
            .collect();
        assert_eq!(pages, [("/", 8), ("/about/", 3), ("/contact/", 1)]);
        assert!(report.most_visited_pages_last_week.is_empty());
    }

    #[test]
    fn test_sources_append() {
        let report = top_sources_last_week(UnifiedReport::default(), &rows(vec![row("google", "6"), row("(direct)", "2")])).unwrap();

        assert_eq!(
            report.top_sources_last_week,
            vec![
                SourceEntry {
                    source: "google".into(),
                    visitors: 6
                },
                SourceEntry {
                    source: "(direct)".into(),
                    visitors: 2
                },
            ]
        );
        assert!(report.top_sources_this_week.is_empty());
    }

    #[test]
    fn test_non_integer_metric_is_mapping_error() {
        let err = visitors_this_week(UnifiedReport::default(), &rows(vec![row("Netherlands", "1.5")])).unwrap_err();

        match err {
            AnalyticsError::Mapping { name, reason } => {
                assert_eq!(name, "visitors_this_week");
                assert!(reason.contains("1.5"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_without_dimension_is_mapping_error() {
        let bad = Row {
            dimension_values: vec![],
            metric_values: vec![CellValue { value: "1".into() }],
        };

        let err = top_sources_this_week(UnifiedReport::default(), &rows(vec![bad])).unwrap_err();
        assert!(matches!(err, AnalyticsError::Mapping { .. }));
    }
}
