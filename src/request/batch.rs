use super::descriptor::{HttpQuery, PAGE_PROPERTY, ReportingQuery, SOURCE_PROPERTY};
use super::{DateRange, RequestDescriptor};
use crate::providers::ProviderKind;
use crate::report::MetricName;
use crate::{AnalyticsError, Result};
use chrono::NaiveDate;

/// Number of rows requested for breakdown metrics.
pub const TOP_LIMIT: u32 = 10;

const REPORTING_METRIC: &str = "activeUsers";
const REPORTING_VISITOR_DIMENSION: &str = "country";
const REPORTING_PAGE_DIMENSION: &str = "pagePath";
const REPORTING_SOURCE_DIMENSION: &str = "firstUserSource";

/// An ordered, non-empty list of descriptors that all target the same provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBatch {
    provider: ProviderKind,
    descriptors: Vec<RequestDescriptor>,
}

impl RequestBatch {
    pub fn new(descriptors: impl IntoIterator<Item = RequestDescriptor>) -> Result<Self> {
        let descriptors: Vec<_> = descriptors.into_iter().collect();

        let Some(first) = descriptors.first() else {
            return Err(AnalyticsError::configuration("a request batch needs at least one descriptor"));
        };

        let provider = first.provider();
        if let Some(stray) = descriptors.iter().find(|d| d.provider() != provider) {
            return Err(AnalyticsError::configuration(format!(
                "request '{}' targets the {} provider but the batch targets the {provider} provider",
                stray.name(),
                stray.provider()
            )));
        }

        Ok(Self { provider, descriptors })
    }

    /// The six dashboard metrics for the HTTP provider, using the calendar weeks around `today`.
    #[must_use]
    pub fn standard_http(site_id: &str, today: NaiveDate) -> Self {
        let this_week = DateRange::this_week(today);
        let last_week = DateRange::last_week(today);

        let visitors = HttpQuery::aggregate(MetricName::VisitorsThisWeek, site_id, this_week.clone());
        let pages =
            HttpQuery::breakdown(MetricName::MostVisitedPagesThisWeek, site_id, this_week.clone(), PAGE_PROPERTY).with_limit(TOP_LIMIT);
        let sources = HttpQuery::breakdown(MetricName::TopSourcesThisWeek, site_id, this_week, SOURCE_PROPERTY).with_limit(TOP_LIMIT);

        let visitors_last_week = visitors.derive(MetricName::VisitorsLastWeek, last_week.clone());
        let pages_last_week = pages.derive(MetricName::MostVisitedPagesLastWeek, last_week.clone());
        let sources_last_week = sources.derive(MetricName::TopSourcesLastWeek, last_week);

        Self {
            provider: ProviderKind::Http,
            descriptors: [visitors, visitors_last_week, pages, pages_last_week, sources, sources_last_week]
                .into_iter()
                .map(RequestDescriptor::Http)
                .collect(),
        }
    }

    /// The six dashboard metrics for the reporting provider, using trailing relative weeks.
    #[must_use]
    pub fn standard_reporting(property_id: &str) -> Self {
        let this_week = DateRange::trailing_week();
        let last_week = DateRange::preceding_week();

        let visitors = ReportingQuery::new(
            MetricName::VisitorsThisWeek,
            property_id,
            [REPORTING_VISITOR_DIMENSION],
            [REPORTING_METRIC],
            this_week.clone(),
        );
        let pages = ReportingQuery::new(
            MetricName::MostVisitedPagesThisWeek,
            property_id,
            [REPORTING_PAGE_DIMENSION],
            [REPORTING_METRIC],
            this_week.clone(),
        )
        .with_limit(TOP_LIMIT);
        let sources = ReportingQuery::new(
            MetricName::TopSourcesThisWeek,
            property_id,
            [REPORTING_SOURCE_DIMENSION],
            [REPORTING_METRIC],
            this_week,
        )
        .with_limit(TOP_LIMIT);

        let visitors_last_week = visitors.derive(MetricName::VisitorsLastWeek, last_week.clone());
        let pages_last_week = pages.derive(MetricName::MostVisitedPagesLastWeek, last_week.clone());
        let sources_last_week = sources.derive(MetricName::TopSourcesLastWeek, last_week);

        Self {
            provider: ProviderKind::Reporting,
            descriptors: [visitors, visitors_last_week, pages, pages_last_week, sources, sources_last_week]
                .into_iter()
                .map(RequestDescriptor::Reporting)
                .collect(),
        }
    }

    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.provider
    }

    #[must_use]
    pub fn descriptors(&self) -> &[RequestDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestDescriptor> {
        self.descriptors.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a RequestBatch {
    type Item = &'a RequestDescriptor;
    type IntoIter = core::slice::Iter<'a, RequestDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
