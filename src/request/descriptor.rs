use super::DateRange;
use crate::providers::ProviderKind;
use crate::report::MetricName;
use strum::{Display, IntoStaticStr};

/// Page dimension of the HTTP provider's breakdown endpoint.
pub const PAGE_PROPERTY: &str = "event:page";

/// Source dimension of the HTTP provider's breakdown endpoint.
pub const SOURCE_PROPERTY: &str = "visit:source";

/// HTTP provider endpoint a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    /// A single aggregated value per metric
    Aggregate,

    /// One row per value of the `property` dimension
    Breakdown,
}

/// A metric query against the Plausible-style HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpQuery {
    name: MetricName,
    site_id: String,
    endpoint: Endpoint,
    metrics: String,
    period: String,
    date: DateRange,
    property: Option<String>,
    limit: Option<u32>,
    filters: Option<String>,
}

impl HttpQuery {
    /// A query for aggregated visitors over `date`.
    pub fn aggregate(name: MetricName, site_id: impl Into<String>, date: DateRange) -> Self {
        Self {
            name,
            site_id: site_id.into(),
            endpoint: Endpoint::Aggregate,
            metrics: "visitors".into(),
            period: "custom".into(),
            date,
            property: None,
            limit: None,
            filters: None,
        }
    }

    /// A query for visitors broken down by `property` over `date`.
    pub fn breakdown(name: MetricName, site_id: impl Into<String>, date: DateRange, property: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Breakdown,
            property: Some(property.into()),
            ..Self::aggregate(name, site_id, date)
        }
    }

    /// Copy of this query under another name and period.
    #[must_use]
    pub fn derive(&self, name: MetricName, date: DateRange) -> Self {
        Self {
            name,
            date,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_metrics(self, metrics: impl Into<String>) -> Self {
        Self {
            metrics: metrics.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_period(self, period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_limit(self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    #[must_use]
    pub fn with_filters(self, filters: impl Into<String>) -> Self {
        Self {
            filters: Some(filters.into()),
            ..self
        }
    }

    #[must_use]
    pub const fn name(&self) -> MetricName {
        self.name
    }

    #[must_use]
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    #[must_use]
    pub fn metrics(&self) -> &str {
        &self.metrics
    }

    #[must_use]
    pub fn period(&self) -> &str {
        &self.period
    }

    #[must_use]
    pub const fn date(&self) -> &DateRange {
        &self.date
    }

    #[must_use]
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    #[must_use]
    pub fn filters(&self) -> Option<&str> {
        self.filters.as_deref()
    }
}

/// A metric query against the Google-style reporting provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingQuery {
    name: MetricName,
    property_id: String,
    dimensions: Vec<String>,
    metrics: Vec<String>,
    date_range: DateRange,
    limit: Option<u32>,
}

impl ReportingQuery {
    pub fn new<D, M>(name: MetricName, property_id: impl Into<String>, dimensions: D, metrics: M, date_range: DateRange) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            name,
            property_id: property_id.into(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            metrics: metrics.into_iter().map(Into::into).collect(),
            date_range,
            limit: None,
        }
    }

    /// Copy of this query under another name and period.
    #[must_use]
    pub fn derive(&self, name: MetricName, date_range: DateRange) -> Self {
        Self {
            name,
            date_range,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_limit(self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    #[must_use]
    pub const fn name(&self) -> MetricName {
        self.name
    }

    #[must_use]
    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    #[must_use]
    pub const fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// One metric query, addressed to one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDescriptor {
    Http(HttpQuery),
    Reporting(ReportingQuery),
}

impl RequestDescriptor {
    /// The dispatch key selecting the mapper for this request's result.
    #[must_use]
    pub const fn name(&self) -> MetricName {
        match self {
            Self::Http(q) => q.name(),
            Self::Reporting(q) => q.name(),
        }
    }

    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        match self {
            Self::Http(_) => ProviderKind::Http,
            Self::Reporting(_) => ProviderKind::Reporting,
        }
    }
}

impl From<HttpQuery> for RequestDescriptor {
    fn from(query: HttpQuery) -> Self {
        Self::Http(query)
    }
}

impl From<ReportingQuery> for RequestDescriptor {
    fn from(query: ReportingQuery) -> Self {
        Self::Reporting(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_defaults() {
        let q = HttpQuery::aggregate(MetricName::VisitorsThisWeek, "example.com", DateRange::trailing_week());
        assert_eq!(q.endpoint(), Endpoint::Aggregate);
        assert_eq!(q.metrics(), "visitors");
        assert_eq!(q.period(), "custom");
        assert_eq!(q.property(), None);
        assert_eq!(q.limit(), None);
        assert_eq!(q.filters(), None);
    }

    #[test]
    fn test_breakdown_sets_property() {
        let q = HttpQuery::breakdown(MetricName::TopSourcesThisWeek, "example.com", DateRange::trailing_week(), SOURCE_PROPERTY)
            .with_limit(10)
            .with_filters("visit:country==NL");
        assert_eq!(q.endpoint(), Endpoint::Breakdown);
        assert_eq!(q.property(), Some("visit:source"));
        assert_eq!(q.limit(), Some(10));
        assert_eq!(q.filters(), Some("visit:country==NL"));
    }

    #[test]
    fn test_derive_keeps_other_parameters() {
        let this_week = HttpQuery::breakdown(MetricName::MostVisitedPagesThisWeek, "example.com", DateRange::trailing_week(), PAGE_PROPERTY)
            .with_limit(5);
        let last_week = this_week.derive(MetricName::MostVisitedPagesLastWeek, DateRange::preceding_week());

        assert_eq!(last_week.name(), MetricName::MostVisitedPagesLastWeek);
        assert_eq!(last_week.date(), &DateRange::preceding_week());
        assert_eq!(last_week.limit(), Some(5));
        assert_eq!(last_week.property(), Some(PAGE_PROPERTY));
        assert_eq!(this_week.name(), MetricName::MostVisitedPagesThisWeek);
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::Aggregate.to_string(), "aggregate");
        assert_eq!(Endpoint::Breakdown.to_string(), "breakdown");
    }

    #[test]
    fn test_descriptor_name_and_provider() {
        let http: RequestDescriptor = HttpQuery::aggregate(MetricName::VisitorsLastWeek, "s", DateRange::trailing_week()).into();
        assert_eq!(http.name(), MetricName::VisitorsLastWeek);
        assert_eq!(http.provider(), ProviderKind::Http);

        let reporting: RequestDescriptor = ReportingQuery::new(
            MetricName::TopSourcesLastWeek,
            "123",
            ["firstUserSource"],
            ["activeUsers"],
            DateRange::preceding_week(),
        )
        .into();
        assert_eq!(reporting.name(), MetricName::TopSourcesLastWeek);
        assert_eq!(reporting.provider(), ProviderKind::Reporting);
    }
}
