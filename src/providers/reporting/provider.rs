use super::credentials::{Credentials, TokenSource};
use super::wire::{DateRangeBody, NamedField, RunReportRequest, RunReportResponse};
use crate::report::MetricName;
use crate::request::{ReportingQuery, RequestDescriptor};
use crate::{AnalyticsError, Result};
use core::time::Duration;
use url::Url;

const LOG_TARGET: &str = " reporting";

/// Public Google Analytics Data API.
pub const DEFAULT_BASE_URL: &str = "https://analyticsdata.googleapis.com/v1beta";

/// A fully-built `runReport` call.
#[derive(Debug, Clone)]
pub struct ReportingRequest {
    pub name: MetricName,
    pub url: Url,
    pub body: RunReportRequest,
}

/// Client for the Google-style reporting API.
///
/// Every failure while talking to the API, including timeouts and error statuses, is
/// reported as a configuration error with the underlying cause attached.
#[derive(Debug)]
pub struct ReportingProvider {
    client: reqwest::Client,
    base_url: String,
    token_source: Option<TokenSource>,
}

impl ReportingProvider {
    pub fn new(credentials: Option<Credentials>, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("analytics-report/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyticsError::configuration_with("could not create HTTP client", e))?;

        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string();
        let _ = Url::parse(&base_url).map_err(|e| AnalyticsError::configuration(format!("invalid base URL '{base_url}': {e}")))?;

        let token_source = credentials
            .map(|c| TokenSource::from_credentials(c, client.clone()))
            .transpose()?;

        Ok(Self {
            client,
            base_url,
            token_source,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn create_request(&self, descriptor: &RequestDescriptor) -> Result<ReportingRequest> {
        let RequestDescriptor::Reporting(query) = descriptor else {
            return Err(AnalyticsError::configuration(format!(
                "request '{}' targets the {} provider, not the reporting provider",
                descriptor.name(),
                descriptor.provider()
            )));
        };

        if self.token_source.is_none() {
            return Err(AnalyticsError::configuration("no credentials configured for the reporting provider"));
        }

        Ok(ReportingRequest {
            name: query.name(),
            url: self.report_url(query)?,
            body: report_body(query),
        })
    }

    pub async fn send_request(&self, request: ReportingRequest) -> Result<RunReportResponse> {
        let Some(token_source) = &self.token_source else {
            return Err(AnalyticsError::configuration("no credentials configured for the reporting provider"));
        };

        let name = request.name;
        let bearer = token_source.bearer().await?;

        log::info!(target: LOG_TARGET, "Running report for '{name}'");

        let resp = self
            .client
            .post(request.url)
            .bearer_auth(bearer)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| AnalyticsError::configuration_with(format!("runReport for '{name}' failed"), e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|e| {
                log::debug!(target: LOG_TARGET, "Could not read error body for '{name}': {e}");
                String::new()
            });
            log::warn!(target: LOG_TARGET, "Report for '{name}' failed with status {status}");
            return Err(AnalyticsError::configuration(format!(
                "runReport for '{name}' returned status {status}: {body}"
            )));
        }

        let response: RunReportResponse = resp
            .json()
            .await
            .map_err(|e| AnalyticsError::configuration_with(format!("runReport for '{name}' returned an unexpected response"), e))?;

        log::debug!(target: LOG_TARGET, "Report for '{name}' returned {} row(s)", response.rows.len());
        Ok(response)
    }

    /// `{base}/properties/{id}:runReport`; ids may be given with or without the `properties/` prefix.
    fn report_url(&self, query: &ReportingQuery) -> Result<Url> {
        let property_id = query.property_id().trim_start_matches("properties/");
        if property_id.is_empty() {
            return Err(AnalyticsError::configuration(format!("request '{}' has no property id", query.name())));
        }

        let raw = format!("{}/properties/{property_id}:runReport", self.base_url);
        Url::parse(&raw).map_err(|e| AnalyticsError::configuration(format!("invalid request URL '{raw}': {e}")))
    }
}

fn report_body(query: &ReportingQuery) -> RunReportRequest {
    let (start_date, end_date) = query.date_range().bounds();

    RunReportRequest {
        dimensions: query.dimensions().iter().map(|name| NamedField { name: name.clone() }).collect(),
        metrics: query.metrics().iter().map(|name| NamedField { name: name.clone() }).collect(),
        date_ranges: vec![DateRangeBody { start_date, end_date }],
        limit: query.limit(),
    }
}
