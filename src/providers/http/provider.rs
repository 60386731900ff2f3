use crate::report::MetricName;
use crate::request::{HttpQuery, RequestDescriptor};
use crate::{AnalyticsError, Result};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

const LOG_TARGET: &str = "      http";

/// Public Plausible stats API.
pub const DEFAULT_BASE_URL: &str = "https://plausible.io/api/v1/stats";

/// A fully-built `GET` request against the stats API.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub name: MetricName,
    pub url: Url,
    pub headers: HeaderMap,
}

/// Client for the Plausible-style stats API.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    /// Create a provider with an optional API key and base URL override.
    ///
    /// A missing API key is only reported when a request is built, so a provider can be
    /// constructed before credentials are known.
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("analytics-report/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyticsError::configuration_with("could not create HTTP client", e))?;

        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string();
        let _ = Url::parse(&base_url).map_err(|e| AnalyticsError::configuration(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()).map(ToString::to_string),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn create_request(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest> {
        let RequestDescriptor::Http(query) = descriptor else {
            return Err(AnalyticsError::configuration(format!(
                "request '{}' targets the {} provider, not the http provider",
                descriptor.name(),
                descriptor.provider()
            )));
        };

        let Some(api_key) = &self.api_key else {
            return Err(AnalyticsError::configuration("no API key configured for the http provider"));
        };

        let mut auth_val = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| AnalyticsError::configuration_with("API key is not a valid header value", e))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);

        Ok(HttpRequest {
            name: query.name(),
            url: self.query_url(query)?,
            headers,
        })
    }

    pub async fn send_request(&self, request: HttpRequest) -> Result<serde_json::Value> {
        log::info!(target: LOG_TARGET, "Querying {} for '{}'", request.url.path(), request.name);

        let resp = self
            .client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| transport_error(request.name, &e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_else(|e| {
                log::debug!(target: LOG_TARGET, "Could not read error body for '{}': {e}", request.name);
                String::new()
            });
            log::warn!(target: LOG_TARGET, "Query for '{}' failed with status {status}", request.name);
            return Err(AnalyticsError::upstream(Some(status.as_u16()), body));
        }

        let value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(request.name, &e)
            } else {
                AnalyticsError::upstream(Some(status.as_u16()), format!("response for '{}' is not valid JSON: {e}", request.name))
            }
        })?;

        log::debug!(target: LOG_TARGET, "Received response for '{}'", request.name);
        Ok(value)
    }

    /// `{base}/{endpoint}` with the query's parameters in a fixed order, absent ones omitted.
    fn query_url(&self, query: &HttpQuery) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, query.endpoint());
        let mut url = Url::parse(&raw).map_err(|e| AnalyticsError::configuration(format!("invalid request URL '{raw}': {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            let _ = pairs.append_pair("site_id", query.site_id());
            if let Some(filters) = query.filters() {
                let _ = pairs.append_pair("filters", filters);
            }
            let _ = pairs.append_pair("period", query.period());
            let _ = pairs.append_pair("metrics", query.metrics());
            if let Some(property) = query.property() {
                let _ = pairs.append_pair("property", property);
            }
            let _ = pairs.append_pair("date", &query.date().to_query_value());
            if let Some(limit) = query.limit() {
                let _ = pairs.append_pair("limit", &limit.to_string());
            }
        }

        Ok(url)
    }
}

fn transport_error(name: MetricName, e: &reqwest::Error) -> AnalyticsError {
    if e.is_timeout() {
        AnalyticsError::upstream(None, format!("request for '{name}' timed out"))
    } else {
        AnalyticsError::upstream(e.status().map(|s| s.as_u16()), format!("request for '{name}' failed: {e}"))
    }
}
