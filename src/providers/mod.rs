//! Analytics providers
//!
//! Two backends are supported, modelled as the closed [`Provider`] enum:
//!
//! - [`http::HttpProvider`]: a Plausible-style stats API queried with `GET` requests and
//!   answering with `{"results": ...}` JSON documents.
//! - [`reporting::ReportingProvider`]: a Google Analytics Data API style `runReport`
//!   endpoint answering with rows of dimension and metric values, authenticated with a
//!   service-account token.
//!
//! Both offer the same three operations: [`Provider::create_request`] builds the transport
//! request without touching the network, [`Provider::send_request`] performs it, and
//! [`Provider::get_report`] chains the two and tags the payload with the descriptor's
//! [`MetricName`] so the reporter can pick the right mapper.

pub mod http;
pub mod reporting;

use crate::Result;
use crate::report::MetricName;
use crate::request::RequestDescriptor;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Which backend a provider, descriptor, or batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Plausible-style HTTP stats API
    Http,

    /// Google Analytics Data API style reporting API
    Reporting,
}

/// A transport request ready to be sent.
#[derive(Debug, Clone)]
pub enum ProviderRequest {
    Http(http::HttpRequest),
    Reporting(reporting::ReportingRequest),
}

impl ProviderRequest {
    #[must_use]
    pub const fn name(&self) -> MetricName {
        match self {
            Self::Http(r) => r.name,
            Self::Reporting(r) => r.name,
        }
    }
}

/// A provider-shaped payload, understood only by the matching mapper family.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Http(serde_json::Value),
    Reporting(reporting::RunReportResponse),
}

/// A raw payload tagged with the metric it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedResult {
    pub name: MetricName,
    pub raw: RawResult,
}

/// One of the supported analytics backends.
#[derive(Debug)]
pub enum Provider {
    Http(http::HttpProvider),
    Reporting(reporting::ReportingProvider),
}

impl Provider {
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Http(_) => ProviderKind::Http,
            Self::Reporting(_) => ProviderKind::Reporting,
        }
    }

    /// Build the transport request for `descriptor`.
    pub fn create_request(&self, descriptor: &RequestDescriptor) -> Result<ProviderRequest> {
        match self {
            Self::Http(p) => p.create_request(descriptor).map(ProviderRequest::Http),
            Self::Reporting(p) => p.create_request(descriptor).map(ProviderRequest::Reporting),
        }
    }

    /// Perform a request built by [`create_request`](Self::create_request).
    pub async fn send_request(&self, request: ProviderRequest) -> Result<RawResult> {
        match (self, request) {
            (Self::Http(p), ProviderRequest::Http(r)) => p.send_request(r).await.map(RawResult::Http),
            (Self::Reporting(p), ProviderRequest::Reporting(r)) => p.send_request(r).await.map(RawResult::Reporting),
            (_, request) => Err(crate::AnalyticsError::configuration(format!(
                "request '{}' was not built by the {} provider",
                request.name(),
                self.kind()
            ))),
        }
    }

    /// Fetch the raw result for `descriptor`, tagged with its name.
    pub async fn get_report(&self, descriptor: &RequestDescriptor) -> Result<NamedResult> {
        let request = self.create_request(descriptor)?;
        let raw = self.send_request(request).await?;
        Ok(NamedResult {
            name: descriptor.name(),
            raw,
        })
    }
}

impl From<http::HttpProvider> for Provider {
    fn from(provider: http::HttpProvider) -> Self {
        Self::Http(provider)
    }
}

impl From<reporting::ReportingProvider> for Provider {
    fn from(provider: reporting::ReportingProvider) -> Self {
        Self::Reporting(provider)
    }
}
