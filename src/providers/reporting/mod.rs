mod credentials;
mod provider;
mod wire;

pub use credentials::{ANALYTICS_READONLY_SCOPE, Credentials, ServiceAccount, TokenSource};
pub use provider::{DEFAULT_BASE_URL, ReportingProvider, ReportingRequest};
pub use wire::{CellValue, DateRangeBody, NamedField, Row, RunReportRequest, RunReportResponse};
