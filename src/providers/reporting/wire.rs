//! Request and response bodies of the `runReport` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedField {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeBody {
    pub start_date: String,
    pub end_date: String,
}

/// Body of a `runReport` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub dimensions: Vec<NamedField>,
    pub metrics: Vec<NamedField>,
    pub date_ranges: Vec<DateRangeBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// A single dimension or metric cell. The API reports every value as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    #[serde(default)]
    pub value: String,
}

/// One result row, with dimension and metric values in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<CellValue>,
    #[serde(default)]
    pub metric_values: Vec<CellValue>,
}

/// Response of a `runReport` call. Fields the mappers don't need are ignored.
///
/// The API leaves out `rows` entirely when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}
