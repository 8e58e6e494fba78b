//! Glue JSON protocol request and response bodies
//!
//! Only the fields partsync reads or writes are modelled; everything else in
//! a response is ignored. Storage descriptors are kept as raw JSON so table
//! formats partsync knows nothing about survive the round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetPartitionsRequest<'a> {
    pub database_name: &'a str,
    pub table_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetPartitionsResponse {
    #[serde(default)]
    pub partitions: Vec<GluePartition>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GluePartition {
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetTableRequest<'a> {
    pub database_name: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetTableResponse {
    pub table: GlueTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GlueTable {
    #[serde(default)]
    pub storage_descriptor: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BatchCreatePartitionRequest<'a> {
    pub database_name: &'a str,
    pub table_name: &'a str,
    pub partition_input_list: Vec<GluePartitionInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GluePartitionInput {
    pub values: Vec<String>,
    pub storage_descriptor: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BatchCreatePartitionResponse {
    #[serde(default)]
    pub errors: Vec<BatchPartitionError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BatchPartitionError {
    #[serde(default)]
    pub partition_values: Vec<String>,
    pub error_detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ErrorDetail {
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
}

/// Service error body: `{"__type": "...#EntityNotFoundException", "message": "..."}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceError {
    #[serde(rename = "__type", default)]
    pub error_type: String,
    #[serde(alias = "Message", default)]
    pub message: String,
}

impl ServiceError {
    /// Error type without the namespace prefix
    pub fn short_type(&self) -> &str {
        self.error_type
            .rsplit_once('#')
            .map(|(_, name)| name)
            .unwrap_or(&self.error_type)
    }
}
