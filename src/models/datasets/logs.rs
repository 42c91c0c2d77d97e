use serde::Serialize;

use super::is_zero_u64;

/// Document shape for the raw log attached to one transaction or smart
/// contract result.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Logs {
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub original_tx_hash: String,
    pub address: String,
    pub events: Vec<EventDoc>,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub timestamp: u64,
}

/// One event inside a log document. Topics and data are base64 encoded the
/// way the search engine stores binary fields.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDoc {
    pub address: String,
    pub identifier: String,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub data: String,
    pub order: usize,
}
