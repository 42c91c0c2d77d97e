//! Serialization strategies for the search engine's bulk API.
//!
//! Every document family has its own strategy: plain replace for immutable
//! records, timestamp-guarded merges for account state, structural merges for
//! collections, and status-preserving upserts where two shards race on the
//! same id. Marshal failures abort the batch; record-level filtering happens
//! upstream.

mod accounts;
mod logs;
pub mod scripts;
mod tokens;
mod transactions;

pub use accounts::{
    serialize_accounts, serialize_accounts_history, serialize_accounts_mect,
    serialize_collections,
};
pub use logs::serialize_logs;
pub use tokens::{
    serialize_delegators, serialize_roles_and_properties, serialize_sc_deploys, serialize_tags,
    serialize_tokens,
};
pub use transactions::{
    serialize_receipts, serialize_sc_results, serialize_transactions,
    serialize_transactions_with_refund,
};

use serde::Serialize;
use serde_json::json;

use crate::models::errors::SerializeError;

fn index_meta(index: &str, id: &str) -> String {
    format!("{}\n", json!({"index": {"_index": index, "_id": id}}))
}

fn update_meta(index: &str, id: &str) -> String {
    format!("{}\n", json!({"update": {"_index": index, "_id": id}}))
}

fn delete_meta(index: &str, id: &str) -> String {
    format!("{}\n", json!({"delete": {"_index": index, "_id": id}}))
}

fn marshal<T: Serialize>(doc: &T, index: &str) -> Result<String, SerializeError> {
    serde_json::to_string(doc).map_err(|source| SerializeError::Marshal {
        index: index.to_string(),
        source,
    })
}
