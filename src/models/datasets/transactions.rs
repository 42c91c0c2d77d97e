use std::collections::HashMap;

use primitive_types::U256;
use serde::Serialize;

use super::accounts::AlteredAccounts;
use super::tokens::{
    Delegator, NftDataUpdate, ScDeployInfo, TagsCount, TokenInfo, TokenRolesAndProperties,
    TokensCollection,
};
use super::{is_false, is_zero_u64};
use crate::interface::FeeInfo;

/// Document shape for a normal, reward or invalid transaction.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "miniBlockHash")]
    pub mb_hash: String,
    pub nonce: u64,
    pub round: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub receiver_shard: u32,
    pub sender_shard: u32,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub fee: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub initial_paid_fee: String,
    pub data: Vec<u8>,
    pub signature: String,
    pub timestamp: u64,
    pub status: String,
    pub search_order: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sender_user_name: Vec<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub receiver_user_name: Vec<u8>,
    #[serde(rename = "hasScResults", skip_serializing_if = "is_false", default)]
    pub has_scr: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub is_sc_call: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub has_operations: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tokens: Vec<String>,
    #[serde(rename = "mectValues", skip_serializing_if = "Vec::is_empty", default)]
    pub mect_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub receivers: Vec<String>,
    #[serde(
        rename = "receiversShardIDs",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub receivers_shard_ids: Vec<u32>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub tx_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub operation: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub function: String,
    #[serde(skip_serializing_if = "is_false", default)]
    pub is_relayed: bool,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub version: u64,
    #[serde(skip)]
    pub smart_contract_results: Vec<ScResult>,
    #[serde(skip)]
    pub receiver_address_bytes: Vec<u8>,
    #[serde(skip)]
    pub hash: String,
    #[serde(skip)]
    pub had_refund: bool,
}

impl FeeInfo for Transaction {
    fn fee_gas_limit(&self) -> u64 {
        self.gas_limit
    }
    fn fee_gas_price(&self) -> u64 {
        self.gas_price
    }
    fn fee_data(&self) -> &[u8] {
        &self.data
    }
    fn fee_value(&self) -> U256 {
        U256::from_dec_str(&self.value).unwrap_or_default()
    }
}

/// Document shape for a smart contract result.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScResult {
    #[serde(skip)]
    pub hash: String,
    #[serde(rename = "miniBlockHash", skip_serializing_if = "String::is_empty", default)]
    pub mb_hash: String,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub value: String,
    pub sender: String,
    pub receiver: String,
    pub sender_shard: u32,
    pub receiver_shard: u32,
    #[serde(
        rename = "relayerAddr",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub relayer_addr: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub relayed_value: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub data: Vec<u8>,
    pub prev_tx_hash: String,
    pub original_tx_hash: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub call_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub code_meta_data: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub return_message: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "is_false", default)]
    pub has_operations: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub original_sender: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub operation: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub function: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tokens: Vec<String>,
    #[serde(rename = "mectValues", skip_serializing_if = "Vec::is_empty", default)]
    pub mect_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub receivers: Vec<String>,
    #[serde(
        rename = "receiversShardIDs",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub receivers_shard_ids: Vec<u32>,
    #[serde(skip)]
    pub sender_address_bytes: Vec<u8>,
}

/// Document shape for a receipt.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(skip)]
    pub hash: String,
    pub value: String,
    pub sender: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub data: String,
    pub tx_hash: String,
    pub timestamp: u64,
}

/// Refund information recovered from an orphan smart contract result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefundData {
    pub value: String,
    pub receiver: String,
}

/// Everything the transaction pipeline produced for one block. Owned
/// exclusively by the invocation that created it and discarded after
/// serialization.
#[derive(Debug, Default)]
pub struct PreparedResults {
    pub transactions: Vec<Transaction>,
    pub sc_results: Vec<ScResult>,
    pub receipts: Vec<Receipt>,
    pub altered_accounts: AlteredAccounts,
    pub tx_hash_status: HashMap<String, String>,
    pub tx_hash_refund: HashMap<String, RefundData>,
}

/// Side tables the event dispatch produced for one block.
#[derive(Debug, Default)]
pub struct PreparedLogsResults {
    pub tokens: TokensCollection,
    pub tokens_supply: TokensCollection,
    pub tokens_info: Vec<TokenInfo>,
    pub sc_deploys: HashMap<String, ScDeployInfo>,
    pub delegators: HashMap<String, Delegator>,
    pub nft_data_updates: Vec<NftDataUpdate>,
    pub token_roles_and_properties: TokenRolesAndProperties,
    pub tags: TagsCount,
}
