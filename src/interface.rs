//! Capabilities provided by external collaborators.
//!
//! The core pipeline is a pure in-memory transformation; everything that
//! touches the chain state, address formats or economics is injected through
//! these traits.

use anyhow::Result;
use primitive_types::U256;

use crate::models::datasets::accounts::TokenMetaData;

/// Deterministic address to shard routing.
pub trait ShardRouter: Send + Sync {
    fn self_shard(&self) -> u32;
    fn compute_shard(&self, address: &[u8]) -> u32;
    fn same_shard(&self, a: &[u8], b: &[u8]) -> bool {
        self.compute_shard(a) == self.compute_shard(b)
    }
}

/// Conversion between raw public keys and their human readable form.
pub trait AddressCodec: Send + Sync {
    fn encode(&self, bytes: &[u8]) -> String;
    fn decode(&self, encoded: &str) -> Result<Vec<u8>>;
    /// Length in bytes of a raw address.
    fn address_len(&self) -> usize;
}

/// The subset of a transaction-like record the fee calculator needs.
pub trait FeeInfo {
    fn fee_gas_limit(&self) -> u64;
    fn fee_gas_price(&self) -> u64;
    fn fee_data(&self) -> &[u8];
    fn fee_value(&self) -> U256;
}

/// Pure fee/gas economics over a transaction-like record.
pub trait FeeCalculator: Send + Sync {
    /// Gas needed to process the record, an optimistic upper bound.
    fn compute_gas_limit(&self, tx: &dyn FeeInfo) -> u64;
    fn compute_tx_fee_based_on_gas_used(&self, tx: &dyn FeeInfo, gas_used: u64) -> U256;
    /// Works backwards from a refund leg to the actually consumed gas and fee.
    fn compute_gas_used_and_fee_based_on_refund_value(
        &self,
        tx: &dyn FeeInfo,
        refund: U256,
    ) -> (u64, U256);
}

/// Decoded form of a built-in-function call payload.
#[derive(Debug, Clone, Default)]
pub struct ParsedDataField {
    pub operation: String,
    pub function: String,
    pub tokens: Vec<String>,
    pub mect_values: Vec<String>,
    pub receivers: Vec<Vec<u8>>,
    pub receivers_shard_ids: Vec<u32>,
    pub is_relayed: bool,
}

/// Decodes structured built-in-function call payloads.
pub trait DataFieldParser: Send + Sync {
    fn parse(&self, data: &[u8], sender: &[u8], receiver: &[u8]) -> ParsedDataField;
}

/// Point-in-time view of a plain account.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    pub nonce: u64,
    pub balance: U256,
}

/// Point-in-time view of a token held by an account.
#[derive(Debug, Clone, Default)]
pub struct TokenSnapshot {
    pub balance: U256,
    pub properties: String,
    pub metadata: Option<TokenMetaData>,
}

/// Random access into the account trie, used to resolve balances and token
/// metadata not present in the event stream.
pub trait AccountLoader: Send + Sync {
    fn load_account(&self, address: &[u8]) -> Result<AccountSnapshot>;
    fn load_token(&self, address: &[u8], token: &str, nonce: u64) -> Result<TokenSnapshot>;
}
