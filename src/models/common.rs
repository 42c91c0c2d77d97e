use std::collections::HashMap;

use primitive_types::U256;

use crate::interface::FeeInfo;

/// A single execution event emitted by a contract or built-in function.
///
/// Topics are positional and operation-specific; there is no schema beyond
/// convention. Topic 1 carries the big-endian token nonce for every token
/// operation, which is what routes an event between the fungible and the
/// non-fungible processors.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub address: Vec<u8>,
    pub identifier: Vec<u8>,
    pub topics: Vec<Vec<u8>>,
    pub data: Vec<u8>,
}

impl Event {
    pub fn identifier_str(&self) -> &str {
        std::str::from_utf8(&self.identifier).unwrap_or_default()
    }

    pub fn topic(&self, index: usize) -> &[u8] {
        self.topics.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}

/// The ordered events attached to one transaction or smart contract result.
#[derive(Debug, Clone, Default)]
pub struct TxLog {
    pub tx_hash: Vec<u8>,
    pub address: Vec<u8>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniBlockType {
    Tx,
    SmartContractResult,
    Rewards,
    Invalid,
    Receipt,
}

/// A slice of a block body holding hashes of operations routed between one
/// shard pair.
#[derive(Debug, Clone)]
pub struct MiniBlock {
    pub mb_type: MiniBlockType,
    pub sender_shard: u32,
    pub receiver_shard: u32,
    pub tx_hashes: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct Body {
    pub miniblocks: Vec<MiniBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct Header {
    pub nonce: u64,
    pub round: u64,
    pub timestamp: u64,
    pub shard_id: u32,
}

/// A raw user transaction as decoded by the (external) block decoder.
#[derive(Debug, Clone, Default)]
pub struct RawTransaction {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Vec<u8>,
    pub sender: Vec<u8>,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
    pub sender_username: Vec<u8>,
    pub receiver_username: Vec<u8>,
    pub version: u32,
}

impl FeeInfo for RawTransaction {
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
        self.value
    }
}

/// A protocol reward payout for one block.
#[derive(Debug, Clone, Default)]
pub struct RawReward {
    pub round: u64,
    pub value: U256,
    pub receiver: Vec<u8>,
}

/// A fee/refund receipt attached to a transaction.
#[derive(Debug, Clone, Default)]
pub struct RawReceipt {
    pub value: U256,
    pub sender: Vec<u8>,
    pub data: Vec<u8>,
    pub tx_hash: Vec<u8>,
}

/// A raw smart contract result, the asynchronous continuation of a
/// transaction, linked to its origin by hash chaining.
#[derive(Debug, Clone, Default)]
pub struct RawScResult {
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub value: U256,
    pub sender: Vec<u8>,
    pub receiver: Vec<u8>,
    pub relayer: Vec<u8>,
    pub relayed_value: U256,
    pub code: Vec<u8>,
    pub data: Vec<u8>,
    pub prev_tx_hash: Vec<u8>,
    pub original_tx_hash: Vec<u8>,
    pub call_type: String,
    pub code_metadata: Vec<u8>,
    pub return_message: String,
    pub original_sender: Vec<u8>,
}

/// All per-block execution artifacts, keyed by content hash.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    pub txs: HashMap<Vec<u8>, RawTransaction>,
    pub scrs: HashMap<Vec<u8>, RawScResult>,
    pub rewards: HashMap<Vec<u8>, RawReward>,
    pub invalid: HashMap<Vec<u8>, RawTransaction>,
    pub receipts: HashMap<Vec<u8>, RawReceipt>,
    pub logs: Vec<TxLog>,
}
