use std::sync::Arc;

use crate::constants::{METACHAIN_SHARD_ID, REWARDS_OPERATION};
use crate::interface::{AddressCodec, DataFieldParser, FeeCalculator};
use crate::models::common::{Header, MiniBlock, RawReceipt, RawReward, RawTransaction};
use crate::models::datasets::transactions::{Receipt, Transaction};

// addresses of deployed contracts carry a reserved all-zero prefix
const NUM_INIT_CHARACTERS_FOR_SC_ADDRESS: usize = 8;

/// Maps raw pool entries onto their database document shapes, resolving fees
/// and decoding the structured data field.
pub(crate) struct TransactionBuilder {
    codec: Arc<dyn AddressCodec>,
    fee_calculator: Arc<dyn FeeCalculator>,
    data_field_parser: Arc<dyn DataFieldParser>,
}

impl TransactionBuilder {
    pub fn new(
        codec: Arc<dyn AddressCodec>,
        fee_calculator: Arc<dyn FeeCalculator>,
        data_field_parser: Arc<dyn DataFieldParser>,
    ) -> Self {
        Self {
            codec,
            fee_calculator,
            data_field_parser,
        }
    }

    pub fn prepare_transaction(
        &self,
        tx: &RawTransaction,
        tx_hash: &[u8],
        mb_hash: &str,
        mb: &MiniBlock,
        header: &Header,
        status: &str,
    ) -> Transaction {
        let gas_used = self.fee_calculator.compute_gas_limit(tx);
        let fee = self.fee_calculator.compute_tx_fee_based_on_gas_used(tx, gas_used);
        let initial_paid_fee = self
            .fee_calculator
            .compute_tx_fee_based_on_gas_used(tx, tx.gas_limit);

        let parsed = self.data_field_parser.parse(&tx.data, &tx.sender, &tx.receiver);

        Transaction {
            hash: hex::encode(tx_hash),
            mb_hash: mb_hash.to_string(),
            nonce: tx.nonce,
            round: header.round,
            value: tx.value.to_string(),
            receiver: self.codec.encode(&tx.receiver),
            sender: self.codec.encode(&tx.sender),
            receiver_shard: mb.receiver_shard,
            sender_shard: mb.sender_shard,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            gas_used,
            fee: fee.to_string(),
            initial_paid_fee: initial_paid_fee.to_string(),
            data: tx.data.clone(),
            signature: hex::encode(&tx.signature),
            timestamp: header.timestamp,
            status: status.to_string(),
            sender_user_name: tx.sender_username.clone(),
            receiver_user_name: tx.receiver_username.clone(),
            receiver_address_bytes: tx.receiver.clone(),
            is_sc_call: is_smart_contract_address(&tx.receiver),
            operation: parsed.operation,
            function: parsed.function,
            tokens: parsed.tokens,
            mect_values: parsed.mect_values,
            receivers: self.encode_receivers(&parsed.receivers),
            receivers_shard_ids: parsed.receivers_shard_ids,
            is_relayed: parsed.is_relayed,
            version: tx.version as u64,
            ..Default::default()
        }
    }

    pub fn prepare_reward_transaction(
        &self,
        reward: &RawReward,
        tx_hash: &[u8],
        mb_hash: &str,
        mb: &MiniBlock,
        header: &Header,
        status: &str,
    ) -> Transaction {
        Transaction {
            hash: hex::encode(tx_hash),
            mb_hash: mb_hash.to_string(),
            round: reward.round,
            value: reward.value.to_string(),
            receiver: self.codec.encode(&reward.receiver),
            sender: METACHAIN_SHARD_ID.to_string(),
            receiver_shard: mb.receiver_shard,
            sender_shard: mb.sender_shard,
            timestamp: header.timestamp,
            status: status.to_string(),
            operation: REWARDS_OPERATION.to_string(),
            ..Default::default()
        }
    }

    pub fn prepare_receipt(&self, rec_hash: &[u8], rec: &RawReceipt, header: &Header) -> Receipt {
        Receipt {
            hash: hex::encode(rec_hash),
            value: rec.value.to_string(),
            sender: self.codec.encode(&rec.sender),
            data: String::from_utf8_lossy(&rec.data).into_owned(),
            tx_hash: hex::encode(&rec.tx_hash),
            timestamp: header.timestamp,
        }
    }

    fn encode_receivers(&self, receivers: &[Vec<u8>]) -> Vec<String> {
        receivers.iter().map(|addr| self.codec.encode(addr)).collect()
    }
}

pub(crate) fn is_smart_contract_address(address: &[u8]) -> bool {
    address.len() > NUM_INIT_CHARACTERS_FOR_SC_ADDRESS
        && address[..NUM_INIT_CHARACTERS_FOR_SC_ADDRESS]
            .iter()
            .all(|b| *b == 0)
}
