//! Shared fakes for the injected collaborators.

use anyhow::Context;
use primitive_types::U256;

use crate::interface::{
    AccountLoader, AccountSnapshot, AddressCodec, DataFieldParser, FeeCalculator, FeeInfo,
    ParsedDataField, ShardRouter, TokenSnapshot,
};

/// Encodes raw addresses as plain hex.
pub struct HexCodec;

impl AddressCodec for HexCodec {
    fn encode(&self, bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    fn decode(&self, encoded: &str) -> anyhow::Result<Vec<u8>> {
        hex::decode(encoded).context("invalid hex address")
    }

    fn address_len(&self) -> usize {
        32
    }
}

/// Routes every address to a fixed shard.
pub struct StaticRouter {
    pub self_shard: u32,
    pub computed_shard: u32,
}

impl StaticRouter {
    pub fn same_shard(shard: u32) -> Self {
        Self {
            self_shard: shard,
            computed_shard: shard,
        }
    }
}

impl ShardRouter for StaticRouter {
    fn self_shard(&self) -> u32 {
        self.self_shard
    }

    fn compute_shard(&self, _address: &[u8]) -> u32 {
        self.computed_shard
    }
}

/// Linear fee model: a fixed base cost plus a per-data-byte cost, charged at
/// the transaction's gas price.
pub struct LinearFeeCalculator {
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
}

impl Default for LinearFeeCalculator {
    fn default() -> Self {
        Self {
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
        }
    }
}

impl FeeCalculator for LinearFeeCalculator {
    fn compute_gas_limit(&self, tx: &dyn FeeInfo) -> u64 {
        self.min_gas_limit + self.gas_per_data_byte * tx.fee_data().len() as u64
    }

    fn compute_tx_fee_based_on_gas_used(&self, tx: &dyn FeeInfo, gas_used: u64) -> U256 {
        U256::from(gas_used) * U256::from(tx.fee_gas_price())
    }

    fn compute_gas_used_and_fee_based_on_refund_value(
        &self,
        tx: &dyn FeeInfo,
        refund: U256,
    ) -> (u64, U256) {
        let gas_price = U256::from(tx.fee_gas_price());
        if gas_price.is_zero() {
            return (0, U256::zero());
        }

        let refunded_gas = (refund / gas_price).low_u64();
        let gas_used = tx.fee_gas_limit().saturating_sub(refunded_gas);
        let fee = U256::from(gas_used) * gas_price;

        (gas_used, fee)
    }
}

/// Recognizes nothing; every payload comes back as an opaque transfer.
pub struct NoopDataFieldParser;

impl DataFieldParser for NoopDataFieldParser {
    fn parse(&self, _data: &[u8], _sender: &[u8], _receiver: &[u8]) -> ParsedDataField {
        ParsedDataField {
            operation: "transfer".to_string(),
            ..Default::default()
        }
    }
}

/// Serves the same snapshot for every account and token.
#[derive(Default)]
pub struct FixedAccountLoader {
    pub account: AccountSnapshot,
    pub token: TokenSnapshot,
}

impl AccountLoader for FixedAccountLoader {
    fn load_account(&self, _address: &[u8]) -> anyhow::Result<AccountSnapshot> {
        Ok(self.account.clone())
    }

    fn load_token(&self, _address: &[u8], _token: &str, _nonce: u64) -> anyhow::Result<TokenSnapshot> {
        Ok(self.token.clone())
    }
}
