use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::constants::{TX_STATUS_INVALID, TX_STATUS_PENDING, TX_STATUS_SUCCESS};
use crate::interface::FeeCalculator;
use crate::models::common::{Header, MiniBlock, MiniBlockType, RawReceipt, RawReward, RawTransaction};
use crate::models::datasets::accounts::{AlteredAccountMark, AlteredAccounts};
use crate::models::datasets::transactions::{Receipt, Transaction};

use super::builder::TransactionBuilder;

/// Walks the block body miniblock by miniblock and resolves each hash against
/// the pool, producing documents keyed by raw hash.
pub(crate) struct TxsGrouper<'a> {
    builder: &'a TransactionBuilder,
    fee_calculator: Arc<dyn FeeCalculator>,
    self_shard: u32,
    is_import_mode: bool,
}

impl<'a> TxsGrouper<'a> {
    pub fn new(
        builder: &'a TransactionBuilder,
        fee_calculator: Arc<dyn FeeCalculator>,
        self_shard: u32,
        is_import_mode: bool,
    ) -> Self {
        Self {
            builder,
            fee_calculator,
            self_shard,
            is_import_mode,
        }
    }

    pub fn group_normal_txs(
        &self,
        mb: &MiniBlock,
        header: &Header,
        txs: &HashMap<Vec<u8>, RawTransaction>,
        altered: &mut AlteredAccounts,
    ) -> HashMap<Vec<u8>, Transaction> {
        let mb_hash = compute_miniblock_hash(mb);
        let status = self.miniblock_status(mb);

        let mut grouped = HashMap::with_capacity(mb.tx_hashes.len());
        for tx_hash in &mb.tx_hashes {
            let Some(raw) = txs.get(tx_hash) else {
                debug!(tx_hash = %hex::encode(tx_hash), "transaction not found in pool");
                continue;
            };

            let db_tx = self
                .builder
                .prepare_transaction(raw, tx_hash, &mb_hash, mb, header, status);
            self.add_to_altered_accounts(&db_tx, mb, altered);
            if self.should_index(mb.receiver_shard) {
                grouped.insert(tx_hash.clone(), db_tx);
            }
        }

        grouped
    }

    pub fn group_invalid_txs(
        &self,
        mb: &MiniBlock,
        header: &Header,
        txs: &HashMap<Vec<u8>, RawTransaction>,
        altered: &mut AlteredAccounts,
    ) -> HashMap<Vec<u8>, Transaction> {
        let mb_hash = compute_miniblock_hash(mb);

        let mut grouped = HashMap::with_capacity(mb.tx_hashes.len());
        for tx_hash in &mb.tx_hashes {
            let Some(raw) = txs.get(tx_hash) else {
                debug!(tx_hash = %hex::encode(tx_hash), "invalid transaction not found in pool");
                continue;
            };

            let mut db_tx =
                self.builder
                    .prepare_transaction(raw, tx_hash, &mb_hash, mb, header, TX_STATUS_INVALID);

            // an invalid transaction consumes its whole gas allowance
            db_tx.gas_used = db_tx.gas_limit;
            db_tx.fee = self
                .fee_calculator
                .compute_tx_fee_based_on_gas_used(&db_tx, db_tx.gas_used)
                .to_string();

            // the receiver side never executes, only the sender is altered
            altered.add(
                db_tx.sender.clone(),
                AlteredAccountMark {
                    is_sender: true,
                    balance_change: true,
                    ..Default::default()
                },
            );
            grouped.insert(tx_hash.clone(), db_tx);
        }

        grouped
    }

    pub fn group_rewards_txs(
        &self,
        mb: &MiniBlock,
        header: &Header,
        rewards: &HashMap<Vec<u8>, RawReward>,
        altered: &mut AlteredAccounts,
    ) -> HashMap<Vec<u8>, Transaction> {
        let mb_hash = compute_miniblock_hash(mb);
        let status = self.miniblock_status(mb);

        let mut grouped = HashMap::with_capacity(mb.tx_hashes.len());
        for tx_hash in &mb.tx_hashes {
            let Some(reward) = rewards.get(tx_hash) else {
                debug!(tx_hash = %hex::encode(tx_hash), "reward not found in pool");
                continue;
            };

            let db_tx = self
                .builder
                .prepare_reward_transaction(reward, tx_hash, &mb_hash, mb, header, status);
            if self.self_shard == mb.receiver_shard {
                altered.add(
                    db_tx.receiver.clone(),
                    AlteredAccountMark {
                        balance_change: true,
                        ..Default::default()
                    },
                );
            }
            if self.should_index(mb.receiver_shard) {
                grouped.insert(tx_hash.clone(), db_tx);
            }
        }

        grouped
    }

    pub fn group_receipts(
        &self,
        header: &Header,
        receipts: &HashMap<Vec<u8>, RawReceipt>,
    ) -> Vec<Receipt> {
        receipts
            .iter()
            .map(|(hash, rec)| self.builder.prepare_receipt(hash, rec, header))
            .collect()
    }

    fn miniblock_status(&self, mb: &MiniBlock) -> &'static str {
        if self.self_shard == mb.receiver_shard {
            TX_STATUS_SUCCESS
        } else {
            TX_STATUS_PENDING
        }
    }

    fn add_to_altered_accounts(
        &self,
        tx: &Transaction,
        mb: &MiniBlock,
        altered: &mut AlteredAccounts,
    ) {
        if mb.sender_shard == self.self_shard {
            altered.add(
                tx.sender.clone(),
                AlteredAccountMark {
                    is_sender: true,
                    balance_change: true,
                    ..Default::default()
                },
            );
        }
        if mb.receiver_shard == self.self_shard {
            altered.add(
                tx.receiver.clone(),
                AlteredAccountMark {
                    balance_change: true,
                    ..Default::default()
                },
            );
        }
    }

    fn should_index(&self, destination_shard: u32) -> bool {
        if !self.is_import_mode {
            return true;
        }

        self.self_shard == destination_shard
    }
}

/// Content hash of a miniblock, stable across the shards that carry it.
pub(crate) fn compute_miniblock_hash(mb: &MiniBlock) -> String {
    let mut hasher = Sha256::new();
    hasher.update([miniblock_type_tag(mb.mb_type)]);
    hasher.update(mb.sender_shard.to_be_bytes());
    hasher.update(mb.receiver_shard.to_be_bytes());
    for tx_hash in &mb.tx_hashes {
        hasher.update(tx_hash);
    }

    hex::encode(hasher.finalize())
}

fn miniblock_type_tag(mb_type: MiniBlockType) -> u8 {
    match mb_type {
        MiniBlockType::Tx => 0,
        MiniBlockType::SmartContractResult => 1,
        MiniBlockType::Rewards => 2,
        MiniBlockType::Invalid => 3,
        MiniBlockType::Receipt => 4,
    }
}
