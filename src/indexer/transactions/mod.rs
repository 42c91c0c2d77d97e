//! Transaction pipeline: grouping by miniblock, document building and the
//! reconciliation of smart contract results onto their origin transactions.

mod builder;
mod checkers;
mod grouper;
mod scrs;

use std::collections::HashMap;
use std::sync::Arc;

use crate::interface::{AddressCodec, DataFieldParser, FeeCalculator, ShardRouter};
use crate::models::common::{Body, Header, MiniBlockType, Pool};
use crate::models::datasets::accounts::AlteredAccounts;
use crate::models::datasets::transactions::{PreparedResults, Transaction};

use builder::TransactionBuilder;
use grouper::TxsGrouper;
use scrs::{ScResultsProcessor, ScrsDataToTransactions};

pub(crate) use builder::is_smart_contract_address;
pub(crate) use checkers::{is_cross_shard_on_source_shard, is_nft_transfer_or_multi_transfer};

/// Dependencies required to build a [`TransactionsProcessor`].
pub struct TransactionsProcessorArgs {
    pub codec: Arc<dyn AddressCodec>,
    pub fee_calculator: Arc<dyn FeeCalculator>,
    pub router: Arc<dyn ShardRouter>,
    pub data_field_parser: Arc<dyn DataFieldParser>,
    /// When replaying history, only documents destined to this shard are
    /// indexed, so replicas do not fight over cross-shard rows.
    pub is_import_mode: bool,
}

/// Turns the raw pool of one block into transaction, result and receipt
/// documents, with gas and status reconciled across the result chains.
pub struct TransactionsProcessor {
    builder: TransactionBuilder,
    scrs_proc: ScResultsProcessor,
    scrs_to_txs: ScrsDataToTransactions,
    fee_calculator: Arc<dyn FeeCalculator>,
    self_shard: u32,
    is_import_mode: bool,
}

impl TransactionsProcessor {
    pub fn new(args: TransactionsProcessorArgs) -> Self {
        let builder = TransactionBuilder::new(
            args.codec.clone(),
            args.fee_calculator.clone(),
            args.data_field_parser.clone(),
        );
        let scrs_proc = ScResultsProcessor::new(
            args.codec.clone(),
            args.router.clone(),
            args.data_field_parser.clone(),
        );
        let scrs_to_txs = ScrsDataToTransactions::new(args.fee_calculator.clone());

        Self {
            builder,
            scrs_proc,
            scrs_to_txs,
            fee_calculator: args.fee_calculator,
            self_shard: args.router.self_shard(),
            is_import_mode: args.is_import_mode,
        }
    }

    /// Processes the block body against the pool. The output is complete and
    /// self-contained; nothing is kept between invocations.
    pub fn prepare_transactions_for_database(
        &self,
        body: &Body,
        header: &Header,
        pool: &Pool,
    ) -> PreparedResults {
        let grouper = TxsGrouper::new(
            &self.builder,
            self.fee_calculator.clone(),
            self.self_shard,
            self.is_import_mode,
        );

        let mut altered = AlteredAccounts::new();
        let mut normal: HashMap<Vec<u8>, Transaction> = HashMap::new();
        let mut rewards: HashMap<Vec<u8>, Transaction> = HashMap::new();

        for mb in &body.miniblocks {
            match mb.mb_type {
                MiniBlockType::Tx => {
                    normal.extend(grouper.group_normal_txs(mb, header, &pool.txs, &mut altered));
                }
                MiniBlockType::Rewards => {
                    rewards.extend(grouper.group_rewards_txs(
                        mb,
                        header,
                        &pool.rewards,
                        &mut altered,
                    ));
                }
                MiniBlockType::Invalid => {
                    normal.extend(grouper.group_invalid_txs(
                        mb,
                        header,
                        &pool.invalid,
                        &mut altered,
                    ));
                }
                _ => {}
            }
        }

        let receipts = grouper.group_receipts(header, &pool.receipts);
        let sc_results = self.scrs_proc.process_scrs(body, header, &pool.scrs);
        self.scrs_proc
            .add_scrs_receiver_to_altered_accounts(&mut altered, &sc_results);

        let orphans = self.scrs_to_txs.attach_scrs_to_txs(&mut normal, &sc_results);
        self.scrs_to_txs.process_txs_after_scrs_attached(&mut normal);
        let (tx_hash_status, tx_hash_refund) = self.scrs_to_txs.process_scrs_without_tx(&orphans);

        let transactions = collect_in_block_order(body, normal, rewards);

        PreparedResults {
            transactions,
            sc_results,
            receipts,
            altered_accounts: altered,
            tx_hash_status,
            tx_hash_refund,
        }
    }
}

/// Flattens the grouped maps back into the order the block body lists the
/// hashes, assigning the per-block search order as it goes.
fn collect_in_block_order(
    body: &Body,
    mut normal: HashMap<Vec<u8>, Transaction>,
    mut rewards: HashMap<Vec<u8>, Transaction>,
) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(normal.len() + rewards.len());
    let mut search_order = 0u32;
    for mb in &body.miniblocks {
        for tx_hash in &mb.tx_hashes {
            if let Some(mut tx) = normal.remove(tx_hash) {
                tx.search_order = search_order;
                search_order += 1;
                transactions.push(tx);
            } else if let Some(tx) = rewards.remove(tx_hash) {
                transactions.push(tx);
            }
        }
    }

    transactions
}
