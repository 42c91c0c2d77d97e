//! Event classification and extraction.
//!
//! A fixed chain of interpreters, each owning a set of recognized operation
//! identifiers, turns opaque execution events into structured deltas. The
//! chain order is load-bearing: fungible and non-fungible processors share
//! identifiers and rely on the topic-1 nonce to pass events to each other.

mod delegators;
mod fungible;
mod informative;
mod issue;
mod nft_properties;
mod nfts;
mod properties;
mod sc_deploys;

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::constants::METACHAIN_SHARD_ID;
use crate::converters::balance::BalanceConverter;
use crate::interface::{AddressCodec, FeeCalculator, ShardRouter};
use crate::models::common::{Event, TxLog};
use crate::models::datasets::accounts::AlteredAccounts;
use crate::models::datasets::logs::{EventDoc, Logs};
use crate::models::datasets::tokens::{
    Delegator, NftDataUpdate, ScDeployInfo, TokenInfo, TokenRolesAndProperties, TokensCollection,
};
use crate::models::datasets::transactions::{
    PreparedLogsResults, PreparedResults, ScResult, Transaction,
};

use delegators::DelegatorsProcessor;
use fungible::FungibleTokensProcessor;
use informative::InformativeLogsProcessor;
use issue::IssueProcessor;
use nft_properties::NftPropertiesProcessor;
use nfts::NftsProcessor;
use properties::TokenPropertiesProcessor;
use sc_deploys::ScDeploysProcessor;

pub(crate) const NUM_TOPICS_WITH_RECEIVER_ADDRESS: usize = 4;

/// Everything one processor call may read or touch while interpreting a
/// single event.
pub(crate) struct ProcessEventArgs<'a> {
    pub event: &'a Event,
    pub tx_hash_hex: &'a str,
    pub log_address: &'a [u8],
    pub timestamp: u64,
    pub accounts: &'a mut AlteredAccounts,
    pub tokens: &'a mut TokensCollection,
    pub tokens_supply: &'a mut TokensCollection,
    pub sc_deploys: &'a mut HashMap<String, ScDeployInfo>,
    pub txs: &'a mut Vec<Transaction>,
    pub tx_index: &'a HashMap<String, usize>,
    pub token_roles_and_properties: &'a mut TokenRolesAndProperties,
}

/// What a processor extracted from an event.
#[derive(Debug, Default)]
pub(crate) struct EventOutcome {
    pub identifier: String,
    pub value: String,
    pub receiver: String,
    pub receiver_shard: u32,
    pub token_info: Option<Box<TokenInfo>>,
    pub delegator: Option<Delegator>,
    pub nft_update: Option<NftDataUpdate>,
    pub processed: bool,
}

impl EventOutcome {
    /// The event's operation identifier belongs to another processor.
    pub fn not_recognized() -> Self {
        Self::default()
    }

    /// The event is ours but malformed or carries nothing to extract; stop
    /// the chain so a later processor cannot misinterpret it.
    pub fn processed_no_op() -> Self {
        Self {
            processed: true,
            ..Self::default()
        }
    }
}

/// Closed set of interpreters, iterated in priority order. The set is closed
/// on purpose: the fungible/NFT disambiguation depends on exact ordering and
/// must not be reordered by an open registration mechanism.
pub(crate) enum EventProcessor {
    Fungible(FungibleTokensProcessor),
    Nfts(NftsProcessor),
    ScDeploys(ScDeploysProcessor),
    Informative(InformativeLogsProcessor),
    NftProperties(NftPropertiesProcessor),
    TokenProperties(TokenPropertiesProcessor),
    Issue(IssueProcessor),
    Delegators(DelegatorsProcessor),
}

impl EventProcessor {
    fn process(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        match self {
            Self::Fungible(p) => p.process_event(args),
            Self::Nfts(p) => p.process_event(args),
            Self::ScDeploys(p) => p.process_event(args),
            Self::Informative(p) => p.process_event(args),
            Self::NftProperties(p) => p.process_event(args),
            Self::TokenProperties(p) => p.process_event(args),
            Self::Issue(p) => p.process_event(args),
            Self::Delegators(p) => p.process_event(args),
        }
    }
}

/// Dependencies required to build a [`LogsAndEventsProcessor`].
pub struct LogsAndEventsProcessorArgs {
    pub router: Arc<dyn ShardRouter>,
    pub codec: Arc<dyn AddressCodec>,
    pub fee_calculator: Arc<dyn FeeCalculator>,
    pub balance_converter: BalanceConverter,
}

/// Iterates the logs of one block and offers every event to the processor
/// chain, aggregating the extracted side tables.
pub struct LogsAndEventsProcessor {
    codec: Arc<dyn AddressCodec>,
    processors: Vec<EventProcessor>,
}

impl LogsAndEventsProcessor {
    pub fn new(args: LogsAndEventsProcessorArgs) -> Self {
        let mut processors = vec![
            EventProcessor::Fungible(FungibleTokensProcessor::new(
                args.codec.clone(),
                args.router.clone(),
            )),
            EventProcessor::Nfts(NftsProcessor::new(args.router.clone(), args.codec.clone())),
            EventProcessor::ScDeploys(ScDeploysProcessor::new(args.codec.clone())),
            EventProcessor::Informative(InformativeLogsProcessor::new(args.fee_calculator)),
            EventProcessor::NftProperties(NftPropertiesProcessor::new(args.codec.clone())),
            EventProcessor::TokenProperties(TokenPropertiesProcessor::new(args.codec.clone())),
        ];

        // issuance and delegation events only ever originate on the metachain
        if args.router.self_shard() == METACHAIN_SHARD_ID {
            processors.push(EventProcessor::Issue(IssueProcessor::new(args.codec.clone())));
            processors.push(EventProcessor::Delegators(DelegatorsProcessor::new(
                args.codec.clone(),
                args.balance_converter,
            )));
        }

        Self {
            codec: args.codec,
            processors,
        }
    }

    /// Extracts the derived state deltas from the block's logs, marking the
    /// originating transactions and results as carrying operations.
    pub fn extract_data_from_logs(
        &self,
        logs: &[TxLog],
        prepared: &mut PreparedResults,
        timestamp: u64,
    ) -> PreparedLogsResults {
        let tx_index = index_by_hash(&prepared.transactions, |tx: &Transaction| &tx.hash);
        let scr_index = index_by_hash(&prepared.sc_results, |scr: &ScResult| &scr.hash);

        let mut results = PreparedLogsResults::default();
        for tx_log in logs {
            let tx_hash_hex = hex::encode(&tx_log.tx_hash);
            for event in &tx_log.events {
                self.process_event(
                    event,
                    &tx_hash_hex,
                    &tx_log.address,
                    timestamp,
                    prepared,
                    &tx_index,
                    &scr_index,
                    &mut results,
                );
            }
        }

        for token in results.tokens.get_all() {
            if let Some(data) = &token.data {
                results.tags.parse_tags(&data.tags);
            }
        }

        results
    }

    #[allow(clippy::too_many_arguments)]
    fn process_event(
        &self,
        event: &Event,
        tx_hash_hex: &str,
        log_address: &[u8],
        timestamp: u64,
        prepared: &mut PreparedResults,
        tx_index: &HashMap<String, usize>,
        scr_index: &HashMap<String, usize>,
        results: &mut PreparedLogsResults,
    ) {
        for processor in &self.processors {
            let outcome = {
                let mut args = ProcessEventArgs {
                    event,
                    tx_hash_hex,
                    log_address,
                    timestamp,
                    accounts: &mut prepared.altered_accounts,
                    tokens: &mut results.tokens,
                    tokens_supply: &mut results.tokens_supply,
                    sc_deploys: &mut results.sc_deploys,
                    txs: &mut prepared.transactions,
                    tx_index,
                    token_roles_and_properties: &mut results.token_roles_and_properties,
                };
                processor.process(&mut args)
            };

            if let Some(token_info) = outcome.token_info {
                results.tokens_info.push(*token_info);
            }
            if let Some(delegator) = outcome.delegator {
                let key = format!("{}{}", delegator.address, delegator.contract);
                results.delegators.insert(key, delegator);
            }
            if let Some(update) = outcome.nft_update {
                results.nft_data_updates.push(update);
            }

            let is_empty_identifier = outcome.identifier.is_empty();
            if is_empty_identifier && outcome.processed {
                return;
            }

            if !is_empty_identifier {
                debug!(
                    identifier = %outcome.identifier,
                    value = %outcome.value,
                    receiver = %outcome.receiver,
                    receiver_shard = outcome.receiver_shard,
                    "token operation"
                );
                if let Some(&idx) = tx_index.get(tx_hash_hex) {
                    prepared.transactions[idx].has_operations = true;
                    continue;
                }
                if let Some(&idx) = scr_index.get(tx_hash_hex) {
                    prepared.sc_results[idx].has_operations = true;
                    return;
                }
            }

            if outcome.processed {
                return;
            }
        }
    }

    /// Prepares the raw log documents for the database.
    pub fn prepare_logs_for_db(
        &self,
        logs: &[TxLog],
        prepared: &PreparedResults,
        timestamp: u64,
    ) -> Vec<Logs> {
        let original_hashes: HashMap<&str, &str> = prepared
            .sc_results
            .iter()
            .map(|scr| (scr.hash.as_str(), scr.original_tx_hash.as_str()))
            .collect();

        logs.iter()
            .map(|tx_log| {
                let id = hex::encode(&tx_log.tx_hash);
                let original_tx_hash = original_hashes
                    .get(id.as_str())
                    .map(|hash| hash.to_string())
                    .unwrap_or_default();

                Logs {
                    original_tx_hash,
                    address: self.codec.encode(&tx_log.address),
                    timestamp,
                    events: tx_log
                        .events
                        .iter()
                        .enumerate()
                        .map(|(order, event)| EventDoc {
                            address: self.codec.encode(&event.address),
                            identifier: event.identifier_str().to_string(),
                            topics: event.topics.iter().map(|t| BASE64.encode(t)).collect(),
                            data: if event.data.is_empty() {
                                String::new()
                            } else {
                                BASE64.encode(&event.data)
                            },
                            order,
                        })
                        .collect(),
                    id,
                }
            })
            .collect()
    }
}

fn index_by_hash<T>(items: &[T], hash_of: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| (hash_of(item).clone(), idx))
        .collect()
}
