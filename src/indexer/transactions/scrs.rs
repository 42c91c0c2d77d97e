use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{
    GAS_REFUND_FOR_RELAYER_MESSAGE, TX_STATUS_FAIL, TX_STATUS_INVALID, VM_ERROR_CODES,
};
use crate::interface::{AddressCodec, DataFieldParser, FeeCalculator, ShardRouter};
use crate::models::common::{Body, Header, MiniBlockType, RawScResult};
use crate::models::datasets::accounts::{AlteredAccountMark, AlteredAccounts};
use crate::models::datasets::transactions::{RefundData, ScResult, Transaction};

use super::checkers::{
    MIN_ARGS_NFT_TRANSFER_OR_MULTI_TRANSFER, is_nft_transfer_or_multi_transfer_payload,
    is_refund_for_relayed, is_relayed_tx, is_scr_for_sender_with_refund, is_scr_successful,
    string_value_to_u256,
};
use super::grouper::compute_miniblock_hash;

/// Builds smart contract result documents out of the pool, following the
/// miniblock layout where one exists.
pub(crate) struct ScResultsProcessor {
    codec: Arc<dyn AddressCodec>,
    router: Arc<dyn ShardRouter>,
    data_field_parser: Arc<dyn DataFieldParser>,
}

impl ScResultsProcessor {
    pub fn new(
        codec: Arc<dyn AddressCodec>,
        router: Arc<dyn ShardRouter>,
        data_field_parser: Arc<dyn DataFieldParser>,
    ) -> Self {
        Self {
            codec,
            router,
            data_field_parser,
        }
    }

    pub fn process_scrs(
        &self,
        body: &Body,
        header: &Header,
        scrs: &HashMap<Vec<u8>, RawScResult>,
    ) -> Vec<ScResult> {
        let mut remaining: HashMap<&[u8], &RawScResult> =
            scrs.iter().map(|(hash, scr)| (hash.as_slice(), scr)).collect();

        let mut all = Vec::with_capacity(scrs.len());
        for mb in &body.miniblocks {
            if mb.mb_type != MiniBlockType::SmartContractResult {
                continue;
            }

            let mb_hash = compute_miniblock_hash(mb);
            for hash in &mb.tx_hashes {
                let Some(raw) = remaining.remove(hash.as_slice()) else {
                    continue;
                };
                all.push(self.prepare_sc_result(
                    hash,
                    &mb_hash,
                    raw,
                    header,
                    mb.sender_shard,
                    mb.receiver_shard,
                ));
            }
        }

        // results produced and consumed inside the block never reach a miniblock
        let self_shard = self.router.self_shard();
        for (hash, raw) in remaining {
            all.push(self.prepare_sc_result(hash, "", raw, header, self_shard, self_shard));
        }

        all
    }

    fn prepare_sc_result(
        &self,
        hash: &[u8],
        mb_hash: &str,
        scr: &RawScResult,
        header: &Header,
        sender_shard: u32,
        receiver_shard: u32,
    ) -> ScResult {
        let parsed = self
            .data_field_parser
            .parse(&scr.data, &scr.sender, &scr.receiver);

        let (relayer_addr, relayed_value) = if scr.relayer.is_empty() {
            (String::new(), String::new())
        } else {
            (self.codec.encode(&scr.relayer), scr.relayed_value.to_string())
        };

        ScResult {
            hash: hex::encode(hash),
            mb_hash: mb_hash.to_string(),
            nonce: scr.nonce,
            gas_limit: scr.gas_limit,
            gas_price: scr.gas_price,
            value: scr.value.to_string(),
            sender: self.codec.encode(&scr.sender),
            receiver: self.codec.encode(&scr.receiver),
            sender_shard,
            receiver_shard,
            relayer_addr,
            relayed_value,
            code: String::from_utf8_lossy(&scr.code).into_owned(),
            data: scr.data.clone(),
            prev_tx_hash: hex::encode(&scr.prev_tx_hash),
            original_tx_hash: hex::encode(&scr.original_tx_hash),
            call_type: scr.call_type.clone(),
            code_meta_data: scr.code_metadata.clone(),
            return_message: scr.return_message.clone(),
            timestamp: header.timestamp,
            original_sender: if scr.original_sender.is_empty() {
                String::new()
            } else {
                self.codec.encode(&scr.original_sender)
            },
            operation: parsed.operation,
            function: parsed.function,
            tokens: parsed.tokens,
            mect_values: parsed.mect_values,
            receivers: parsed
                .receivers
                .iter()
                .map(|addr| self.codec.encode(addr))
                .collect(),
            receivers_shard_ids: parsed.receivers_shard_ids,
            sender_address_bytes: scr.sender.to_vec(),
            has_operations: false,
        }
    }

    /// Value-bearing results alter their local receiver's balance.
    pub fn add_scrs_receiver_to_altered_accounts(
        &self,
        altered: &mut AlteredAccounts,
        scrs: &[ScResult],
    ) {
        for scr in scrs {
            let Ok(receiver_bytes) = self.codec.decode(&scr.receiver) else {
                continue;
            };
            if self.router.compute_shard(&receiver_bytes) != self.router.self_shard() {
                continue;
            }

            let moves_value = (scr.value != "0" && !scr.value.is_empty()) || !scr.tokens.is_empty();
            if !moves_value {
                continue;
            }

            altered.add(
                scr.receiver.clone(),
                AlteredAccountMark {
                    balance_change: true,
                    ..Default::default()
                },
            );
        }
    }
}

/// Reconciles the produced result documents back onto their originating
/// transactions, correcting gas, fees and statuses.
pub(crate) struct ScrsDataToTransactions {
    fee_calculator: Arc<dyn FeeCalculator>,
}

impl ScrsDataToTransactions {
    pub fn new(fee_calculator: Arc<dyn FeeCalculator>) -> Self {
        Self { fee_calculator }
    }

    /// Attaches each result to its origin transaction when the origin lives
    /// in this shard, returning the orphans.
    pub fn attach_scrs_to_txs(
        &self,
        txs: &mut HashMap<Vec<u8>, Transaction>,
        scrs: &[ScResult],
    ) -> Vec<ScResult> {
        let mut orphans = Vec::new();
        for scr in scrs {
            let Ok(original_hash) = hex::decode(&scr.original_tx_hash) else {
                continue;
            };
            match txs.get_mut(&original_hash) {
                Some(tx) => self.add_scr_info_into_tx(scr, tx),
                None => orphans.push(scr.clone()),
            }
        }

        orphans
    }

    fn add_scr_info_into_tx(&self, scr: &ScResult, tx: &mut Transaction) {
        tx.smart_contract_results.push(scr.clone());

        let is_relayed_first_scr = is_relayed_tx(tx) && tx.smart_contract_results.len() == 1;
        if is_relayed_first_scr {
            tx.gas_used = tx.gas_limit;
            tx.fee = self
                .fee_calculator
                .compute_tx_fee_based_on_gas_used(tx, tx.gas_used)
                .to_string();
        }

        // invalid transactions already carry their final status and gas
        if tx.status == TX_STATUS_INVALID {
            return;
        }

        if is_scr_for_sender_with_refund(scr, tx) || is_refund_for_relayed(scr, tx) {
            let refund = string_value_to_u256(&scr.value);
            let (gas_used, fee) = self
                .fee_calculator
                .compute_gas_used_and_fee_based_on_refund_value(tx, refund);
            tx.gas_used = gas_used;
            tx.fee = fee.to_string();
            tx.had_refund = true;
        }
    }

    /// Second pass once all results are attached: settles the status and the
    /// charged gas of every transaction that produced results.
    pub fn process_txs_after_scrs_attached(&self, txs: &mut HashMap<Vec<u8>, Transaction>) {
        for tx in txs.values_mut() {
            if tx.smart_contract_results.is_empty() {
                continue;
            }

            self.fill_tx_with_scr_fields(tx);
        }
    }

    fn fill_tx_with_scr_fields(&self, tx: &mut Transaction) {
        tx.has_scr = true;

        if is_relayed_tx(tx) || tx.status == TX_STATUS_INVALID {
            return;
        }

        if tx
            .smart_contract_results
            .iter()
            .any(|scr| is_scr_successful(&scr.data))
        {
            return;
        }

        tx.gas_used = tx.gas_limit;
        tx.fee = self
            .fee_calculator
            .compute_tx_fee_based_on_gas_used(tx, tx.gas_used)
            .to_string();

        if has_cross_shard_pending_transfer(tx) {
            return;
        }

        if has_scr_with_error_code(tx) {
            tx.status = TX_STATUS_FAIL.to_string();
        }
    }

    /// Orphan results carry information about transactions indexed by other
    /// shards: refunds to forward and failures to record.
    pub fn process_scrs_without_tx(
        &self,
        scrs: &[ScResult],
    ) -> (HashMap<String, String>, HashMap<String, RefundData>) {
        let mut tx_hash_status = HashMap::new();
        let mut tx_hash_refund = HashMap::new();
        for scr in scrs {
            if is_scr_with_refund(scr) {
                tx_hash_refund.insert(
                    scr.original_tx_hash.clone(),
                    RefundData {
                        value: scr.value.clone(),
                        receiver: scr.receiver.clone(),
                    },
                );
            }

            if is_nft_transfer_with_user_error(&scr.data) {
                tx_hash_status.insert(scr.original_tx_hash.clone(), TX_STATUS_FAIL.to_string());
            }
        }

        (tx_hash_status, tx_hash_refund)
    }
}

fn has_scr_with_error_code(tx: &Transaction) -> bool {
    tx.smart_contract_results.iter().any(|scr| {
        let data = String::from_utf8_lossy(&scr.data);
        VM_ERROR_CODES
            .iter()
            .any(|code| data.contains(&hex::encode(code)) || scr.return_message == *code)
    })
}

fn has_cross_shard_pending_transfer(tx: &Transaction) -> bool {
    tx.smart_contract_results.iter().any(|scr| {
        match is_nft_transfer_or_multi_transfer_payload(&scr.data) {
            Some(parts) if parts.len() >= 2 => scr.sender_shard != scr.receiver_shard,
            _ => false,
        }
    })
}

fn is_scr_with_refund(scr: &ScResult) -> bool {
    let has_refund = !scr.value.is_empty() && scr.value != "0";
    let is_successful = is_scr_successful(&scr.data);
    let is_refund_for_relayer = scr.return_message == GAS_REFUND_FOR_RELAYER_MESSAGE;

    (is_successful || is_refund_for_relayer)
        && scr.original_tx_hash != scr.prev_tx_hash
        && has_refund
}

fn is_nft_transfer_with_user_error(scr_data: &[u8]) -> bool {
    let Some(parts) = is_nft_transfer_or_multi_transfer_payload(scr_data) else {
        return false;
    };
    if parts.len() < MIN_ARGS_NFT_TRANSFER_OR_MULTI_TRANSFER {
        return false;
    }

    parts[parts.len() - 1] == hex::encode("user error")
}
