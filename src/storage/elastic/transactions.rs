use std::collections::HashMap;

use serde_json::json;

use crate::indexer::transactions::{is_cross_shard_on_source_shard, is_nft_transfer_or_multi_transfer};
use crate::interface::FeeCalculator;
use crate::models::datasets::transactions::{Receipt, RefundData, ScResult, Transaction};
use crate::models::errors::SerializeError;
use crate::storage::BufferSlice;

use super::{index_meta, marshal, scripts, update_meta};

/// Serializes the transaction documents, picking the write strategy per
/// transaction, then appends the status patches recovered from orphan
/// results.
pub fn serialize_transactions(
    transactions: &[Transaction],
    tx_hash_status: &HashMap<String, String>,
    self_shard: u32,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for tx in transactions {
        let (meta, body) = prepare_serialized_transaction(tx, self_shard, index)?;
        buffer.put_data(&meta, &body)?;
    }

    for (tx_hash, status) in tx_hash_status {
        let body = json!({
            "script": {
                "source": scripts::TX_SET_STATUS,
                "lang": "painless",
                "params": {"status": status},
            },
            "upsert": {"status": status},
        });
        buffer.put_data(&update_meta(index, tx_hash), &body.to_string())?;
    }

    Ok(())
}

fn prepare_serialized_transaction(
    tx: &Transaction,
    self_shard: u32,
    index: &str,
) -> Result<(String, String), SerializeError> {
    let marshaled = marshal(tx, index)?;

    // at the source of a cross-shard transfer only the first write may land;
    // the destination shard owns every later revision
    if is_cross_shard_on_source_shard(tx, self_shard) {
        let body = format!(r#"{{"script":{{"source":"return"}},"upsert":{}}}"#, marshaled);
        return Ok((update_meta(index, &tx.hash), body));
    }

    // same-shard token transfers may race with a status patch, so the stored
    // status survives the rewrite
    if is_nft_transfer_or_multi_transfer(tx) {
        let body = json!({
            "scripted_upsert": true,
            "script": {
                "source": scripts::TX_PRESERVE_STATUS,
                "lang": "painless",
                "params": {"tx": tx},
            },
            "upsert": {},
        });
        return Ok((update_meta(index, &tx.hash), body.to_string()));
    }

    Ok((index_meta(index, &tx.hash), marshaled))
}

/// Re-indexes the transactions whose refund arrived in a later block, with
/// gas and fee recomputed from the refunded value.
pub fn serialize_transactions_with_refund(
    txs: &HashMap<String, Transaction>,
    tx_hash_refund: &HashMap<String, RefundData>,
    fee_calculator: &dyn FeeCalculator,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for (tx_hash, tx) in txs {
        let Some(refund) = tx_hash_refund.get(tx_hash) else {
            continue;
        };
        if refund.receiver != tx.sender {
            continue;
        }
        let Ok(refund_value) = primitive_types::U256::from_dec_str(&refund.value) else {
            continue;
        };

        let (gas_used, fee) =
            fee_calculator.compute_gas_used_and_fee_based_on_refund_value(tx, refund_value);
        let mut updated = tx.clone();
        updated.gas_used = gas_used;
        updated.fee = fee.to_string();

        buffer.put_data(&index_meta(index, tx_hash), &marshal(&updated, index)?)?;
    }

    Ok(())
}

pub fn serialize_sc_results(
    sc_results: &[ScResult],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for scr in sc_results {
        buffer.put_data(&index_meta(index, &scr.hash), &marshal(scr, index)?)?;
    }

    Ok(())
}

pub fn serialize_receipts(
    receipts: &[Receipt],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for receipt in receipts {
        buffer.put_data(&index_meta(index, &receipt.hash), &marshal(receipt, index)?)?;
    }

    Ok(())
}
