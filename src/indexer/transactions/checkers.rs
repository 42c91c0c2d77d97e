//! Predicates over result payloads and the hash links between a transaction
//! and its smart contract results.

use primitive_types::U256;

use crate::constants::{
    AT_SEPARATOR, GAS_REFUND_FOR_RELAYER_MESSAGE, MECT_NFT_TRANSFER, MULTI_MECT_NFT_TRANSFER,
    RELAYED_TX_PREFIX, VM_OK,
};
use crate::models::datasets::transactions::{ScResult, Transaction};

pub(crate) const MIN_ARGS_NFT_TRANSFER_OR_MULTI_TRANSFER: usize = 4;

/// A relayed transaction is recognized by its payload prefix, once at least
/// one result was produced for it.
pub(crate) fn is_relayed_tx(tx: &Transaction) -> bool {
    String::from_utf8_lossy(&tx.data).starts_with(RELAYED_TX_PREFIX)
        && !tx.smart_contract_results.is_empty()
}

/// A successful execution surfaces the ok return code in the payload, either
/// as plain text or hex encoded.
pub(crate) fn is_scr_successful(scr_data: &[u8]) -> bool {
    let data = String::from_utf8_lossy(scr_data);
    let ok_hex = format!("{}{}", AT_SEPARATOR, hex::encode(VM_OK));
    let ok_plain = format!("{}{}", AT_SEPARATOR, VM_OK);

    data.contains(&ok_hex) || data.contains(&ok_plain)
}

fn is_data_ok(scr_data: &[u8]) -> bool {
    let ok_prefix = format!("{}{}", AT_SEPARATOR, hex::encode(VM_OK));

    String::from_utf8_lossy(scr_data).starts_with(&ok_prefix)
}

/// Refund leg sent back to the original sender at the end of execution.
pub(crate) fn is_scr_for_sender_with_refund(scr: &ScResult, tx: &Transaction) -> bool {
    let is_for_sender = scr.receiver == tx.sender;
    let is_right_nonce = scr.nonce == tx.nonce + 1;
    let is_from_current_tx = scr.prev_tx_hash == tx.hash;

    is_from_current_tx && is_for_sender && is_right_nonce && is_data_ok(&scr.data)
}

/// Refund leg compensating the relayer of a relayed transaction.
pub(crate) fn is_refund_for_relayed(scr: &ScResult, tx: &Transaction) -> bool {
    let is_for_relayed = scr.return_message == GAS_REFUND_FOR_RELAYER_MESSAGE;
    let is_for_sender = scr.receiver == tx.sender;
    let different_hash = scr.original_tx_hash != scr.prev_tx_hash;

    is_for_relayed && is_for_sender && different_hash
}

pub(crate) fn string_value_to_u256(value: &str) -> U256 {
    U256::from_dec_str(value).unwrap_or_default()
}

pub(crate) fn is_cross_shard_on_source_shard(tx: &Transaction, self_shard: u32) -> bool {
    tx.sender_shard != tx.receiver_shard && tx.sender_shard == self_shard
}

pub(crate) fn is_nft_transfer_or_multi_transfer_payload(data: &[u8]) -> Option<Vec<&str>> {
    let data = std::str::from_utf8(data).ok()?;
    let parts: Vec<&str> = data.split(AT_SEPARATOR).collect();
    let is_transfer =
        parts[0] == MECT_NFT_TRANSFER || parts[0] == MULTI_MECT_NFT_TRANSFER;

    is_transfer.then_some(parts)
}

/// An NFT or multi-token transfer executed in one shard, recognizable by its
/// payload. These keep their stored status when re-indexed.
pub(crate) fn is_nft_transfer_or_multi_transfer(tx: &Transaction) -> bool {
    if tx.sender_shard != tx.receiver_shard {
        return false;
    }

    match is_nft_transfer_or_multi_transfer_payload(&tx.data) {
        Some(parts) => parts.len() >= MIN_ARGS_NFT_TRANSFER_OR_MULTI_TRANSFER,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_result_payloads() {
        assert!(is_scr_successful(b"@ok"));
        assert!(is_scr_successful(b"@6f6b"));
        assert!(!is_scr_successful(b"user error"));
    }

    #[test]
    fn relayed_needs_both_prefix_and_results() {
        let mut tx = Transaction {
            data: b"relayedTx@aaaaaa".to_vec(),
            ..Default::default()
        };
        assert!(!is_relayed_tx(&tx));

        tx.smart_contract_results.push(ScResult::default());
        assert!(is_relayed_tx(&tx));
    }

    #[test]
    fn decimal_values_parse_or_default() {
        assert_eq!(string_value_to_u256("10000"), U256::from(10_000u64));
        assert_eq!(string_value_to_u256("aaaa"), U256::zero());
    }

    #[test]
    fn cross_shard_at_source() {
        let tx = Transaction {
            sender_shard: 2,
            receiver_shard: 1,
            ..Default::default()
        };
        assert!(is_cross_shard_on_source_shard(&tx, 2));
        assert!(!is_cross_shard_on_source_shard(&tx, 1));

        let intra = Transaction {
            sender_shard: 1,
            receiver_shard: 1,
            ..Default::default()
        };
        assert!(!is_cross_shard_on_source_shard(&intra, 1));
    }

    #[test]
    fn refund_to_sender_requires_matching_links() {
        let tx = Transaction {
            hash: "aabb".to_string(),
            sender: "the-sender".to_string(),
            nonce: 7,
            ..Default::default()
        };
        let scr = ScResult {
            receiver: "the-sender".to_string(),
            nonce: 8,
            prev_tx_hash: "aabb".to_string(),
            data: b"@6f6b".to_vec(),
            ..Default::default()
        };
        assert!(is_scr_for_sender_with_refund(&scr, &tx));

        let wrong_nonce = ScResult {
            nonce: 9,
            ..scr.clone()
        };
        assert!(!is_scr_for_sender_with_refund(&wrong_nonce, &tx));

        let wrong_link = ScResult {
            prev_tx_hash: "other".to_string(),
            ..scr
        };
        assert!(!is_scr_for_sender_with_refund(&wrong_link, &tx));
    }

    #[test]
    fn same_shard_nft_transfer_payload() {
        let tx = Transaction {
            data: b"MECTNFTTransfer@544b4e@01@01@aabb".to_vec(),
            sender_shard: 1,
            receiver_shard: 1,
            ..Default::default()
        };
        assert!(is_nft_transfer_or_multi_transfer(&tx));

        let cross = Transaction {
            receiver_shard: 2,
            ..tx.clone()
        };
        assert!(!is_nft_transfer_or_multi_transfer(&cross));

        let plain = Transaction {
            data: b"something else".to_vec(),
            sender_shard: 1,
            receiver_shard: 1,
            ..Default::default()
        };
        assert!(!is_nft_transfer_or_multi_transfer(&plain));
    }
}
