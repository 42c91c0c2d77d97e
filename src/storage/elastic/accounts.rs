use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use crate::constants::{NON_FUNGIBLE_MECT, SEMI_FUNGIBLE_MECT};
use crate::converters::encode_nonce_to_hex;
use crate::models::datasets::accounts::{AccountBalanceHistory, AccountInfo};
use crate::models::datasets::tokens::NftDataUpdate;
use crate::models::errors::SerializeError;
use crate::storage::BufferSlice;

use super::{index_meta, marshal, scripts, update_meta};

/// Timestamp-guarded merge of plain account documents.
pub fn serialize_accounts(
    accounts: &HashMap<String, AccountInfo>,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for account in accounts.values() {
        let (meta, body) = prepare_serialized_account(account, false, index)?;
        buffer.put_data(&meta, &body)?;
    }

    Ok(())
}

/// Timestamp-guarded merge of token holding documents, followed by the
/// partial NFT patches collected from update events.
pub fn serialize_accounts_mect(
    accounts: &HashMap<String, AccountInfo>,
    nft_updates: &[NftDataUpdate],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for account in accounts.values() {
        let (meta, body) = prepare_serialized_account(account, true, index)?;
        buffer.put_data(&meta, &body)?;
    }

    serialize_nft_updates(nft_updates, buffer, index)
}

fn prepare_serialized_account(
    account: &AccountInfo,
    is_token_account: bool,
    index: &str,
) -> Result<(String, String), SerializeError> {
    let id = account_doc_id(account, is_token_account);
    let meta = update_meta(index, &id);

    // a drained token holding becomes a guarded delete instead of a merge
    let is_drained = account.balance == "0" || account.balance.is_empty();
    if is_token_account && is_drained {
        let body = json!({
            "scripted_upsert": true,
            "script": {
                "source": scripts::ACCOUNT_DELETE,
                "lang": "painless",
                "params": {"timestamp": account.timestamp},
            },
            "upsert": {},
        });
        return Ok((meta, body.to_string()));
    }

    let account_value =
        serde_json::to_value(account).map_err(|source| SerializeError::Marshal {
            index: index.to_string(),
            source,
        })?;
    let body = json!({
        "scripted_upsert": true,
        "script": {
            "source": scripts::ACCOUNT_MERGE,
            "lang": "painless",
            "params": {"account": account_value},
        },
        "upsert": {},
    });

    Ok((meta, body.to_string()))
}

fn account_doc_id(account: &AccountInfo, is_token_account: bool) -> String {
    if is_token_account {
        format!(
            "{}-{}-{}",
            account.address,
            account.token_name,
            encode_nonce_to_hex(account.token_nonce)
        )
    } else {
        account.address.clone()
    }
}

/// Plain indexing of the per-timestamp balance history.
pub fn serialize_accounts_history(
    history: &HashMap<String, AccountBalanceHistory>,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for entry in history.values() {
        let mut id = entry.address.clone();
        if !entry.token.is_empty() {
            id = format!(
                "{}-{}-{}",
                id,
                entry.token,
                encode_nonce_to_hex(entry.token_nonce)
            );
        }
        id = format!("{}-{}", id, entry.timestamp);

        buffer.put_data(&index_meta(index, &id), &marshal(entry, index)?)?;
    }

    Ok(())
}

/// Structural merge of NFT/SFT holdings into the per-address collections
/// document.
pub fn serialize_collections(
    accounts_mect: &HashMap<String, AccountInfo>,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for account in accounts_mect.values() {
        let is_collection_type = account.token_type == NON_FUNGIBLE_MECT
            || account.token_type == SEMI_FUNGIBLE_MECT;
        if !is_collection_type {
            // a drained instance of any type still has to be removed
            let is_removal = account.balance == "0" && account.token_nonce > 0;
            if !is_removal {
                continue;
            }
        }

        let nonce_hex = encode_nonce_to_hex(account.token_nonce);
        let mut instance = serde_json::Map::new();
        instance.insert(nonce_hex.clone(), json!(account.balance));
        let mut upsert = serde_json::Map::new();
        upsert.insert(account.token_name.clone(), serde_json::Value::Object(instance));

        let body = json!({
            "scripted_upsert": true,
            "script": {
                "source": scripts::COLLECTIONS_MERGE,
                "lang": "painless",
                "params": {
                    "col": account.token_name,
                    "nonce": nonce_hex,
                    "value": account.balance,
                },
            },
            "upsert": upsert,
        });
        buffer.put_data(&update_meta(index, &account.address), &body.to_string())?;
    }

    Ok(())
}

/// Partial patches for NFT documents: attribute replacement or URI append.
/// The document id carries the owner address, matching the holdings index.
fn serialize_nft_updates(
    updates: &[NftDataUpdate],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for update in updates {
        let id = format!("{}-{}", update.address, update.identifier);

        let body = if !update.new_attributes.is_empty() {
            json!({
                "scripted_upsert": true,
                "script": {
                    "source": scripts::NFT_UPDATE_ATTRIBUTES,
                    "lang": "painless",
                    "params": {"attributes": BASE64.encode(&update.new_attributes)},
                },
                "upsert": {},
            })
        } else {
            json!({
                "scripted_upsert": true,
                "script": {
                    "source": scripts::NFT_ADD_URIS,
                    "lang": "painless",
                    "params": {"uris": update.uris_to_add},
                },
                "upsert": {},
            })
        };
        buffer.put_data(&update_meta(index, &id), &body.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        ACCOUNTS_HISTORY_INDEX, ACCOUNTS_INDEX, ACCOUNTS_MECT_INDEX, COLLECTIONS_INDEX,
    };
    use crate::storage::DEFAULT_MAX_BULK_SIZE;

    fn buffer() -> BufferSlice {
        BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap()
    }

    fn token_account(balance: &str, token_type: &str) -> AccountInfo {
        AccountInfo {
            address: "616263".to_string(),
            token_name: "NFT-abcdef".to_string(),
            token_nonce: 10,
            balance: balance.to_string(),
            timestamp: 1234,
            token_type: token_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn account_merge_is_timestamp_guarded() {
        let mut accounts = HashMap::new();
        accounts.insert(
            "616263".to_string(),
            AccountInfo {
                address: "616263".to_string(),
                balance: "1000".to_string(),
                timestamp: 1234,
                ..Default::default()
            },
        );
        let mut buffer = buffer();

        serialize_accounts(&accounts, &mut buffer, ACCOUNTS_INDEX).unwrap();

        let out = &buffer.buffers()[0];
        assert!(out.contains(r#""update":{"_id":"616263","_index":"accounts"}"#));
        assert!(out.contains("ctx._source.timestamp <= params.account.timestamp"));
        assert!(out.contains(r#""balance":"1000""#));
    }

    #[test]
    fn drained_token_holding_becomes_a_guarded_delete() {
        let mut accounts = HashMap::new();
        accounts.insert(
            "616263-NFT-abcdef-10".to_string(),
            token_account("0", ""),
        );
        let mut buffer = buffer();

        serialize_accounts_mect(&accounts, &[], &mut buffer, ACCOUNTS_MECT_INDEX).unwrap();

        let out = &buffer.buffers()[0];
        assert!(out.contains(r#""_id":"616263-NFT-abcdef-0a""#));
        assert!(out.contains("ctx.op = 'delete'"));
        assert!(out.contains(r#""params":{"timestamp":1234}"#));
    }

    #[test]
    fn attribute_patch_never_creates_the_document() {
        let updates = vec![NftDataUpdate {
            identifier: "NFT-abcdef-0a".to_string(),
            address: "616263".to_string(),
            new_attributes: b"tags:new".to_vec(),
            uris_to_add: Vec::new(),
        }];
        let mut buffer = buffer();

        serialize_accounts_mect(&HashMap::new(), &updates, &mut buffer, ACCOUNTS_MECT_INDEX)
            .unwrap();

        let out = &buffer.buffers()[0];
        assert!(out.contains(r#""_id":"616263-NFT-abcdef-0a""#));
        assert!(out.contains("ctx.op = 'noop'"));
        assert!(out.contains(&BASE64.encode(b"tags:new")));
    }

    #[test]
    fn collections_merge_adds_and_removes_instances() {
        let mut accounts = HashMap::new();
        accounts.insert("key1".to_string(), token_account("1", NON_FUNGIBLE_MECT));
        let mut buffer = buffer();

        serialize_collections(&accounts, &mut buffer, COLLECTIONS_INDEX).unwrap();
        let out = &buffer.buffers()[0];
        assert!(out.contains(r#""upsert":{"NFT-abcdef":{"0a":"1"}}"#));

        // fungible holdings never reach the collections index
        let mut fungible = HashMap::new();
        let mut acc = token_account("100", "");
        acc.token_nonce = 0;
        fungible.insert("key2".to_string(), acc);
        let mut untouched = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
        serialize_collections(&fungible, &mut untouched, COLLECTIONS_INDEX).unwrap();
        assert!(untouched.is_empty());

        // a drained instance of an untyped holding is still a removal
        let mut drained = HashMap::new();
        drained.insert("key3".to_string(), token_account("0", ""));
        let mut removal = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
        serialize_collections(&drained, &mut removal, COLLECTIONS_INDEX).unwrap();
        assert!(removal.buffers()[0].contains(scripts::COLLECTIONS_MERGE));
    }

    #[test]
    fn history_ids_carry_token_and_timestamp() {
        let mut history = HashMap::new();
        history.insert(
            "key".to_string(),
            AccountBalanceHistory {
                address: "616263".to_string(),
                token: "NFT-abcdef".to_string(),
                token_nonce: 10,
                timestamp: 1234,
                balance: "5".to_string(),
                ..Default::default()
            },
        );
        let mut buffer = buffer();

        serialize_accounts_history(&history, &mut buffer, ACCOUNTS_HISTORY_INDEX).unwrap();

        assert!(buffer.buffers()[0].contains(r#""_id":"616263-NFT-abcdef-0a-1234""#));
    }
}
