use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::models::datasets::tokens::{
    Delegator, ScDeployInfo, TagsCount, TokenInfo, TokenRolesAndProperties,
};
use crate::models::errors::SerializeError;
use crate::storage::BufferSlice;

use super::{delete_meta, index_meta, marshal, scripts, update_meta};

/// Issued tokens and supply changes. An ownership transfer is written as a
/// script so concurrent history entries are appended, not overwritten.
pub fn serialize_tokens(
    tokens: &[TokenInfo],
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for token in tokens {
        if token.transfer_ownership {
            serialize_ownership_transfer(token, buffer, index)?;
            continue;
        }

        let id = if token.identifier.is_empty() {
            &token.token
        } else {
            &token.identifier
        };
        buffer.put_data(&index_meta(index, id), &marshal(token, index)?)?;
    }

    Ok(())
}

fn serialize_ownership_transfer(
    token: &TokenInfo,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    let Some(owner_entry) = token.owners_history.first() else {
        return buffer.put_data(&index_meta(index, &token.token), &marshal(token, index)?);
    };

    let owner_value = serde_json::to_value(owner_entry).map_err(|source| {
        SerializeError::Marshal {
            index: index.to_string(),
            source,
        }
    })?;
    let token_value = serde_json::to_value(token).map_err(|source| SerializeError::Marshal {
        index: index.to_string(),
        source,
    })?;

    let body = json!({
        "scripted_upsert": true,
        "script": {
            "source": scripts::TOKEN_TRANSFER_OWNERSHIP,
            "lang": "painless",
            "params": {"elem": owner_value, "owner": token.current_owner},
        },
        "upsert": token_value,
    });
    buffer.put_data(&update_meta(index, &token.token), &body.to_string())
}

/// Deployment records, keyed by contract address.
pub fn serialize_sc_deploys(
    deploys: &HashMap<String, ScDeployInfo>,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for (address, info) in deploys {
        buffer.put_data(&index_meta(index, address), &marshal(info, index)?)?;
    }

    Ok(())
}

/// Delegator state. Tombstones become deletes; live entries are merged under
/// the timestamp guard. The document id hides the address pair behind a hash.
pub fn serialize_delegators(
    delegators: &HashMap<String, Delegator>,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for delegator in delegators.values() {
        let id = delegator_doc_id(&delegator.address, &delegator.contract);
        if delegator.should_delete {
            buffer.put_data(&delete_meta(index, &id), "")?;
            continue;
        }

        let delegator_value =
            serde_json::to_value(delegator).map_err(|source| SerializeError::Marshal {
                index: index.to_string(),
                source,
            })?;
        let body = json!({
            "scripted_upsert": true,
            "script": {
                "source": scripts::DELEGATOR_MERGE,
                "lang": "painless",
                "params": {"delegator": delegator_value},
            },
            "upsert": {},
        });
        buffer.put_data(&update_meta(index, &id), &body.to_string())?;
    }

    Ok(())
}

pub(crate) fn delegator_doc_id(address: &str, contract: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(contract.as_bytes());

    hex::encode(hasher.finalize())
}

/// Role grants/revocations as list merges, property upgrades as partial doc
/// merges, both keyed by token ticker.
pub fn serialize_roles_and_properties(
    roles_and_properties: &TokenRolesAndProperties,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for role in roles_and_properties.roles() {
        let mut role_list = serde_json::Map::new();
        role_list.insert(role.role.clone(), json!([role.address]));
        let upsert = if role.set {
            json!({"roles": role_list})
        } else {
            json!({})
        };

        let body = json!({
            "scripted_upsert": true,
            "script": {
                "source": scripts::TOKEN_ROLE_MERGE,
                "lang": "painless",
                "params": {"role": role.role, "address": role.address, "set": role.set},
            },
            "upsert": upsert,
        });
        buffer.put_data(&update_meta(index, &role.token), &body.to_string())?;
    }

    for (token, properties) in roles_and_properties.properties() {
        let body = json!({
            "doc": {"properties": properties},
            "doc_as_upsert": true,
        });
        buffer.put_data(&update_meta(index, token), &body.to_string())?;
    }

    Ok(())
}

/// Tag usage counters. The increment commutes, so replays and concurrent
/// shards cannot lose counts.
pub fn serialize_tags(
    tags: &TagsCount,
    buffer: &mut BufferSlice,
    index: &str,
) -> Result<(), SerializeError> {
    for (tag, count) in tags.iter() {
        let id = BASE64.encode(tag.as_bytes());
        let body = json!({
            "script": {
                "source": scripts::TAG_COUNT_INCREMENT,
                "lang": "painless",
                "params": {"count": count},
            },
            "upsert": {"count": count, "tag": tag},
        });
        buffer.put_data(&update_meta(index, &id), &body.to_string())?;
    }

    Ok(())
}
