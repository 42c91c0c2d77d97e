use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{is_false, is_zero_u64};

/// Document describing an account (or one token held by an account) at a
/// given block timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub address: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub nonce: u64,
    pub balance: String,
    pub balance_num: f64,
    #[serde(rename = "token", skip_serializing_if = "String::is_empty", default)]
    pub token_name: String,
    #[serde(
        rename = "identifier",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub token_identifier: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub token_nonce: u64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub properties: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<TokenMetaData>,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub timestamp: u64,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub token_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub current_owner: String,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    #[serde(skip)]
    pub is_sender: bool,
    #[serde(skip)]
    pub is_smart_contract: bool,
    #[serde(skip)]
    pub is_nft_create: bool,
}

/// Token metadata projected into a database friendly shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetaData {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub creator: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub royalties: u64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub hash: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub attributes: String,
    #[serde(rename = "metadata", skip_serializing_if = "String::is_empty", default)]
    pub meta_data: String,
    #[serde(rename = "nonEmptyURIs")]
    pub non_empty_uris: bool,
    pub white_listed_storage: bool,
}

/// An entry in the per-timestamp account balance history.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceHistory {
    pub address: String,
    pub timestamp: u64,
    pub balance: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub token: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub identifier: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub token_nonce: u64,
    #[serde(skip_serializing_if = "is_false", default)]
    pub is_sender: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub is_smart_contract: bool,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
}

/// One reason an address was touched during block execution. An address can
/// accumulate several marks in the same block, one per token touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlteredAccountMark {
    pub token_identifier: String,
    pub nft_nonce: u64,
    pub is_mect_operation: bool,
    pub is_nft_operation: bool,
    pub is_nft_create: bool,
    pub is_sender: bool,
    pub balance_change: bool,
}

/// Ordered multi-map of encoded address to the marks collected for it.
/// Insertion order is preserved per key.
#[derive(Debug, Default)]
pub struct AlteredAccounts {
    marks: HashMap<String, Vec<AlteredAccountMark>>,
    insertion_order: Vec<String>,
}

impl AlteredAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mark for the address. A mark for a token already seen for
    /// this address only widens the existing flags instead of duplicating the
    /// entry.
    pub fn add(&mut self, address: String, mark: AlteredAccountMark) {
        let entries = match self.marks.get_mut(&address) {
            Some(entries) => entries,
            None => {
                self.insertion_order.push(address.clone());
                self.marks.entry(address).or_default()
            }
        };

        let same_token = entries.iter_mut().find(|existing| {
            (existing.is_mect_operation || existing.is_nft_operation)
                && (mark.is_mect_operation || mark.is_nft_operation)
                && existing.token_identifier == mark.token_identifier
                && existing.nft_nonce == mark.nft_nonce
        });
        match same_token {
            Some(existing) => {
                existing.is_sender |= mark.is_sender;
                existing.is_nft_create |= mark.is_nft_create;
                existing.is_nft_operation |= mark.is_nft_operation;
                existing.is_mect_operation |= mark.is_mect_operation;
                existing.balance_change |= mark.balance_change;
            }
            None => entries.push(mark),
        }
    }

    pub fn get(&self, address: &str) -> &[AlteredAccountMark] {
        self.marks.get(address).map(Vec::as_slice).unwrap_or_default()
    }

    /// All addresses in first-touched order, each with its marks.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AlteredAccountMark])> {
        self.insertion_order
            .iter()
            .map(|addr| (addr.as_str(), self.marks[addr].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_for_same_token_are_merged() {
        let mut accounts = AlteredAccounts::new();
        accounts.add(
            "addr1".to_string(),
            AlteredAccountMark {
                token_identifier: "TKN-abcdef".to_string(),
                is_mect_operation: true,
                is_sender: true,
                ..Default::default()
            },
        );
        accounts.add(
            "addr1".to_string(),
            AlteredAccountMark {
                token_identifier: "TKN-abcdef".to_string(),
                is_mect_operation: true,
                ..Default::default()
            },
        );
        accounts.add(
            "addr1".to_string(),
            AlteredAccountMark {
                token_identifier: "OTHER-123456".to_string(),
                is_mect_operation: true,
                ..Default::default()
            },
        );

        let marks = accounts.get("addr1");
        assert_eq!(marks.len(), 2);
        assert!(marks[0].is_sender);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut accounts = AlteredAccounts::new();
        for addr in ["c", "a", "b"] {
            accounts.add(addr.to_string(), AlteredAccountMark::default());
        }

        let order: Vec<&str> = accounts.iter().map(|(addr, _)| addr).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
