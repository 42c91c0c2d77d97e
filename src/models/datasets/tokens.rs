use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::accounts::TokenMetaData;
use super::is_zero_u64;

/// One owner of a token, with the timestamp the ownership started.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct OwnerData {
    pub address: String,
    pub timestamp: u64,
}

/// Issuance, creation or supply-change record for a token. The same shape is
/// written to different destinations depending on how it was produced.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub ticker: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub token: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub identifier: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty", default)]
    pub token_type: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub num_decimals: u64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub issuer: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub current_owner: String,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub timestamp: u64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<TokenMetaData>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub owners_history: Vec<OwnerData>,
    #[serde(skip)]
    pub transfer_ownership: bool,
}

/// Append-only set of token records produced while processing one block,
/// deduplicated by identifier.
#[derive(Debug, Default)]
pub struct TokensCollection {
    tokens: Vec<TokenInfo>,
}

impl TokensCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: TokenInfo) {
        let duplicate = self
            .tokens
            .iter()
            .any(|existing| existing.token == token.token && existing.identifier == token.identifier);
        if !duplicate {
            self.tokens.push(token);
        }
    }

    pub fn get_all(&self) -> &[TokenInfo] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A single role grant or revocation for an address on a token.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleData {
    pub token: String,
    pub address: String,
    pub role: String,
    pub set: bool,
}

/// Per-block accumulation of role changes and boolean property upgrades,
/// flushed as merge operations at serialization time.
#[derive(Debug, Default)]
pub struct TokenRolesAndProperties {
    roles: Vec<RoleData>,
    properties: Vec<(String, BTreeMap<String, bool>)>,
}

impl TokenRolesAndProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&mut self, token: String, address: String, role: String, set: bool) {
        self.roles.push(RoleData {
            token,
            address,
            role,
            set,
        });
    }

    pub fn add_properties(&mut self, token: String, properties: BTreeMap<String, bool>) {
        self.properties.push((token, properties));
    }

    pub fn roles(&self) -> &[RoleData] {
        &self.roles
    }

    pub fn properties(&self) -> &[(String, BTreeMap<String, bool>)] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.properties.is_empty()
    }
}

/// Stake state of one delegator on one staking contract.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Delegator {
    pub address: String,
    pub contract: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub active_stake: String,
    pub active_stake_num: f64,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub timestamp: u64,
    #[serde(skip)]
    pub should_delete: bool,
}

/// Deployment record keyed by contract address.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScDeployInfo {
    #[serde(rename = "deployTxHash")]
    pub tx_hash: String,
    #[serde(rename = "deployer")]
    pub creator: String,
    pub timestamp: u64,
}

/// Partial patch for an NFT document. Only the present fields are touched;
/// this is never a full replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NftDataUpdate {
    pub identifier: String,
    pub address: String,
    pub new_attributes: Vec<u8>,
    pub uris_to_add: Vec<String>,
}

/// Usage counters for the tags attached to NFTs created in this block.
#[derive(Debug, Default)]
pub struct TagsCount {
    counts: HashMap<String, u64>,
}

impl TagsCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_tags(&mut self, tags: &[String]) {
        for tag in tags {
            if tag.is_empty() {
                continue;
            }
            *self.counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(tag, count)| (tag.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
