//! Resolution of altered accounts against the account trie.
//!
//! The event and transaction processors only record which addresses were
//! touched and why. This module loads the current state of each touched
//! address (and of each touched token holding) and shapes it into account
//! documents and balance history entries.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::constants::FUNGIBLE_MECT;
use crate::converters::balance::BalanceConverter;
use crate::converters::compute_token_identifier;
use crate::indexer::transactions::is_smart_contract_address;
use crate::interface::{AccountLoader, AccountSnapshot, AddressCodec, TokenSnapshot};
use crate::models::datasets::accounts::{AccountBalanceHistory, AccountInfo, AlteredAccounts};
use crate::models::datasets::tokens::{TokenInfo, TokensCollection};

/// A plain account to index, with the flags carried over from its marks.
#[derive(Debug, Clone)]
pub struct RegularAccount {
    pub address: String,
    pub address_bytes: Vec<u8>,
    pub snapshot: AccountSnapshot,
    pub is_sender: bool,
}

/// A token holding to index for one account.
#[derive(Debug, Clone)]
pub struct TokenAccount {
    pub address: String,
    pub address_bytes: Vec<u8>,
    pub token: String,
    pub nonce: u64,
    pub is_sender: bool,
    pub is_nft_operation: bool,
    pub is_nft_create: bool,
}

pub struct AccountsProcessor {
    codec: Arc<dyn AddressCodec>,
    loader: Arc<dyn AccountLoader>,
    balance_converter: BalanceConverter,
    self_shard: u32,
}

impl AccountsProcessor {
    pub fn new(
        codec: Arc<dyn AddressCodec>,
        loader: Arc<dyn AccountLoader>,
        balance_converter: BalanceConverter,
        self_shard: u32,
    ) -> Self {
        Self {
            codec,
            loader,
            balance_converter,
            self_shard,
        }
    }

    /// Splits the altered addresses into plain accounts and token holdings,
    /// loading the current trie state of each. Addresses that cannot be
    /// resolved are skipped.
    pub fn get_accounts(
        &self,
        altered: &AlteredAccounts,
    ) -> (Vec<RegularAccount>, Vec<TokenAccount>) {
        let mut regular = Vec::new();
        let mut tokens = Vec::new();

        for (address, marks) in altered.iter() {
            let Ok(address_bytes) = self.codec.decode(address) else {
                warn!(address, "cannot decode altered address");
                continue;
            };
            let snapshot = match self.loader.load_account(&address_bytes) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(address, error = %err, "cannot load account");
                    continue;
                }
            };

            for mark in marks {
                if mark.is_mect_operation || mark.is_nft_operation {
                    tokens.push(TokenAccount {
                        address: address.to_string(),
                        address_bytes: address_bytes.clone(),
                        token: mark.token_identifier.clone(),
                        nonce: mark.nft_nonce,
                        is_sender: mark.is_sender,
                        is_nft_operation: mark.is_nft_operation,
                        is_nft_create: mark.is_nft_create,
                    });
                }

                // a receiver holding a zero balance is most probably a new
                // account and is indexed even without a balance change
                let ignore_receiver =
                    !mark.balance_change && !snapshot.balance.is_zero() && !mark.is_sender;
                if ignore_receiver {
                    continue;
                }

                regular.push(RegularAccount {
                    address: address.to_string(),
                    address_bytes: address_bytes.clone(),
                    snapshot: snapshot.clone(),
                    is_sender: mark.is_sender,
                });
            }
        }

        (regular, tokens)
    }

    /// Account documents keyed by address.
    pub fn prepare_regular_accounts_map(
        &self,
        timestamp: u64,
        accounts: &[RegularAccount],
    ) -> HashMap<String, AccountInfo> {
        let mut map = HashMap::with_capacity(accounts.len());
        for account in accounts {
            let info = AccountInfo {
                address: account.address.clone(),
                nonce: account.snapshot.nonce,
                balance: account.snapshot.balance.to_string(),
                balance_num: self
                    .balance_converter
                    .compute_balance_as_float(account.snapshot.balance),
                is_sender: account.is_sender,
                is_smart_contract: is_smart_contract_address(&account.address_bytes),
                timestamp,
                shard_id: self.self_shard,
                ..Default::default()
            };
            map.insert(account.address.clone(), info);
        }

        map
    }

    /// Token holding documents keyed by `<address>-<token>-<nonce>`, together
    /// with the set of token identifiers that still have a balance.
    pub fn prepare_token_accounts_map(
        &self,
        timestamp: u64,
        accounts: &[TokenAccount],
    ) -> (HashMap<String, AccountInfo>, TokensCollection) {
        let mut map = HashMap::with_capacity(accounts.len());
        let mut tokens_data = TokensCollection::new();
        for account in accounts {
            let snapshot = match self.get_token_snapshot(account) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(address = %account.address, error = %err, "cannot get token state");
                    continue;
                }
            };

            let token_identifier = compute_token_identifier(&account.token, account.nonce);
            let mut info = AccountInfo {
                address: account.address.clone(),
                token_name: account.token.clone(),
                token_identifier: token_identifier.clone(),
                token_nonce: account.nonce,
                balance: snapshot.balance.to_string(),
                balance_num: self
                    .balance_converter
                    .compute_mect_balance_as_float(snapshot.balance),
                properties: snapshot.properties.clone(),
                is_sender: account.is_sender,
                is_smart_contract: is_smart_contract_address(&account.address_bytes),
                data: snapshot.metadata.clone(),
                timestamp,
                shard_id: self.self_shard,
                ..Default::default()
            };
            if info.token_nonce == 0 {
                info.token_type = FUNGIBLE_MECT.to_string();
            }

            let key = format!("{}-{}-{}", account.address, account.token, account.nonce);
            let has_balance = info.balance != "0" && !info.balance.is_empty();
            map.insert(key, info);

            if has_balance {
                tokens_data.add(TokenInfo {
                    token: account.token.clone(),
                    identifier: token_identifier,
                    ..Default::default()
                });
            }
        }

        (map, tokens_data)
    }

    fn get_token_snapshot(&self, account: &TokenAccount) -> anyhow::Result<TokenSnapshot> {
        // wipe events on fungible tokens leave no instance behind to load
        if account.token.is_empty() || (account.is_nft_operation && account.nonce == 0) {
            return Ok(TokenSnapshot::default());
        }

        self.loader
            .load_token(&account.address_bytes, &account.token, account.nonce)
    }

    /// One balance history entry per prepared account document.
    pub fn prepare_accounts_history(
        &self,
        timestamp: u64,
        accounts: &HashMap<String, AccountInfo>,
    ) -> HashMap<String, AccountBalanceHistory> {
        let mut map = HashMap::with_capacity(accounts.len());
        for info in accounts.values() {
            let entry = AccountBalanceHistory {
                address: info.address.clone(),
                balance: info.balance.clone(),
                timestamp,
                token: info.token_name.clone(),
                token_nonce: info.token_nonce,
                identifier: compute_token_identifier(&info.token_name, info.token_nonce),
                is_sender: info.is_sender,
                is_smart_contract: info.is_smart_contract,
                shard_id: info.shard_id,
            };
            let key = format!("{}-{}-{}", entry.address, entry.token, entry.token_nonce);
            map.insert(key, entry);
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use primitive_types::U256;

    use super::*;
    use crate::interface::AccountSnapshot;
    use crate::mocks::{FixedAccountLoader, HexCodec};
    use crate::models::datasets::accounts::AlteredAccountMark;

    fn processor(loader: FixedAccountLoader) -> AccountsProcessor {
        AccountsProcessor::new(
            Arc::new(HexCodec),
            Arc::new(loader),
            BalanceConverter::new(10).unwrap(),
            2,
        )
    }

    fn altered_with(address: &[u8], mark: AlteredAccountMark) -> AlteredAccounts {
        let mut altered = AlteredAccounts::new();
        altered.add(hex::encode(address), mark);
        altered
    }

    #[test]
    fn zero_balance_receiver_is_still_indexed() {
        let proc = processor(FixedAccountLoader::default());
        let altered = altered_with(b"receiver1", AlteredAccountMark::default());

        let (regular, tokens) = proc.get_accounts(&altered);

        assert_eq!(regular.len(), 1);
        assert!(tokens.is_empty());
    }

    #[test]
    fn funded_receiver_without_balance_change_is_skipped() {
        let loader = FixedAccountLoader {
            account: AccountSnapshot {
                nonce: 1,
                balance: U256::from(1_000u64),
            },
            ..Default::default()
        };
        let proc = processor(loader);
        let altered = altered_with(
            b"receiver1",
            AlteredAccountMark {
                is_mect_operation: true,
                token_identifier: "TKN-abcdef".to_string(),
                ..Default::default()
            },
        );

        let (regular, tokens) = proc.get_accounts(&altered);

        assert!(regular.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "TKN-abcdef");
    }

    #[test]
    fn undecodable_address_is_dropped() {
        let proc = processor(FixedAccountLoader::default());
        let mut altered = AlteredAccounts::new();
        altered.add("not hex".to_string(), AlteredAccountMark::default());

        let (regular, tokens) = proc.get_accounts(&altered);

        assert!(regular.is_empty());
        assert!(tokens.is_empty());
    }

    #[test]
    fn regular_accounts_map_carries_state_and_shard() {
        let loader = FixedAccountLoader {
            account: AccountSnapshot {
                nonce: 7,
                balance: U256::from(1_000_000_000u64),
            },
            ..Default::default()
        };
        let proc = processor(loader);
        let accounts = vec![RegularAccount {
            address: "616263".to_string(),
            address_bytes: b"abc".to_vec(),
            snapshot: AccountSnapshot {
                nonce: 7,
                balance: U256::from(1_000_000_000u64),
            },
            is_sender: true,
        }];

        let map = proc.prepare_regular_accounts_map(1234, &accounts);

        let info = &map["616263"];
        assert_eq!(info.nonce, 7);
        assert_eq!(info.balance, "1000000000");
        assert_eq!(info.balance_num, 0.1);
        assert!(info.is_sender);
        assert_eq!(info.timestamp, 1234);
        assert_eq!(info.shard_id, 2);
    }

    #[test]
    fn token_accounts_map_keys_by_address_token_and_nonce() {
        let loader = FixedAccountLoader {
            token: crate::interface::TokenSnapshot {
                balance: U256::from(5u64),
                properties: "6f6b".to_string(),
                metadata: None,
            },
            ..Default::default()
        };
        let proc = processor(loader);
        let accounts = vec![TokenAccount {
            address: "616263".to_string(),
            address_bytes: b"abc".to_vec(),
            token: "NFT-abcdef".to_string(),
            nonce: 10,
            is_sender: false,
            is_nft_operation: true,
            is_nft_create: false,
        }];

        let (map, tokens_data) = proc.prepare_token_accounts_map(1234, &accounts);

        let info = &map["616263-NFT-abcdef-10"];
        assert_eq!(info.token_identifier, "NFT-abcdef-0a");
        assert_eq!(info.balance, "5");
        assert!(info.token_type.is_empty());
        assert_eq!(tokens_data.get_all().len(), 1);
        assert_eq!(tokens_data.get_all()[0].identifier, "NFT-abcdef-0a");
    }

    #[test]
    fn fungible_holding_gets_the_fungible_type_and_no_identifier() {
        let loader = FixedAccountLoader {
            token: crate::interface::TokenSnapshot {
                balance: U256::from(100u64),
                ..Default::default()
            },
            ..Default::default()
        };
        let proc = processor(loader);
        let accounts = vec![TokenAccount {
            address: "616263".to_string(),
            address_bytes: b"abc".to_vec(),
            token: "TKN-abcdef".to_string(),
            nonce: 0,
            is_sender: true,
            is_nft_operation: false,
            is_nft_create: false,
        }];

        let (map, _) = proc.prepare_token_accounts_map(1234, &accounts);

        let info = &map["616263-TKN-abcdef-0"];
        assert_eq!(info.token_type, FUNGIBLE_MECT);
        assert!(info.token_identifier.is_empty());
    }

    #[test]
    fn wiped_nft_holding_is_reported_with_a_zero_balance() {
        let proc = processor(FixedAccountLoader::default());
        let accounts = vec![TokenAccount {
            address: "616263".to_string(),
            address_bytes: b"abc".to_vec(),
            token: "NFT-abcdef".to_string(),
            nonce: 0,
            is_sender: false,
            is_nft_operation: true,
            is_nft_create: false,
        }];

        let (map, tokens_data) = proc.prepare_token_accounts_map(1234, &accounts);

        assert_eq!(map["616263-NFT-abcdef-0"].balance, "0");
        assert!(tokens_data.is_empty());
    }

    #[test]
    fn history_entries_mirror_the_account_documents() {
        let proc = processor(FixedAccountLoader::default());
        let mut accounts = HashMap::new();
        accounts.insert(
            "616263-NFT-abcdef-10".to_string(),
            AccountInfo {
                address: "616263".to_string(),
                balance: "5".to_string(),
                token_name: "NFT-abcdef".to_string(),
                token_nonce: 10,
                is_sender: true,
                shard_id: 2,
                ..Default::default()
            },
        );

        let history = proc.prepare_accounts_history(1234, &accounts);

        let entry = &history["616263-NFT-abcdef-10"];
        assert_eq!(entry.identifier, "NFT-abcdef-0a");
        assert_eq!(entry.timestamp, 1234);
        assert!(entry.is_sender);
        assert_eq!(entry.shard_id, 2);
    }
}
