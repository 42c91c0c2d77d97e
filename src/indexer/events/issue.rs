use std::collections::HashSet;
use std::sync::Arc;

use crate::converters::nonce_from_bytes;
use crate::interface::AddressCodec;
use crate::models::datasets::tokens::{OwnerData, TokenInfo};

use super::{EventOutcome, ProcessEventArgs};

const NUM_ISSUE_LOG_TOPICS: usize = 4;

const ISSUE_FUNGIBLE_FUNC: &str = "issue";
const ISSUE_SEMI_FUNGIBLE_FUNC: &str = "issueSemiFungible";
const ISSUE_NON_FUNGIBLE_FUNC: &str = "issueNonFungible";
const REGISTER_META_MECT_FUNC: &str = "registerMetaMECT";
const CHANGE_SFT_TO_META_MECT_FUNC: &str = "changeSFTToMetaMECT";
const TRANSFER_OWNERSHIP_FUNC: &str = "transferOwnership";
const REGISTER_AND_SET_ROLES_FUNC: &str = "registerAndSetAllRoles";

/// Interprets token issuance and ownership-transfer events emitted by the
/// system token contract. Metachain only.
///
/// Topic layout: token, name, ticker, type, then optionally the number of
/// decimals or, for ownership transfers, the new owner address.
pub(crate) struct IssueProcessor {
    codec: Arc<dyn AddressCodec>,
    identifiers: HashSet<&'static str>,
}

impl IssueProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            codec,
            identifiers: HashSet::from([
                ISSUE_FUNGIBLE_FUNC,
                ISSUE_SEMI_FUNGIBLE_FUNC,
                ISSUE_NON_FUNGIBLE_FUNC,
                REGISTER_META_MECT_FUNC,
                CHANGE_SFT_TO_META_MECT_FUNC,
                TRANSFER_OWNERSHIP_FUNC,
                REGISTER_AND_SET_ROLES_FUNC,
            ]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str();
        if !self.identifiers.contains(event_identifier) {
            return EventOutcome::not_recognized();
        }

        let topics = &args.event.topics;
        if topics.len() < NUM_ISSUE_LOG_TOPICS || topics[0].is_empty() {
            return EventOutcome::processed_no_op();
        }

        let mut num_decimals = 0;
        if topics.len() == NUM_ISSUE_LOG_TOPICS + 1 && event_identifier != TRANSFER_OWNERSHIP_FUNC {
            num_decimals = nonce_from_bytes(&topics[4]);
        }

        let encoded_addr = self.codec.encode(&args.event.address);
        let mut token_info = TokenInfo {
            token: String::from_utf8_lossy(&topics[0]).into_owned(),
            name: String::from_utf8_lossy(&topics[1]).into_owned(),
            ticker: String::from_utf8_lossy(&topics[2]).into_owned(),
            token_type: String::from_utf8_lossy(&topics[3]).into_owned(),
            num_decimals,
            issuer: encoded_addr.clone(),
            current_owner: encoded_addr.clone(),
            timestamp: args.timestamp,
            owners_history: vec![OwnerData {
                address: encoded_addr,
                timestamp: args.timestamp,
            }],
            ..Default::default()
        };

        if event_identifier == TRANSFER_OWNERSHIP_FUNC && topics.len() > NUM_ISSUE_LOG_TOPICS {
            let new_owner = self.codec.encode(&topics[4]);
            token_info.transfer_ownership = true;
            token_info.current_owner = new_owner.clone();
            token_info.owners_history[0].address = new_owner;
        }

        EventOutcome {
            token_info: Some(Box::new(token_info)),
            processed: true,
            ..Default::default()
        }
    }
}
