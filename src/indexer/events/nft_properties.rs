use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{MECT_NFT_ADD_URI, MECT_NFT_UPDATE_ATTRIBUTES};
use crate::converters::{compute_token_identifier, nonce_from_bytes};
use crate::interface::AddressCodec;
use crate::models::datasets::tokens::NftDataUpdate;

use super::{EventOutcome, ProcessEventArgs};

const MIN_TOPICS_UPDATE: usize = 4;

/// Interprets in-place mutations of an existing NFT: attribute rewrites and
/// URI additions. Produces a partial document patch, never a replacement.
///
/// Topic layout: token, nonce, value, then the modified data.
pub(crate) struct NftPropertiesProcessor {
    codec: Arc<dyn AddressCodec>,
    identifiers: HashSet<&'static str>,
}

impl NftPropertiesProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            codec,
            identifiers: HashSet::from([MECT_NFT_ADD_URI, MECT_NFT_UPDATE_ATTRIBUTES]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str();
        if !self.identifiers.contains(event_identifier) {
            return EventOutcome::not_recognized();
        }

        let topics = &args.event.topics;
        if topics.len() < MIN_TOPICS_UPDATE {
            return EventOutcome::processed_no_op();
        }

        let caller = self.codec.encode(&args.event.address);
        if caller.is_empty() {
            return EventOutcome::processed_no_op();
        }

        let nonce = nonce_from_bytes(&topics[1]);
        if nonce == 0 {
            // fungible tokens have no mutable instance data
            return EventOutcome::not_recognized();
        }

        let token = String::from_utf8_lossy(&topics[0]).into_owned();
        let identifier = compute_token_identifier(&token, nonce);

        let mut update = NftDataUpdate {
            identifier: identifier.clone(),
            address: caller,
            ..Default::default()
        };
        match event_identifier {
            MECT_NFT_UPDATE_ATTRIBUTES => update.new_attributes = topics[3].clone(),
            _ => {
                update.uris_to_add = topics[3..]
                    .iter()
                    .map(|uri| String::from_utf8_lossy(uri).into_owned())
                    .collect();
            }
        }

        EventOutcome {
            identifier,
            nft_update: Some(update),
            processed: true,
            ..Default::default()
        }
    }
}
