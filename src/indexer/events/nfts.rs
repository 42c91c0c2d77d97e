use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::constants::{
    MECT_NFT_ADD_QUANTITY, MECT_NFT_BURN, MECT_NFT_CREATE, MECT_NFT_TRANSFER, MECT_WIPE,
    MULTI_MECT_NFT_TRANSFER,
};
use crate::converters::metadata::{TokenMetadataPayload, prepare_token_metadata};
use crate::converters::{big_uint_from_bytes, compute_token_identifier, nonce_from_bytes};
use crate::interface::{AddressCodec, ShardRouter};
use crate::models::common::Event;
use crate::models::datasets::accounts::AlteredAccountMark;
use crate::models::datasets::tokens::{TokenInfo, TokensCollection};

use super::{EventOutcome, NUM_TOPICS_WITH_RECEIVER_ADDRESS, ProcessEventArgs};

/// Interprets non-fungible and semi-fungible token operations. The topic-1
/// nonce must be non-zero; zero-nonce events are fungible and fall through.
///
/// Topic layout: token, nonce, value, then either the receiver address (for
/// transfers and wipes) or the embedded creation payload (for creates).
pub(crate) struct NftsProcessor {
    router: Arc<dyn ShardRouter>,
    codec: Arc<dyn AddressCodec>,
    identifiers: HashSet<&'static str>,
}

impl NftsProcessor {
    pub fn new(router: Arc<dyn ShardRouter>, codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            router,
            codec,
            identifiers: HashSet::from([
                MECT_NFT_TRANSFER,
                MECT_NFT_BURN,
                MECT_NFT_ADD_QUANTITY,
                MECT_NFT_CREATE,
                MULTI_MECT_NFT_TRANSFER,
                MECT_WIPE,
            ]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str().to_string();
        if !self.identifiers.contains(event_identifier.as_str()) {
            return EventOutcome::not_recognized();
        }

        let nonce = nonce_from_bytes(args.event.topic(1));
        if nonce == 0 {
            // no instance nonce, the fungible processor's territory
            return EventOutcome::not_recognized();
        }

        let sender_shard = self.router.compute_shard(&args.event.address);
        if sender_shard == self.router.self_shard() {
            self.process_event_on_sender(args);
        }

        let token = String::from_utf8_lossy(args.event.topic(0)).into_owned();
        let identifier = compute_token_identifier(&token, nonce);
        let value = big_uint_from_bytes(args.event.topic(2)).to_string();

        if !should_add_receiver_data(args.event, &event_identifier) {
            return EventOutcome {
                identifier,
                value,
                processed: true,
                ..Default::default()
            };
        }

        let receiver = args.event.topic(3);
        let encoded_receiver = self.codec.encode(receiver);
        let receiver_shard = self.router.compute_shard(receiver);
        if receiver_shard != self.router.self_shard() {
            return EventOutcome {
                identifier,
                value,
                receiver: encoded_receiver,
                receiver_shard,
                processed: true,
                ..Default::default()
            };
        }

        if event_identifier == MECT_WIPE {
            add_supply_record(args.tokens_supply, &token, &identifier, nonce, args.timestamp);
        }

        args.accounts.add(
            encoded_receiver.clone(),
            AlteredAccountMark {
                token_identifier: token,
                nft_nonce: nonce,
                is_nft_operation: true,
                ..Default::default()
            },
        );

        EventOutcome {
            identifier,
            value,
            receiver: encoded_receiver,
            receiver_shard,
            processed: true,
            ..Default::default()
        }
    }

    fn process_event_on_sender(&self, args: &mut ProcessEventArgs<'_>) {
        let event = args.event;
        let token = String::from_utf8_lossy(event.topic(0)).into_owned();
        let nonce = nonce_from_bytes(event.topic(1));
        let encoded_sender = self.codec.encode(&event.address);

        let event_identifier = event.identifier_str();
        if event_identifier == MECT_NFT_BURN || event_identifier == MECT_WIPE {
            let identifier = compute_token_identifier(&token, nonce);
            add_supply_record(args.tokens_supply, &token, &identifier, nonce, args.timestamp);
        }

        let is_nft_create = event_identifier == MECT_NFT_CREATE;
        args.accounts.add(
            encoded_sender,
            AlteredAccountMark {
                token_identifier: token.clone(),
                nft_nonce: nonce,
                is_nft_operation: true,
                is_nft_create,
                ..Default::default()
            },
        );

        if !is_nft_create || event.topics.len() < NUM_TOPICS_WITH_RECEIVER_ADDRESS {
            return;
        }

        let payload: TokenMetadataPayload = match serde_json::from_slice(event.topic(3)) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, token, "cannot decode token creation payload");
                return;
            }
        };

        let metadata = prepare_token_metadata(self.codec.as_ref(), &payload);
        args.tokens.add(TokenInfo {
            token: token.clone(),
            identifier: compute_token_identifier(&token, nonce),
            timestamp: args.timestamp,
            data: Some(metadata),
            nonce,
            ..Default::default()
        });
    }
}

fn should_add_receiver_data(event: &Event, event_identifier: &str) -> bool {
    let carries_receiver = event_identifier == MECT_NFT_TRANSFER
        || event_identifier == MULTI_MECT_NFT_TRANSFER
        || event_identifier == MECT_WIPE;

    carries_receiver && event.topics.len() >= NUM_TOPICS_WITH_RECEIVER_ADDRESS
}

fn add_supply_record(
    supply: &mut TokensCollection,
    token: &str,
    identifier: &str,
    nonce: u64,
    timestamp: u64,
) {
    supply.add(TokenInfo {
        token: token.to_string(),
        identifier: identifier.to_string(),
        timestamp,
        nonce,
        ..Default::default()
    });
}
