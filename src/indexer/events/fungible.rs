use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{
    MECT_BURN, MECT_LOCAL_BURN, MECT_LOCAL_MINT, MECT_TRANSFER, MECT_WIPE,
    MULTI_MECT_NFT_TRANSFER,
};
use crate::converters::{big_uint_from_bytes, nonce_from_bytes};
use crate::interface::{AddressCodec, ShardRouter};
use crate::models::common::Event;
use crate::models::datasets::accounts::{AlteredAccountMark, AlteredAccounts};

use super::{EventOutcome, NUM_TOPICS_WITH_RECEIVER_ADDRESS, ProcessEventArgs};

/// Interprets fungible token movements. Events whose topic-1 nonce is
/// non-zero belong to the non-fungible processor and are left untouched.
pub(crate) struct FungibleTokensProcessor {
    codec: Arc<dyn AddressCodec>,
    router: Arc<dyn ShardRouter>,
    identifiers: HashSet<&'static str>,
}

impl FungibleTokensProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>, router: Arc<dyn ShardRouter>) -> Self {
        Self {
            codec,
            router,
            identifiers: HashSet::from([
                MECT_TRANSFER,
                MECT_BURN,
                MECT_LOCAL_MINT,
                MECT_LOCAL_BURN,
                MECT_WIPE,
                MULTI_MECT_NFT_TRANSFER,
            ]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        if !self.identifiers.contains(args.event.identifier_str()) {
            return EventOutcome::not_recognized();
        }

        if nonce_from_bytes(args.event.topic(1)) > 0 {
            // a token instance with a nonce, the NFT processor's territory
            return EventOutcome::not_recognized();
        }

        if args.event.topics.len() < NUM_TOPICS_WITH_RECEIVER_ADDRESS - 1 {
            return EventOutcome::processed_no_op();
        }

        let sender_shard = self.router.compute_shard(&args.event.address);
        if sender_shard == self.router.self_shard() {
            self.mark_sender(args.event, args.accounts);
        }

        self.process_destination(args)
    }

    fn mark_sender(&self, event: &Event, accounts: &mut AlteredAccounts) {
        let token = String::from_utf8_lossy(event.topic(0)).into_owned();
        accounts.add(
            self.codec.encode(&event.address),
            AlteredAccountMark {
                token_identifier: token,
                is_mect_operation: true,
                ..Default::default()
            },
        );
    }

    fn process_destination(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let token = String::from_utf8_lossy(args.event.topic(0)).into_owned();
        let value = big_uint_from_bytes(args.event.topic(2)).to_string();

        if args.event.topics.len() < NUM_TOPICS_WITH_RECEIVER_ADDRESS {
            return EventOutcome {
                identifier: token,
                value,
                processed: true,
                ..Default::default()
            };
        }

        let receiver = args.event.topic(3);
        let receiver_shard = self.router.compute_shard(receiver);
        if receiver_shard != self.router.self_shard() {
            return EventOutcome {
                identifier: token,
                value,
                processed: true,
                ..Default::default()
            };
        }

        let encoded_receiver = self.codec.encode(receiver);
        args.accounts.add(
            encoded_receiver.clone(),
            AlteredAccountMark {
                token_identifier: token.clone(),
                is_mect_operation: true,
                ..Default::default()
            },
        );

        EventOutcome {
            identifier: token,
            value,
            receiver: encoded_receiver,
            receiver_shard,
            processed: true,
            ..Default::default()
        }
    }
}
