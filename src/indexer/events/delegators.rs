use std::collections::HashSet;
use std::sync::Arc;

use crate::converters::balance::BalanceConverter;
use crate::converters::{big_uint_from_bytes, bytes_to_bool};
use crate::interface::AddressCodec;
use crate::models::datasets::tokens::Delegator;

use super::{EventOutcome, ProcessEventArgs};

const DELEGATE_FUNC: &str = "delegate";
const UN_DELEGATE_FUNC: &str = "unDelegate";
const WITHDRAW_FUNC: &str = "withdraw";
const RE_DELEGATE_REWARDS_FUNC: &str = "reDelegateRewards";
const CLAIM_REWARDS_FUNC: &str = "claimRewards";

const MIN_TOPICS_DELEGATION: usize = 4;
const WITHDRAW_DELETE_FLAG_INDEX: usize = 4;

/// Interprets staking contract events, tracking the active stake of each
/// delegator per contract. Metachain only.
///
/// Topic layout for delegation operations: operation value, remaining active
/// stake, number of delegators, total active stake. A withdraw carries a
/// fifth topic flagging that the delegation was fully exited.
pub(crate) struct DelegatorsProcessor {
    codec: Arc<dyn AddressCodec>,
    balance_converter: BalanceConverter,
    identifiers: HashSet<&'static str>,
}

impl DelegatorsProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>, balance_converter: BalanceConverter) -> Self {
        Self {
            codec,
            balance_converter,
            identifiers: HashSet::from([
                DELEGATE_FUNC,
                UN_DELEGATE_FUNC,
                WITHDRAW_FUNC,
                RE_DELEGATE_REWARDS_FUNC,
                CLAIM_REWARDS_FUNC,
            ]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str();
        if !self.identifiers.contains(event_identifier) {
            return EventOutcome::not_recognized();
        }

        if event_identifier == CLAIM_REWARDS_FUNC {
            return self.process_claim_rewards(args);
        }

        let topics = &args.event.topics;
        if topics.len() < MIN_TOPICS_DELEGATION {
            return EventOutcome::processed_no_op();
        }

        let active_stake = big_uint_from_bytes(&topics[1]);
        let should_delete = event_identifier == WITHDRAW_FUNC
            && topics.len() > WITHDRAW_DELETE_FLAG_INDEX
            && bytes_to_bool(&topics[WITHDRAW_DELETE_FLAG_INDEX]);

        EventOutcome {
            delegator: Some(Delegator {
                address: self.codec.encode(&args.event.address),
                contract: self.codec.encode(args.log_address),
                active_stake: active_stake.to_string(),
                active_stake_num: self.balance_converter.compute_balance_as_float(active_stake),
                timestamp: args.timestamp,
                should_delete,
            }),
            processed: true,
            ..Default::default()
        }
    }

    fn process_claim_rewards(&self, args: &ProcessEventArgs<'_>) -> EventOutcome {
        let topics = &args.event.topics;
        if topics.len() < 2 {
            return EventOutcome::processed_no_op();
        }

        if !bytes_to_bool(&topics[1]) {
            // rewards claimed without exiting, the stake document is untouched
            return EventOutcome::processed_no_op();
        }

        EventOutcome {
            delegator: Some(Delegator {
                address: self.codec.encode(&args.event.address),
                contract: self.codec.encode(args.log_address),
                timestamp: args.timestamp,
                should_delete: true,
                ..Default::default()
            }),
            processed: true,
            ..Default::default()
        }
    }
}
