use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{SC_DEPLOY, SC_UPGRADE};
use crate::interface::AddressCodec;
use crate::models::datasets::tokens::ScDeployInfo;

use super::{EventOutcome, ProcessEventArgs};

/// Interprets contract deployment and upgrade events.
///
/// Topic layout: deployed contract address, creator address.
pub(crate) struct ScDeploysProcessor {
    codec: Arc<dyn AddressCodec>,
    identifiers: HashSet<&'static str>,
}

impl ScDeploysProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            codec,
            identifiers: HashSet::from([SC_DEPLOY, SC_UPGRADE]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        if !self.identifiers.contains(args.event.identifier_str()) {
            return EventOutcome::not_recognized();
        }

        let topics = &args.event.topics;
        if topics.len() < 2 {
            return EventOutcome::processed_no_op();
        }

        let contract_address = self.codec.encode(&topics[0]);
        args.sc_deploys.insert(
            contract_address,
            ScDeployInfo {
                tx_hash: args.tx_hash_hex.to_string(),
                creator: self.codec.encode(&topics[1]),
                timestamp: args.timestamp,
            },
        );

        EventOutcome::processed_no_op()
    }
}
