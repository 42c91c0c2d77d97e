use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::constants::{
    MECT_NFT_CREATE_ROLE_TRANSFER, MECT_ROLE_NFT_CREATE, MECT_SET_ROLE, MECT_UNSET_ROLE,
};
use crate::converters::bytes_to_bool;
use crate::interface::AddressCodec;

use super::{EventOutcome, ProcessEventArgs};

const MIN_TOPICS_PROPERTIES_AND_ROLES: usize = 4;
const PROPERTIES_START_INDEX: usize = 2;
const UPGRADE_PROPERTIES_EVENT: &str = "upgradeProperties";

/// Interprets role grants/revocations and boolean property upgrades on a
/// token, accumulated for a single merge write per token.
pub(crate) struct TokenPropertiesProcessor {
    codec: Arc<dyn AddressCodec>,
    identifiers: HashSet<&'static str>,
}

impl TokenPropertiesProcessor {
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            codec,
            identifiers: HashSet::from([
                MECT_SET_ROLE,
                MECT_UNSET_ROLE,
                MECT_NFT_CREATE_ROLE_TRANSFER,
                UPGRADE_PROPERTIES_EVENT,
            ]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str();
        if !self.identifiers.contains(event_identifier) {
            return EventOutcome::not_recognized();
        }

        let topics = &args.event.topics;
        if topics.len() < MIN_TOPICS_PROPERTIES_AND_ROLES {
            return EventOutcome::processed_no_op();
        }

        if event_identifier == UPGRADE_PROPERTIES_EVENT {
            return self.extract_token_properties(args);
        }

        if event_identifier == MECT_NFT_CREATE_ROLE_TRANSFER {
            return self.extract_create_role_transfer(args);
        }

        // topics: token, nonce, value, then the roles to set or unset
        let roles = &topics[3..];
        if !roles_are_well_formed(roles) {
            return EventOutcome::processed_no_op();
        }

        let token = String::from_utf8_lossy(&topics[0]).into_owned();
        let should_add = event_identifier == MECT_SET_ROLE;
        let address = self.codec.encode(&args.event.address);
        for role in roles {
            args.token_roles_and_properties.add_role(
                token.clone(),
                address.clone(),
                String::from_utf8_lossy(role).into_owned(),
                should_add,
            );
        }

        EventOutcome::processed_no_op()
    }

    fn extract_create_role_transfer(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let topics = &args.event.topics;
        let address = self.codec.encode(&args.event.address);
        let should_add = bytes_to_bool(&topics[3]);

        args.token_roles_and_properties.add_role(
            String::from_utf8_lossy(&topics[0]).into_owned(),
            address,
            MECT_ROLE_NFT_CREATE.to_string(),
            should_add,
        );

        EventOutcome::processed_no_op()
    }

    fn extract_token_properties(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let topics = &args.event.topics;
        let mut properties = BTreeMap::new();
        for pair in topics[PROPERTIES_START_INDEX..].chunks_exact(2) {
            let property = String::from_utf8_lossy(&pair[0]).into_owned();
            properties.insert(property, bytes_to_bool(&pair[1]));
        }

        args.token_roles_and_properties
            .add_properties(String::from_utf8_lossy(&topics[0]).into_owned(), properties);

        EventOutcome::processed_no_op()
    }
}

fn roles_are_well_formed(roles: &[Vec<u8>]) -> bool {
    roles.iter().all(|role| {
        !role.is_empty()
            && std::str::from_utf8(role)
                .map(|s| s.chars().all(|c| c.is_alphabetic()))
                .unwrap_or(false)
    })
}
