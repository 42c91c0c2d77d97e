use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{
    COMPLETED_TX_EVENT, SIGNAL_ERROR, TX_STATUS_FAIL, TX_STATUS_SUCCESS, WRITE_LOG,
};
use crate::interface::FeeCalculator;

use super::{EventOutcome, ProcessEventArgs};

/// Interprets the purely informative events: completion markers, log writes
/// and error signals. Carries no token data; only fixes up the status and
/// the consumed gas of the originating transaction.
pub(crate) struct InformativeLogsProcessor {
    fee_calculator: Arc<dyn FeeCalculator>,
    identifiers: HashSet<&'static str>,
}

impl InformativeLogsProcessor {
    pub fn new(fee_calculator: Arc<dyn FeeCalculator>) -> Self {
        Self {
            fee_calculator,
            identifiers: HashSet::from([WRITE_LOG, SIGNAL_ERROR, COMPLETED_TX_EVENT]),
        }
    }

    pub fn process_event(&self, args: &mut ProcessEventArgs<'_>) -> EventOutcome {
        let event_identifier = args.event.identifier_str();
        if !self.identifiers.contains(event_identifier) {
            return EventOutcome::not_recognized();
        }

        let Some(&idx) = args.tx_index.get(args.tx_hash_hex) else {
            return EventOutcome::processed_no_op();
        };
        let tx = &mut args.txs[idx];

        match event_identifier {
            WRITE_LOG => {
                tx.status = TX_STATUS_SUCCESS.to_string();
                let gas_used = self.fee_calculator.compute_gas_limit(tx);
                let fee = self
                    .fee_calculator
                    .compute_tx_fee_based_on_gas_used(tx, gas_used);
                tx.gas_used = gas_used;
                tx.fee = fee.to_string();
            }
            SIGNAL_ERROR => {
                tx.status = TX_STATUS_FAIL.to_string();
                let gas_used = tx.gas_limit;
                let fee = self
                    .fee_calculator
                    .compute_tx_fee_based_on_gas_used(tx, gas_used);
                tx.gas_used = gas_used;
                tx.fee = fee.to_string();
            }
            _ => {}
        }

        EventOutcome::processed_no_op()
    }
}
