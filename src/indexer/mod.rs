//! The per-block processing pipeline: transactions and results first, then
//! logs and events on top of them, then the altered account resolution.

pub mod accounts;
pub mod events;
pub mod transactions;
