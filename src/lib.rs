//! Core processing pipeline of a sharded MECT-token block indexer.
//!
//! For every executed block the pipeline receives the block body, the header
//! and the pool of raw execution artifacts, and turns them into search-engine
//! documents in three stages:
//!
//! 1. [`indexer::transactions`] groups transactions, rewards, receipts and
//!    smart contract results by miniblock and reconciles gas, fees and
//!    statuses across result chains.
//! 2. [`indexer::events`] classifies execution events through a fixed chain
//!    of processors, extracting token, delegation, deployment and role
//!    deltas, and marking which addresses were altered.
//! 3. [`indexer::accounts`] resolves the altered addresses against the
//!    account trie into account and balance-history documents.
//!
//! [`storage`] then serializes everything into idempotent bulk requests:
//! documents that only one shard writes are plain replaces, everything two
//! shards can race on is a guarded merge.
//!
//! Chain access, address encoding, fee economics and payload parsing are
//! injected through the traits in [`interface`]; the pipeline itself is a
//! pure in-memory transformation.

pub mod constants;
pub mod converters;
pub mod indexer;
pub mod interface;
pub mod mocks;
pub mod models;
pub mod storage;
