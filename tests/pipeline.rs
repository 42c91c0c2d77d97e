//! End-to-end scenarios over the whole pipeline: raw pool in, bulk-request
//! buffers out, with fakes standing in for the chain collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use primitive_types::U256;

use mect_indexer::constants::{TRANSACTIONS_INDEX, TX_STATUS_PENDING, TX_STATUS_SUCCESS};
use mect_indexer::converters::balance::BalanceConverter;
use mect_indexer::converters::metadata::TokenMetadataPayload;
use mect_indexer::indexer::accounts::AccountsProcessor;
use mect_indexer::indexer::events::{LogsAndEventsProcessor, LogsAndEventsProcessorArgs};
use mect_indexer::indexer::transactions::{TransactionsProcessor, TransactionsProcessorArgs};
use mect_indexer::interface::TokenSnapshot;
use mect_indexer::mocks::{
    FixedAccountLoader, HexCodec, LinearFeeCalculator, NoopDataFieldParser, StaticRouter,
};
use mect_indexer::models::common::{
    Body, Event, Header, MiniBlock, MiniBlockType, Pool, RawScResult, RawTransaction, TxLog,
};
use mect_indexer::models::datasets::transactions::Transaction;
use mect_indexer::storage::elastic;
use mect_indexer::storage::{BufferSlice, DEFAULT_MAX_BULK_SIZE};

const TIMESTAMP: u64 = 5040;

fn tx_processor(self_shard: u32) -> TransactionsProcessor {
    TransactionsProcessor::new(TransactionsProcessorArgs {
        codec: Arc::new(HexCodec),
        fee_calculator: Arc::new(LinearFeeCalculator::default()),
        router: Arc::new(StaticRouter::same_shard(self_shard)),
        data_field_parser: Arc::new(NoopDataFieldParser),
        is_import_mode: false,
    })
}

fn logs_processor(self_shard: u32) -> LogsAndEventsProcessor {
    LogsAndEventsProcessor::new(LogsAndEventsProcessorArgs {
        router: Arc::new(StaticRouter::same_shard(self_shard)),
        codec: Arc::new(HexCodec),
        fee_calculator: Arc::new(LinearFeeCalculator::default()),
        balance_converter: BalanceConverter::new(10).unwrap(),
    })
}

fn header(self_shard: u32) -> Header {
    Header {
        nonce: 100,
        round: 500,
        timestamp: TIMESTAMP,
        shard_id: self_shard,
    }
}

fn single_tx_block(sender: &[u8], receiver_shard: u32) -> (Body, Pool) {
    let body = Body {
        miniblocks: vec![MiniBlock {
            mb_type: MiniBlockType::Tx,
            sender_shard: 0,
            receiver_shard,
            tx_hashes: vec![b"h1".to_vec()],
        }],
    };
    let mut pool = Pool::default();
    pool.txs.insert(
        b"h1".to_vec(),
        RawTransaction {
            nonce: 7,
            value: U256::from(100u64),
            sender: sender.to_vec(),
            receiver: b"contract".to_vec(),
            gas_limit: 104_011,
            gas_price: 1_000_000_000,
            ..Default::default()
        },
    );

    (body, pool)
}

fn be(nonce: u64) -> Vec<u8> {
    if nonce == 0 {
        return Vec::new();
    }
    let bytes = nonce.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    bytes[first..].to_vec()
}

#[test]
fn nft_lifecycle_from_creation_to_indexed_holding() {
    let (body, pool) = single_tx_block(b"creator", 0);
    let mut prepared = tx_processor(0).prepare_transactions_for_database(&body, &header(0), &pool);

    let payload = TokenMetadataPayload {
        name: "Piece".to_string(),
        royalties: 500,
        uris: vec![b"https://ipfs.io/ipfs/QmPiece".to_vec()],
        attributes: b"tags:art;metadata:QmMeta".to_vec(),
        ..Default::default()
    };
    let logs = vec![TxLog {
        tx_hash: b"h1".to_vec(),
        address: b"creator".to_vec(),
        events: vec![Event {
            address: b"creator".to_vec(),
            identifier: b"MECTNFTCreate".to_vec(),
            topics: vec![
                b"NFT-abcdef".to_vec(),
                be(1),
                be(1),
                serde_json::to_vec(&payload).unwrap(),
            ],
            data: Vec::new(),
        }],
    }];

    let results = logs_processor(0).extract_data_from_logs(&logs, &mut prepared, TIMESTAMP);

    // the creation produced a token record with the embedded metadata
    let created = results.tokens.get_all();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].identifier, "NFT-abcdef-01");
    let metadata = created[0].data.as_ref().unwrap();
    assert_eq!(metadata.name, "Piece");
    assert!(metadata.white_listed_storage);

    // tag usage was counted and the origin transaction marked
    assert_eq!(results.tags.len(), 1);
    assert!(prepared.transactions[0].has_operations);

    // the creator's holding resolves into an indexable token document
    let loader = FixedAccountLoader {
        token: TokenSnapshot {
            balance: U256::from(1u64),
            ..Default::default()
        },
        ..Default::default()
    };
    let accounts_proc = AccountsProcessor::new(
        Arc::new(HexCodec),
        Arc::new(loader),
        BalanceConverter::new(10).unwrap(),
        0,
    );
    let (_, token_accounts) = accounts_proc.get_accounts(&prepared.altered_accounts);
    let create_holding: Vec<_> = token_accounts
        .iter()
        .filter(|acc| acc.is_nft_create)
        .collect();
    assert_eq!(create_holding.len(), 1);
    assert_eq!(create_holding[0].token, "NFT-abcdef");
    assert_eq!(create_holding[0].nonce, 1);

    let (token_map, tokens_with_balance) =
        accounts_proc.prepare_token_accounts_map(TIMESTAMP, &token_accounts);
    assert_eq!(tokens_with_balance.get_all().len(), 1);

    let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
    elastic::serialize_accounts_mect(
        &token_map,
        &results.nft_data_updates,
        &mut buffer,
        "accountsmect",
    )
    .unwrap();
    let out = &buffer.buffers()[0];
    assert!(out.contains(&format!("{}-NFT-abcdef-01", hex::encode(b"creator"))));
    assert!(out.contains("params.account.timestamp"));
}

#[test]
fn cross_shard_fees_settle_on_the_destination_shard() {
    // source shard: the transaction stays pending and its first write is
    // guarded so the destination's verdict can never be overwritten
    let (body, pool) = single_tx_block(b"alice", 1);
    let source = tx_processor(0).prepare_transactions_for_database(&body, &header(0), &pool);
    assert_eq!(source.transactions[0].status, TX_STATUS_PENDING);

    let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
    elastic::serialize_transactions(
        &source.transactions,
        &source.tx_hash_status,
        0,
        &mut buffer,
        TRANSACTIONS_INDEX,
    )
    .unwrap();
    assert!(buffer.buffers()[0].contains(r#"{"script":{"source":"return"},"upsert":{"#));

    // destination shard: the refund leg settles the real gas consumption
    let (body, mut pool) = single_tx_block(b"alice", 1);
    pool.scrs.insert(
        b"scr1".to_vec(),
        RawScResult {
            nonce: 8,
            value: U256::from(49_320_000_000_000u64),
            sender: b"contract".to_vec(),
            receiver: b"alice".to_vec(),
            data: b"@6f6b".to_vec(),
            prev_tx_hash: b"h1".to_vec(),
            original_tx_hash: b"h1".to_vec(),
            ..Default::default()
        },
    );
    let destination = tx_processor(1).prepare_transactions_for_database(&body, &header(1), &pool);

    let tx = &destination.transactions[0];
    assert_eq!(tx.status, TX_STATUS_SUCCESS);
    assert!(tx.had_refund);
    assert_eq!(tx.gas_used, 104_011 - 49_320);
    assert_eq!(tx.fee, "54691000000000");

    let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
    elastic::serialize_transactions(
        &destination.transactions,
        &destination.tx_hash_status,
        1,
        &mut buffer,
        TRANSACTIONS_INDEX,
    )
    .unwrap();
    assert!(buffer.buffers()[0].contains(r#""gasUsed":54691"#));
}

#[test]
fn orphaned_refund_is_replayed_onto_the_stored_transaction() {
    let mut pool = Pool::default();
    pool.scrs.insert(
        b"scr1".to_vec(),
        RawScResult {
            value: U256::from(49_320_000_000_000u64),
            receiver: b"alice".to_vec(),
            data: b"@6f6b".to_vec(),
            prev_tx_hash: b"other".to_vec(),
            original_tx_hash: b"old-tx".to_vec(),
            ..Default::default()
        },
    );
    let prepared =
        tx_processor(0).prepare_transactions_for_database(&Body::default(), &header(0), &pool);

    let origin_hash = hex::encode(b"old-tx");
    assert_eq!(prepared.tx_hash_refund[&origin_hash].value, "49320000000000");

    // the origin transaction was indexed by an earlier block; replaying the
    // refund onto it settles its gas and fee
    let mut stored = HashMap::new();
    stored.insert(
        origin_hash.clone(),
        Transaction {
            hash: origin_hash,
            sender: hex::encode(b"alice"),
            gas_limit: 104_011,
            gas_price: 1_000_000_000,
            gas_used: 104_011,
            ..Default::default()
        },
    );
    let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
    elastic::serialize_transactions_with_refund(
        &stored,
        &prepared.tx_hash_refund,
        &LinearFeeCalculator::default(),
        &mut buffer,
        TRANSACTIONS_INDEX,
    )
    .unwrap();

    let out = &buffer.buffers()[0];
    assert!(out.contains(r#""gasUsed":54691"#));
    assert!(out.contains(r#""fee":"54691000000000""#));
}

#[test]
fn instance_nonce_routes_multi_transfers_between_processors() {
    let body = Body {
        miniblocks: vec![MiniBlock {
            mb_type: MiniBlockType::Tx,
            sender_shard: 0,
            receiver_shard: 0,
            tx_hashes: vec![b"h1".to_vec(), b"h2".to_vec()],
        }],
    };
    let mut pool = Pool::default();
    for hash in [b"h1", b"h2"] {
        pool.txs.insert(
            hash.to_vec(),
            RawTransaction {
                sender: b"alice".to_vec(),
                receiver: b"bob".to_vec(),
                gas_limit: 100_000,
                gas_price: 1_000,
                ..Default::default()
            },
        );
    }
    let mut prepared = tx_processor(0).prepare_transactions_for_database(&body, &header(0), &pool);

    let multi_transfer = |tx_hash: &[u8], nonce_topic: Vec<u8>| TxLog {
        tx_hash: tx_hash.to_vec(),
        address: b"alice".to_vec(),
        events: vec![Event {
            address: b"alice".to_vec(),
            identifier: b"MultiMECTNFTTransfer".to_vec(),
            topics: vec![
                b"TKN-abcdef".to_vec(),
                nonce_topic,
                be(5),
                b"recv".to_vec(),
            ],
            data: Vec::new(),
        }],
    };
    let logs = vec![multi_transfer(b"h1", be(0)), multi_transfer(b"h2", be(9))];

    logs_processor(0).extract_data_from_logs(&logs, &mut prepared, TIMESTAMP);

    let sender_marks = prepared.altered_accounts.get(&hex::encode(b"alice"));
    let fungible_mark = sender_marks
        .iter()
        .find(|mark| mark.is_mect_operation && !mark.is_nft_operation)
        .expect("zero-nonce transfer takes the fungible path");
    assert_eq!(fungible_mark.nft_nonce, 0);

    let nft_mark = sender_marks
        .iter()
        .find(|mark| mark.is_nft_operation)
        .expect("instance transfer takes the non-fungible path");
    assert_eq!(nft_mark.nft_nonce, 9);
}

#[test]
fn drained_holdings_are_deleted_not_recreated() {
    let loader = FixedAccountLoader::default();
    let accounts_proc = AccountsProcessor::new(
        Arc::new(HexCodec),
        Arc::new(loader),
        BalanceConverter::new(10).unwrap(),
        0,
    );

    let mut altered = mect_indexer::models::datasets::accounts::AlteredAccounts::new();
    altered.add(
        hex::encode(b"holder"),
        mect_indexer::models::datasets::accounts::AlteredAccountMark {
            token_identifier: "NFT-abcdef".to_string(),
            nft_nonce: 3,
            is_nft_operation: true,
            balance_change: true,
            ..Default::default()
        },
    );

    let (_, token_accounts) = accounts_proc.get_accounts(&altered);
    let (token_map, tokens_with_balance) =
        accounts_proc.prepare_token_accounts_map(TIMESTAMP, &token_accounts);

    // the zero balance never reaches the live token set
    assert!(tokens_with_balance.is_empty());

    let mut buffer = BufferSlice::new(DEFAULT_MAX_BULK_SIZE).unwrap();
    elastic::serialize_accounts_mect(&token_map, &[], &mut buffer, "accountsmect").unwrap();

    let out = &buffer.buffers()[0];
    assert!(out.contains("ctx.op = 'noop'"));
    assert!(out.contains("ctx.op = 'delete'"));
}
