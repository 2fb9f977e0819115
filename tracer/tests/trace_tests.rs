//! End-to-end depth traces over small synthetic ledgers.
//!
//! Every ledger here uses a single amount class (0), so global output
//! indices simply count outputs in creation order.

use proptest::prelude::*;

use mindepth_ledger::{Ledger, StoreReader};
use mindepth_nullables::NullStore;
use mindepth_store::{LedgerStore, OutputLocation, OutputStore, TransactionStore};
use mindepth_store_lmdb::LmdbEnvironment;
use mindepth_tracer::{
    start_transactions, DepthReport, DepthTracer, OwnerPolicy, StartPoint, TraceConfig,
    TraceError,
};
use mindepth_types::offsets::absolute_to_relative;
use mindepth_types::record::{self, InputRecord, TxRecord};
use mindepth_types::{
    blake2b_256, Block, BlockHash, Input, KeyImage, Output, PublicKey, Transaction, TxHash,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key(n: u8) -> PublicKey {
    PublicKey([n; 32])
}

/// A transaction spending a ring of absolute indices into one output `out`.
fn spend(ring: &[u64], out: u8) -> Transaction {
    Transaction::new(
        0,
        vec![Input::Keyed {
            amount: 0,
            key_offsets: absolute_to_relative(ring).unwrap(),
            key_image: KeyImage([out; 32]),
        }],
        vec![Output::new(0, key(out))],
        Vec::new(),
    )
    .unwrap()
}

/// Append a block whose reward pays `reward_key`, confirming `txs`.
fn append<S: LedgerStore>(ledger: &Ledger<S>, reward_key: u8, txs: &[Transaction]) -> Block {
    let height = ledger.height().unwrap();
    let reward = Transaction::reward(height, vec![Output::new(0, key(reward_key))]).unwrap();
    let prev = ledger.top_hash().unwrap().unwrap_or(BlockHash::ZERO);
    let block = Block::new(
        prev,
        1_000 + height * 120,
        reward,
        txs.iter().map(Transaction::hash).collect(),
    )
    .unwrap();
    ledger.append_block(&block, txs).unwrap();
    block
}

/// Store a transaction without confirming it in any block.
fn put_loose(store: &NullStore, tx: &Transaction) {
    store
        .put_transaction(&tx.hash(), &tx.encode().unwrap())
        .unwrap();
}

struct Fixture {
    blocks: Vec<Block>,
    a: Transaction,
    b: Transaction,
    b2: Transaction,
    c: Transaction,
}

/// Four blocks:
///
/// | height | reward (index) | regular transactions (index)          |
/// |--------|----------------|---------------------------------------|
/// | 0      | k1 (0)         |                                       |
/// | 1      | k2 (1)         | A spends [0] → k3 (2)                 |
/// | 2      | k4 (3)         | B spends [2] → k5 (4); B2 spends [0, 2] → k7 (5) |
/// | 3      | k6 (6)         | C spends [4] → k8 (7)                 |
///
/// Depths: A = 1, B = 2, B2 = 1, C = 3, every reward = 0.
fn build<S: LedgerStore>(store: S) -> (Ledger<S>, Fixture) {
    let ledger = Ledger::new(store);
    let a = spend(&[0], 3);
    let b = spend(&[2], 5);
    let b2 = spend(&[0, 2], 7);
    let c = spend(&[4], 8);

    let blocks = vec![
        append(&ledger, 1, &[]),
        append(&ledger, 2, std::slice::from_ref(&a)),
        append(&ledger, 4, &[b.clone(), b2.clone()]),
        append(&ledger, 6, std::slice::from_ref(&c)),
    ];
    (ledger, Fixture { blocks, a, b, b2, c })
}

fn depth_of<S: LedgerStore>(ledger: &Ledger<S>, txid: &TxHash) -> Result<u64, TraceError> {
    let reader = StoreReader::new(ledger.store());
    DepthTracer::new(&reader, TraceConfig::default())
        .trace(txid)
        .map(|o| o.depth)
}

// ---------------------------------------------------------------------------
// Depths
// ---------------------------------------------------------------------------

#[test]
fn block_reward_has_depth_zero() {
    let (ledger, fx) = build(NullStore::new());
    for block in &fx.blocks {
        assert_eq!(depth_of(&ledger, &block.reward_tx().hash()).unwrap(), 0);
    }
}

#[test]
fn spend_of_reward_output_has_depth_one() {
    let (ledger, fx) = build(NullStore::new());
    assert_eq!(depth_of(&ledger, &fx.a.hash()).unwrap(), 1);
}

#[test]
fn each_hop_adds_one() {
    let (ledger, fx) = build(NullStore::new());
    assert_eq!(depth_of(&ledger, &fx.a.hash()).unwrap(), 1);
    assert_eq!(depth_of(&ledger, &fx.b.hash()).unwrap(), 2);
    assert_eq!(depth_of(&ledger, &fx.c.hash()).unwrap(), 3);
}

#[test]
fn shortest_ring_member_wins() {
    let (ledger, fx) = build(NullStore::new());
    // B2's ring holds both a reward output and A's output.
    assert_eq!(depth_of(&ledger, &fx.b2.hash()).unwrap(), 1);
}

#[test]
fn retrace_is_stable() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let tracer = DepthTracer::new(&reader, TraceConfig::default());
    let first = tracer.trace(&fx.c.hash()).unwrap();
    let second = tracer.trace(&fx.c.hash()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stats_count_work() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let outcome = DepthTracer::new(&reader, TraceConfig::default())
        .trace(&fx.a.hash())
        .unwrap();
    // A, then the reward of block 0; the owner was the reward so no regular
    // transaction of block 0 was fetched.
    assert_eq!(outcome.stats.txs_fetched, 2);
    assert_eq!(outcome.stats.outputs_resolved, 1);
    assert_eq!(outcome.stats.blocks_scanned, 1);
}

#[test]
fn depth_limit() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let limited = TraceConfig {
        max_depth: Some(2),
        ..TraceConfig::default()
    };
    assert!(matches!(
        DepthTracer::new(&reader, limited).trace(&fx.c.hash()),
        Err(TraceError::DepthLimitExceeded { limit: 2, .. })
    ));
    let enough = TraceConfig {
        max_depth: Some(3),
        ..TraceConfig::default()
    };
    assert_eq!(
        DepthTracer::new(&reader, enough)
            .trace(&fx.c.hash())
            .unwrap()
            .depth,
        3
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A linear chain of spends, each consuming the previous spend's output,
    /// has depth equal to its length.
    #[test]
    fn linear_chain_depth_matches_hops(hops in 1usize..8) {
        let ledger = Ledger::new(NullStore::new());
        append(&ledger, 1, &[]);
        // Output of interest starts at index 0; each block adds a reward
        // output followed by the spend's output.
        let mut prev_index = 0u64;
        let mut last = None;
        for hop in 0..hops {
            let tx = spend(&[prev_index], 100 + hop as u8);
            append(&ledger, 50 + hop as u8, std::slice::from_ref(&tx));
            prev_index = 2 * hop as u64 + 2;
            last = Some(tx);
        }
        let last = last.unwrap();
        prop_assert_eq!(depth_of(&ledger, &last.hash()).unwrap(), hops as u64);
    }
}

// ---------------------------------------------------------------------------
// Selection and aggregation
// ---------------------------------------------------------------------------

#[test]
fn block_selection_with_and_without_reward() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());

    let without = start_transactions(&reader, &StartPoint::Block(2), false).unwrap();
    assert_eq!(without, vec![fx.b.hash(), fx.b2.hash()]);

    let with = start_transactions(&reader, &StartPoint::Block(2), true).unwrap();
    assert_eq!(
        with,
        vec![fx.b.hash(), fx.b2.hash(), fx.blocks[2].reward_tx().hash()]
    );

    let tracer = DepthTracer::new(&reader, TraceConfig::default());
    let depths: Vec<u64> = tracer
        .trace_all(&with)
        .unwrap()
        .iter()
        .map(|o| o.depth)
        .collect();
    assert_eq!(depths, vec![2, 1, 0]);
}

#[test]
fn empty_block_has_nothing_to_trace() {
    let (ledger, _) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    assert!(matches!(
        start_transactions(&reader, &StartPoint::Block(0), false),
        Err(TraceError::NothingToTrace { height: 0 })
    ));
    assert_eq!(
        start_transactions(&reader, &StartPoint::Block(0), true)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn selection_of_missing_block() {
    let (ledger, _) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    assert!(matches!(
        start_transactions(&reader, &StartPoint::Block(99), true),
        Err(TraceError::MissingBlock { height: 99 })
    ));
}

#[test]
fn single_transaction_selection_is_passed_through() {
    let (ledger, _) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let txid = TxHash::new([0x42; 32]);
    assert_eq!(
        start_transactions(&reader, &StartPoint::Transaction(txid), true).unwrap(),
        vec![txid]
    );
}

#[test]
fn report_for_block() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let txids = start_transactions(&reader, &StartPoint::Block(2), true).unwrap();
    let outcomes = DepthTracer::new(&reader, TraceConfig::default())
        .trace_all(&txids)
        .unwrap();
    let report = DepthReport::new(&outcomes).unwrap();
    let text = report.to_string();
    assert!(text.starts_with(&format!("Min depth for txid {}: 2\n", fx.b.hash())));
    assert!(text.contains("Average min depth for 3 transaction(s): 1\n"));
    assert!(text.ends_with("Median min depth for 3 transaction(s): 1"));
}

#[test]
fn parallel_matches_sequential() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let txids = vec![
        fx.c.hash(),
        fx.a.hash(),
        fx.blocks[0].reward_tx().hash(),
        fx.b2.hash(),
        fx.b.hash(),
    ];
    let sequential = DepthTracer::new(&reader, TraceConfig::default())
        .trace_all(&txids)
        .unwrap();
    let parallel = DepthTracer::new(
        &reader,
        TraceConfig {
            parallel: true,
            ..TraceConfig::default()
        },
    )
    .trace_all(&txids)
    .unwrap();
    assert_eq!(sequential, parallel);
    assert_eq!(
        parallel.iter().map(|o| o.depth).collect::<Vec<_>>(),
        vec![3, 1, 0, 1, 2]
    );
}

#[test]
fn parallel_reports_first_failure_in_order() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let first_missing = TxHash::new([0xe1; 32]);
    let txids = vec![fx.a.hash(), first_missing, TxHash::new([0xe2; 32])];
    let err = DepthTracer::new(
        &reader,
        TraceConfig {
            parallel: true,
            ..TraceConfig::default()
        },
    )
    .trace_all(&txids)
    .unwrap_err();
    assert!(matches!(err, TraceError::MissingTransaction { txid } if txid == first_missing));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_start_is_missing() {
    let (ledger, _) = build(NullStore::new());
    let txid = TxHash::new([0xee; 32]);
    assert!(matches!(
        depth_of(&ledger, &txid),
        Err(TraceError::MissingTransaction { txid: t }) if t == txid
    ));
}

#[test]
fn missing_owner_candidate_is_missing_transaction() {
    let (ledger, fx) = build(NullStore::new());
    ledger.store().remove_transaction(&fx.a.hash());
    // B's ring points at A's output; the scan of block 1 needs A.
    assert!(matches!(
        depth_of(&ledger, &fx.b.hash()),
        Err(TraceError::MissingTransaction { txid }) if txid == fx.a.hash()
    ));
}

#[test]
fn unknown_output_index() {
    let (ledger, _) = build(NullStore::new());
    let tx = spend(&[100], 0x30);
    put_loose(ledger.store(), &tx);
    assert!(matches!(
        depth_of(&ledger, &tx.hash()),
        Err(TraceError::MissingOutput {
            amount: 0,
            index: 100
        })
    ));
}

#[test]
fn output_located_in_missing_block() {
    let (ledger, _) = build(NullStore::new());
    let store = ledger.store();
    store
        .put_output(
            0,
            8,
            &OutputLocation {
                height: 50,
                public_key: key(0x31),
            },
        )
        .unwrap();
    let tx = spend(&[8], 0x32);
    put_loose(store, &tx);
    assert!(matches!(
        depth_of(&ledger, &tx.hash()),
        Err(TraceError::MissingBlock { height: 50 })
    ));
}

#[test]
fn key_absent_from_block_is_owner_not_found() {
    let (ledger, _) = build(NullStore::new());
    let store = ledger.store();
    store
        .put_output(
            0,
            8,
            &OutputLocation {
                height: 1,
                public_key: key(99),
            },
        )
        .unwrap();
    let tx = spend(&[8], 0x33);
    put_loose(store, &tx);

    let reader = StoreReader::new(store);
    let result = DepthTracer::new(&reader, TraceConfig::default()).trace_all(&[tx.hash()]);
    assert!(matches!(
        result,
        Err(TraceError::OutputOwnerNotFound {
            amount: 0,
            index: 8,
            height: 1
        })
    ));
}

#[test]
fn corrupt_owner_block_is_malformed() {
    let (ledger, fx) = build(NullStore::new());
    ledger.store().corrupt_block(&fx.blocks[0].hash(), &[0xff]);
    assert!(matches!(
        depth_of(&ledger, &fx.a.hash()),
        Err(TraceError::MalformedBlock { height: 0, .. })
    ));
}

#[test]
fn script_input_is_invalid_input_type() {
    let (ledger, _) = build(NullStore::new());
    let rec = TxRecord {
        version: 1,
        unlock_time: 0,
        inputs: vec![InputRecord::ToScriptHash {
            prev: TxHash::ZERO,
            prevout: 0,
            script: vec![0x51],
            sigset: vec![],
        }],
        outputs: vec![],
        extra: vec![],
    };
    let bytes = record::encode(&rec).unwrap();
    let txid = TxHash::new(blake2b_256(&bytes));
    ledger.store().put_transaction(&txid, &bytes).unwrap();

    assert!(matches!(
        depth_of(&ledger, &txid),
        Err(TraceError::InvalidInputType { txid: t, kind: "to_scripthash" }) if t == txid
    ));
}

#[test]
fn bad_offsets_are_malformed() {
    let (ledger, _) = build(NullStore::new());
    // A zero step after the first offset repeats a ring member.
    let tx = Transaction::new(
        0,
        vec![Input::Keyed {
            amount: 0,
            key_offsets: vec![0, 0],
            key_image: KeyImage([0x34; 32]),
        }],
        vec![],
        Vec::new(),
    )
    .unwrap();
    put_loose(ledger.store(), &tx);
    assert!(matches!(
        depth_of(&ledger, &tx.hash()),
        Err(TraceError::MalformedTransaction { .. })
    ));
}

#[test]
fn self_reference_is_exhausted() {
    let ledger = Ledger::new(NullStore::new());
    append(&ledger, 1, &[]);
    // Block 1 puts its reward at index 1 and X's output at index 2, which X
    // itself spends.
    let x = spend(&[2], 0x40);
    append(&ledger, 2, std::slice::from_ref(&x));
    assert!(matches!(
        depth_of(&ledger, &x.hash()),
        Err(TraceError::TraceExhausted { start, depth: 0 }) if start == x.hash()
    ));
}

#[test]
fn transaction_without_inputs_is_exhausted() {
    let (ledger, _) = build(NullStore::new());
    let tx = Transaction::new(0, vec![], vec![Output::new(0, key(0x41))], Vec::new()).unwrap();
    put_loose(ledger.store(), &tx);
    assert!(matches!(
        depth_of(&ledger, &tx.hash()),
        Err(TraceError::TraceExhausted { depth: 0, .. })
    ));
}

// ---------------------------------------------------------------------------
// Terminal inputs mixed with keyed ones
// ---------------------------------------------------------------------------

fn keyed(index: u64, image: u8) -> Input {
    Input::Keyed {
        amount: 0,
        key_offsets: vec![index],
        key_image: KeyImage([image; 32]),
    }
}

#[test]
fn inputs_after_a_terminal_one_are_skipped() {
    let (ledger, _) = build(NullStore::new());
    let tx = Transaction::new(
        0,
        vec![Input::Terminal { height: 0 }, keyed(999, 0x60)],
        vec![],
        Vec::new(),
    )
    .unwrap();
    put_loose(ledger.store(), &tx);
    assert_eq!(depth_of(&ledger, &tx.hash()).unwrap(), 0);
}

#[test]
fn inputs_before_a_terminal_one_are_resolved() {
    let (ledger, _) = build(NullStore::new());
    let tx = Transaction::new(
        0,
        vec![keyed(999, 0x61), Input::Terminal { height: 0 }],
        vec![],
        Vec::new(),
    )
    .unwrap();
    put_loose(ledger.store(), &tx);
    assert!(matches!(
        depth_of(&ledger, &tx.hash()),
        Err(TraceError::MissingOutput {
            amount: 0,
            index: 999
        })
    ));
}

#[test]
fn terminal_frontier_member_does_not_mask_a_failing_one() {
    let ledger = Ledger::new(NullStore::new());
    append(&ledger, 1, &[]);
    // D is confirmed at index 2 but spends an output that was never indexed.
    let d = spend(&[999], 0x62);
    append(&ledger, 2, std::slice::from_ref(&d));
    // T's ring holds the genesis reward (terminal) and D.
    let t = spend(&[0, 2], 0x63);
    put_loose(ledger.store(), &t);

    assert!(matches!(
        depth_of(&ledger, &t.hash()),
        Err(TraceError::MissingOutput {
            amount: 0,
            index: 999
        })
    ));
}

// ---------------------------------------------------------------------------
// Owner policy
// ---------------------------------------------------------------------------

/// Block 1 holds P and Q, both paying the same key (index 2 and 3).
/// S in block 2 spends Q's output.
fn ambiguous_ledger() -> (Ledger<NullStore>, Transaction, Transaction, Transaction) {
    let ledger = Ledger::new(NullStore::new());
    append(&ledger, 1, &[]);
    let p = spend(&[0], 9);
    let q = Transaction::new(
        0,
        vec![Input::Keyed {
            amount: 0,
            key_offsets: vec![1],
            key_image: KeyImage([0x50; 32]),
        }],
        vec![Output::new(0, key(9))],
        Vec::new(),
    )
    .unwrap();
    append(&ledger, 2, &[p.clone(), q.clone()]);
    let s = spend(&[3], 0x51);
    append(&ledger, 3, std::slice::from_ref(&s));
    (ledger, p, q, s)
}

#[test]
fn first_match_takes_earliest_owner() {
    let (ledger, _, _, s) = ambiguous_ledger();
    assert_eq!(depth_of(&ledger, &s.hash()).unwrap(), 2);
}

#[test]
fn strict_owners_reject_duplicate_keys() {
    let (ledger, p, q, s) = ambiguous_ledger();
    let reader = StoreReader::new(ledger.store());
    let strict = TraceConfig {
        owner_policy: OwnerPolicy::RejectAmbiguous,
        ..TraceConfig::default()
    };
    let err = DepthTracer::new(&reader, strict).trace(&s.hash()).unwrap_err();
    assert!(matches!(
        err,
        TraceError::AmbiguousOutputOwner { amount: 0, index: 3, height: 1, first, second }
            if first == p.hash() && second == q.hash()
    ));
}

#[test]
fn strict_owners_accept_unique_keys() {
    let (ledger, fx) = build(NullStore::new());
    let reader = StoreReader::new(ledger.store());
    let strict = TraceConfig {
        owner_policy: OwnerPolicy::RejectAmbiguous,
        ..TraceConfig::default()
    };
    assert_eq!(
        DepthTracer::new(&reader, strict)
            .trace(&fx.c.hash())
            .unwrap()
            .depth,
        3
    );
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

#[test]
fn lmdb_and_memory_trace_identically() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).unwrap();
    let (lmdb_ledger, lmdb_fx) = build(env);
    let (mem_ledger, mem_fx) = build(NullStore::new());

    let lmdb_reader = StoreReader::new(lmdb_ledger.store());
    let mem_reader = StoreReader::new(mem_ledger.store());

    for height in 0..4 {
        let lmdb_txids = start_transactions(&lmdb_reader, &StartPoint::Block(height), true).unwrap();
        let mem_txids = start_transactions(&mem_reader, &StartPoint::Block(height), true).unwrap();
        assert_eq!(lmdb_txids, mem_txids);

        let lmdb = DepthTracer::new(&lmdb_reader, TraceConfig::default())
            .trace_all(&lmdb_txids)
            .unwrap();
        let mem = DepthTracer::new(&mem_reader, TraceConfig::default())
            .trace_all(&mem_txids)
            .unwrap();
        assert_eq!(lmdb, mem);
    }
    assert_eq!(lmdb_fx.c.hash(), mem_fx.c.hash());
}
