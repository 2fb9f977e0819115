//! Abstract storage traits for the ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. Records cross this boundary as raw bytes; decoding them is the
//! caller's job, so a corrupt record surfaces as a codec error rather than a
//! storage error.

pub mod batch;
pub mod block;
pub mod error;
pub mod meta;
pub mod output;
pub mod transaction;

pub use batch::{BlockWrite, BlockWriter};
pub use block::BlockStore;
pub use error::StoreError;
pub use meta::MetaStore;
pub use output::{OutputLocation, OutputStore};
pub use transaction::TransactionStore;

/// Everything the ledger reads and writes: blocks, transactions and the
/// global output index, plus atomic whole-block appends.
pub trait LedgerStore: BlockStore + TransactionStore + OutputStore + BlockWriter {}

impl<T: BlockStore + TransactionStore + OutputStore + BlockWriter> LedgerStore for T {}
