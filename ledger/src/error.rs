use thiserror::Error;

use mindepth_store::StoreError;
use mindepth_types::{BlockHash, CodecError, TxHash};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("block height mismatch: expected {expected}, found {found}")]
    HeightMismatch { expected: u64, found: u64 },

    #[error("block {height} does not extend the chain: expected parent {expected}, found {found}")]
    ParentMismatch {
        height: u64,
        expected: BlockHash,
        found: BlockHash,
    },

    #[error("transactions supplied for block {height} do not match its hash list: {reason}")]
    TransactionMismatch { height: u64, reason: String },

    #[error("transaction {0} is already in the ledger")]
    DuplicateTransaction(TxHash),

    #[error("invalid transaction {txid}: {reason}")]
    InvalidTransaction { txid: TxHash, reason: String },

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("invalid checkpoint hash: {0}")]
    InvalidHash(String),

    #[error("checkpoint at height {height} already exists with a different hash")]
    Conflict { height: u64 },

    #[error("checkpoint failed at height {height}: expected {expected}, found {found}")]
    Mismatch {
        height: u64,
        expected: BlockHash,
        found: BlockHash,
    },

    #[error("failed to read checkpoint file: {0}")]
    Io(String),

    #[error("failed to parse checkpoint file: {0}")]
    Json(String),
}

/// Failures of the decoded read interface. Not-found is not an error here;
/// readers return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum SpentError {
    #[error("block at height {0} is missing from the main chain")]
    MissingBlock(u64),

    #[error("transaction {0} listed in a block is missing")]
    MissingTransaction(TxHash),

    #[error("failed to read known spent outputs: {0}")]
    Io(String),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
