use thiserror::Error;

use mindepth_store::StoreError;
use mindepth_types::TxHash;

/// Fatal trace failures. A failed trace produces no partial result.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("transaction {txid} not found")]
    MissingTransaction { txid: TxHash },

    #[error("output {index} of amount {amount} not found")]
    MissingOutput { amount: u64, index: u64 },

    #[error("block at height {height} not found")]
    MissingBlock { height: u64 },

    #[error("block at height {height} is malformed: {reason}")]
    MalformedBlock { height: u64, reason: String },

    #[error("transaction {txid} is malformed: {reason}")]
    MalformedTransaction { txid: TxHash, reason: String },

    #[error("no transaction in block {height} owns output {index} of amount {amount}")]
    OutputOwnerNotFound { amount: u64, index: u64, height: u64 },

    #[error(
        "output {index} of amount {amount} in block {height} is owned by both {first} and {second}"
    )]
    AmbiguousOutputOwner {
        amount: u64,
        index: u64,
        height: u64,
        first: TxHash,
        second: TxHash,
    },

    #[error("transaction {txid} has an input of unsupported type {kind}")]
    InvalidInputType { txid: TxHash, kind: &'static str },

    #[error("trace of {start} ran out of transactions at depth {depth} without reaching a block reward")]
    TraceExhausted { start: TxHash, depth: u64 },

    #[error("trace of {start} exceeded the depth limit of {limit}")]
    DepthLimitExceeded { start: TxHash, limit: u64 },

    #[error("block {height} has no transactions to trace")]
    NothingToTrace { height: u64 },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
