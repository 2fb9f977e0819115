//! Choosing which transactions to trace.

use std::fmt;

use mindepth_ledger::{LedgerReader, ReaderError};
use mindepth_types::TxHash;

use crate::TraceError;

/// Where a depth run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartPoint {
    /// A single transaction.
    Transaction(TxHash),
    /// Every transaction confirmed in the block at this height.
    Block(u64),
}

impl Default for StartPoint {
    fn default() -> Self {
        Self::Block(0)
    }
}

impl fmt::Display for StartPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(txid) => write!(f, "transaction {txid}"),
            Self::Block(height) => write!(f, "block {height}"),
        }
    }
}

/// Expand a start point into the ordered list of transactions to trace.
///
/// For a block this is its regular transactions in block order, followed by
/// the block-reward transaction when `include_coinbase` is set. A single
/// transaction is returned as is; its existence is checked by the trace.
pub fn start_transactions<R: LedgerReader>(
    reader: &R,
    start: &StartPoint,
    include_coinbase: bool,
) -> Result<Vec<TxHash>, TraceError> {
    let height = match start {
        StartPoint::Transaction(txid) => return Ok(vec![*txid]),
        StartPoint::Block(height) => *height,
    };

    let block = match reader.get_block_by_height(height) {
        Ok(Some(block)) => block,
        Ok(None) => return Err(TraceError::MissingBlock { height }),
        Err(ReaderError::Store(e)) => return Err(e.into()),
        Err(ReaderError::Codec(e)) => {
            return Err(TraceError::MalformedBlock {
                height,
                reason: e.to_string(),
            })
        }
    };

    let mut txids = block.tx_hashes().to_vec();
    if include_coinbase {
        txids.push(block.reward_tx().hash());
    }
    if txids.is_empty() {
        return Err(TraceError::NothingToTrace { height });
    }
    Ok(txids)
}
