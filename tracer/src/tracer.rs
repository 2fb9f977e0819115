//! Backward frontier expansion.

use std::collections::BTreeSet;

use rayon::prelude::*;

use mindepth_ledger::{LedgerReader, ReaderError};
use mindepth_store::StoreError;
use mindepth_types::{Block, CodecError, Input, PublicKey, Transaction, TxHash};

use crate::{OwnerPolicy, TraceConfig, TraceError};

/// Work done by a single trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub txs_fetched: u64,
    pub outputs_resolved: u64,
    pub blocks_scanned: u64,
}

/// Result of tracing one starting transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceOutcome {
    pub txid: TxHash,
    pub depth: u64,
    pub stats: TraceStats,
}

/// Computes minimum confirmation depths against a [`LedgerReader`].
///
/// Each call to [`trace`](Self::trace) owns its frontier, visited set and
/// statistics; the tracer itself holds only the reader and configuration.
pub struct DepthTracer<'r, R> {
    reader: &'r R,
    config: TraceConfig,
}

impl<'r, R: LedgerReader> DepthTracer<'r, R> {
    pub fn new(reader: &'r R, config: TraceConfig) -> Self {
        Self { reader, config }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Trace `start` back to the nearest block-reward input.
    ///
    /// Depth 0 means `start` itself has a terminal input. Each step replaces
    /// the frontier with the transactions owning every output referenced by
    /// every keyed input of the current frontier. Transactions already
    /// expanded are never expanded again.
    pub fn trace(&self, start: &TxHash) -> Result<TraceOutcome, TraceError> {
        let mut stats = TraceStats::default();
        let mut frontier = BTreeSet::from([*start]);
        let mut visited = frontier.clone();
        let mut depth = 0u64;

        loop {
            tracing::info!(
                "Considering {} transaction(s) at depth {}",
                frontier.len(),
                depth
            );

            let mut next = BTreeSet::new();
            let mut reached_terminal = false;

            for txid in &frontier {
                let tx = self.fetch_transaction(txid, &mut stats)?;
                for input in tx.inputs() {
                    match input {
                        Input::Terminal { .. } => {
                            reached_terminal = true;
                            break;
                        }
                        Input::Keyed { amount, .. } => {
                            let indices = input.absolute_offsets().map_err(|e| {
                                TraceError::MalformedTransaction {
                                    txid: *txid,
                                    reason: e.to_string(),
                                }
                            })?;
                            for index in indices {
                                next.insert(self.find_owner(*amount, index, &mut stats)?);
                            }
                        }
                    }
                }
            }

            if reached_terminal {
                tracing::debug!(
                    txid = %start,
                    depth,
                    txs_fetched = stats.txs_fetched,
                    outputs_resolved = stats.outputs_resolved,
                    blocks_scanned = stats.blocks_scanned,
                    "trace complete"
                );
                return Ok(TraceOutcome {
                    txid: *start,
                    depth,
                    stats,
                });
            }

            next.retain(|txid| !visited.contains(txid));
            if next.is_empty() {
                return Err(TraceError::TraceExhausted {
                    start: *start,
                    depth,
                });
            }
            visited.extend(next.iter().copied());
            frontier = next;

            depth += 1;
            if let Some(limit) = self.config.max_depth {
                if depth > limit {
                    return Err(TraceError::DepthLimitExceeded {
                        start: *start,
                        limit,
                    });
                }
            }
        }
    }

    fn fetch_transaction(
        &self,
        txid: &TxHash,
        stats: &mut TraceStats,
    ) -> Result<Transaction, TraceError> {
        stats.txs_fetched += 1;
        match self.reader.get_transaction(txid) {
            Ok(Some(tx)) => Ok(tx),
            Ok(None) => Err(TraceError::MissingTransaction { txid: *txid }),
            Err(ReaderError::Store(e)) => Err(e.into()),
            Err(ReaderError::Codec(CodecError::UnsupportedInput(kind))) => {
                Err(TraceError::InvalidInputType { txid: *txid, kind })
            }
            Err(ReaderError::Codec(e)) => Err(TraceError::MalformedTransaction {
                txid: *txid,
                reason: e.to_string(),
            }),
        }
    }

    fn fetch_block(&self, height: u64, stats: &mut TraceStats) -> Result<Block, TraceError> {
        stats.blocks_scanned += 1;
        match self.reader.get_block_by_height(height) {
            Ok(Some(block)) => Ok(block),
            Ok(None) => Err(TraceError::MissingBlock { height }),
            Err(ReaderError::Store(e)) => Err(e.into()),
            Err(ReaderError::Codec(e)) => Err(TraceError::MalformedBlock {
                height,
                reason: e.to_string(),
            }),
        }
    }

    /// The transaction owning output `index` of the `amount` class.
    fn find_owner(
        &self,
        amount: u64,
        index: u64,
        stats: &mut TraceStats,
    ) -> Result<TxHash, TraceError> {
        stats.outputs_resolved += 1;
        let location = match self.reader.resolve_output(amount, index) {
            Ok(Some(location)) => location,
            Ok(None) => return Err(TraceError::MissingOutput { amount, index }),
            Err(ReaderError::Store(e)) => return Err(e.into()),
            Err(ReaderError::Codec(e)) => {
                return Err(StoreError::Serialization(e.to_string()).into())
            }
        };
        let height = location.height;
        let block = self.fetch_block(height, stats)?;

        let mut owner = OwnerScan {
            policy: self.config.owner_policy,
            key: location.public_key,
            amount,
            index,
            height,
            first: None,
        };

        if owner.offer(block.reward_tx())? {
            return owner.finish();
        }
        for txid in block.tx_hashes() {
            let tx = self.fetch_transaction(txid, stats)?;
            if owner.offer(&tx)? {
                break;
            }
        }
        owner.finish()
    }
}

impl<R: LedgerReader + Sync> DepthTracer<'_, R> {
    /// Trace every transaction in `txids`, returning outcomes in the same
    /// order. The first failure in that order aborts the run.
    pub fn trace_all(&self, txids: &[TxHash]) -> Result<Vec<TraceOutcome>, TraceError> {
        if self.config.parallel {
            let results: Vec<_> = txids.par_iter().map(|txid| self.trace(txid)).collect();
            results.into_iter().collect()
        } else {
            txids.iter().map(|txid| self.trace(txid)).collect()
        }
    }
}

/// Owner search for one resolved output within its block.
struct OwnerScan {
    policy: OwnerPolicy,
    key: PublicKey,
    amount: u64,
    index: u64,
    height: u64,
    first: Option<TxHash>,
}

impl OwnerScan {
    /// Consider `tx` as an owner. Returns `Ok(true)` once scanning can stop.
    fn offer(&mut self, tx: &Transaction) -> Result<bool, TraceError> {
        if !tx.outputs().iter().any(|o| o.public_key == self.key) {
            return Ok(false);
        }
        match (self.policy, self.first) {
            (OwnerPolicy::FirstMatch, _) => {
                self.first = Some(tx.hash());
                Ok(true)
            }
            (OwnerPolicy::RejectAmbiguous, None) => {
                self.first = Some(tx.hash());
                Ok(false)
            }
            (OwnerPolicy::RejectAmbiguous, Some(first)) if first == tx.hash() => Ok(false),
            (OwnerPolicy::RejectAmbiguous, Some(first)) => Err(TraceError::AmbiguousOutputOwner {
                amount: self.amount,
                index: self.index,
                height: self.height,
                first,
                second: tx.hash(),
            }),
        }
    }

    fn finish(self) -> Result<TxHash, TraceError> {
        self.first.ok_or(TraceError::OutputOwnerNotFound {
            amount: self.amount,
            index: self.index,
            height: self.height,
        })
    }
}
