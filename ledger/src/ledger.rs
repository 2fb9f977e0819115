//! Block appender and global output indexing.

use mindepth_store::{BlockWrite, LedgerStore, OutputLocation};
use mindepth_types::{Block, BlockHash, Transaction};

use crate::{Checkpoints, LedgerError};

/// Summary statistics for the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSummary {
    pub blocks: u64,
    pub top_hash: Option<BlockHash>,
}

/// Appends blocks to a store, maintaining the height index and the
/// per-amount global output index.
///
/// Within a block, outputs are numbered block-reward transaction first, then
/// regular transactions in block order, each in output order. This is the
/// order every ring member offset in later blocks refers to.
pub struct Ledger<S> {
    store: S,
    checkpoints: Checkpoints,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_checkpoints(store, Checkpoints::new())
    }

    pub fn with_checkpoints(store: S, checkpoints: Checkpoints) -> Self {
        Self { store, checkpoints }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    /// Number of blocks in the chain; also the height of the next block.
    pub fn height(&self) -> Result<u64, LedgerError> {
        Ok(self.store.block_count()?)
    }

    pub fn top_hash(&self) -> Result<Option<BlockHash>, LedgerError> {
        match self.height()? {
            0 => Ok(None),
            h => Ok(Some(self.store.get_block_hash(h - 1)?)),
        }
    }

    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        Ok(LedgerSummary {
            blocks: self.height()?,
            top_hash: self.top_hash()?,
        })
    }

    /// Append `block` with its regular transactions `txs`, supplied in the
    /// order of the block's hash list.
    ///
    /// Nothing is written unless every check passes, and the store applies
    /// the transactions, output indices and block as one unit, so a failed
    /// append leaves the output index where it was.
    pub fn append_block(&self, block: &Block, txs: &[Transaction]) -> Result<BlockHash, LedgerError> {
        let height = block.height();
        let expected = self.height()?;
        if height != expected {
            return Err(LedgerError::HeightMismatch {
                expected,
                found: height,
            });
        }

        let parent = self.top_hash()?.unwrap_or(BlockHash::ZERO);
        if block.prev_hash() != parent {
            return Err(LedgerError::ParentMismatch {
                height,
                expected: parent,
                found: block.prev_hash(),
            });
        }

        let hash = block.hash();
        self.checkpoints.check_block(height, &hash)?;

        self.check_transactions(block, txs)?;

        let reward = block.reward_tx();
        let mut write = BlockWrite::new(height, hash, block.encode()?);
        for tx in std::iter::once(reward).chain(txs) {
            write.transactions.push((tx.hash(), tx.encode()?));
            write.outputs.extend(tx.outputs().iter().map(|output| {
                (
                    output.amount,
                    OutputLocation {
                        height,
                        public_key: output.public_key,
                    },
                )
            }));
        }
        self.store.write_block(&write)?;

        tracing::debug!(height, %hash, txs = txs.len(), "appended block");
        Ok(hash)
    }

    fn check_transactions(&self, block: &Block, txs: &[Transaction]) -> Result<(), LedgerError> {
        let height = block.height();
        if txs.len() != block.tx_hashes().len() {
            return Err(LedgerError::TransactionMismatch {
                height,
                reason: format!(
                    "block lists {} transaction(s), {} supplied",
                    block.tx_hashes().len(),
                    txs.len()
                ),
            });
        }

        let reward = block.reward_tx();
        if self.store.exists(&reward.hash())? {
            return Err(LedgerError::DuplicateTransaction(reward.hash()));
        }

        for (position, (tx, listed)) in txs.iter().zip(block.tx_hashes()).enumerate() {
            if tx.hash() != *listed {
                return Err(LedgerError::TransactionMismatch {
                    height,
                    reason: format!("position {position}: expected {listed}, got {}", tx.hash()),
                });
            }
            if tx.inputs().is_empty() {
                return Err(LedgerError::InvalidTransaction {
                    txid: tx.hash(),
                    reason: "transaction has no inputs".into(),
                });
            }
            if tx.inputs().iter().any(|i| i.is_terminal()) {
                return Err(LedgerError::InvalidTransaction {
                    txid: tx.hash(),
                    reason: "only the block-reward transaction may mint".into(),
                });
            }
            if self.store.exists(&tx.hash())? || tx.hash() == reward.hash() {
                return Err(LedgerError::DuplicateTransaction(tx.hash()));
            }
        }

        for (i, tx) in txs.iter().enumerate() {
            if txs[..i].iter().any(|earlier| earlier.hash() == tx.hash()) {
                return Err(LedgerError::DuplicateTransaction(tx.hash()));
            }
        }

        Ok(())
    }
}
