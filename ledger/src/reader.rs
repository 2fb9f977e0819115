//! Decoded, read-only view of the ledger.

use mindepth_store::{LedgerStore, OutputLocation, StoreError};
use mindepth_types::{Block, Transaction, TxHash};

use crate::ReaderError;

/// The lookups the depth tracer needs. Every method returns `Ok(None)` when
/// the requested record does not exist.
pub trait LedgerReader {
    fn get_transaction(&self, txid: &TxHash) -> Result<Option<Transaction>, ReaderError>;

    fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, ReaderError>;

    /// Locate the output with global `index` in the `amount` class.
    fn resolve_output(&self, amount: u64, index: u64)
        -> Result<Option<OutputLocation>, ReaderError>;

    /// Number of blocks in the main chain.
    fn chain_height(&self) -> Result<u64, ReaderError>;
}

/// [`LedgerReader`] over any [`LedgerStore`], decoding records on the way out.
pub struct StoreReader<'a, S> {
    store: &'a S,
}

impl<'a, S: LedgerStore> StoreReader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }
}

fn found<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl<S: LedgerStore> LedgerReader for StoreReader<'_, S> {
    fn get_transaction(&self, txid: &TxHash) -> Result<Option<Transaction>, ReaderError> {
        match found(self.store.get_transaction(txid))? {
            Some(bytes) => Ok(Some(Transaction::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, ReaderError> {
        match found(self.store.get_block_by_height(height))? {
            Some(bytes) => Ok(Some(Block::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn resolve_output(
        &self,
        amount: u64,
        index: u64,
    ) -> Result<Option<OutputLocation>, ReaderError> {
        Ok(found(self.store.get_output(amount, index))?)
    }

    fn chain_height(&self) -> Result<u64, ReaderError> {
        Ok(self.store.block_count()?)
    }
}
