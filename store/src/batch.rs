//! Whole-block writes.

use mindepth_types::{BlockHash, TxHash};

use crate::{OutputLocation, StoreError};

/// Everything appending one block adds to the store.
///
/// `outputs` are listed in index order; each is appended to its amount
/// class after the outputs already committed for that class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockWrite {
    pub height: u64,
    pub hash: BlockHash,
    pub block_bytes: Vec<u8>,
    pub transactions: Vec<(TxHash, Vec<u8>)>,
    pub outputs: Vec<(u64, OutputLocation)>,
}

impl BlockWrite {
    pub fn new(height: u64, hash: BlockHash, block_bytes: Vec<u8>) -> Self {
        Self {
            height,
            hash,
            block_bytes,
            ..Self::default()
        }
    }
}

pub trait BlockWriter {
    /// Apply `write` as one unit: on error none of it is visible.
    fn write_block(&self, write: &BlockWrite) -> Result<(), StoreError>;
}
