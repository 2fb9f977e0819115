//! Block storage trait.

use crate::StoreError;
use mindepth_types::BlockHash;

/// Trait for block storage: encoded blocks keyed by hash, plus the
/// height → hash index of the main chain.
pub trait BlockStore {
    /// Store an encoded block and index it at `height`.
    fn put_block(&self, height: u64, hash: &BlockHash, block_bytes: &[u8])
        -> Result<(), StoreError>;

    /// Retrieve an encoded block by hash.
    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError>;

    /// Hash of the main-chain block at `height`.
    fn get_block_hash(&self, height: u64) -> Result<BlockHash, StoreError>;

    /// Retrieve the encoded main-chain block at `height`.
    fn get_block_by_height(&self, height: u64) -> Result<Vec<u8>, StoreError> {
        let hash = self.get_block_hash(height)?;
        self.get_block(&hash)
    }

    /// Number of blocks in the main chain (the next height to append).
    fn block_count(&self) -> Result<u64, StoreError>;
}
