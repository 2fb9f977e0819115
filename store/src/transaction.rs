use mindepth_types::TxHash;

use crate::StoreError;

/// Encoded transactions keyed by their hash.
pub trait TransactionStore {
    fn put_transaction(&self, hash: &TxHash, tx_bytes: &[u8]) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] for an unknown hash.
    fn get_transaction(&self, hash: &TxHash) -> Result<Vec<u8>, StoreError>;

    fn exists(&self, hash: &TxHash) -> Result<bool, StoreError>;
}
