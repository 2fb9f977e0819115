//! LMDB implementation of TransactionStore.

use mindepth_store::{StoreError, TransactionStore};
use mindepth_types::TxHash;

use crate::{LmdbEnvironment, LmdbError};

impl TransactionStore for LmdbEnvironment {
    fn put_transaction(&self, hash: &TxHash, tx_bytes: &[u8]) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put_transaction(hash, tx_bytes)?;
        batch.commit()?;
        Ok(())
    }

    fn get_transaction(&self, hash: &TxHash) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .transactions_db
            .get(&rtxn, &hash.as_bytes()[..])
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("transaction {hash}")))?;
        Ok(val.to_vec())
    }

    fn exists(&self, hash: &TxHash) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .transactions_db
            .get(&rtxn, &hash.as_bytes()[..])
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }
}
