//! LMDB implementation of BlockStore.

use mindepth_store::{BlockStore, StoreError};
use mindepth_types::BlockHash;

use crate::{LmdbEnvironment, LmdbError};

impl BlockStore for LmdbEnvironment {
    fn put_block(
        &self,
        height: u64,
        hash: &BlockHash,
        block_bytes: &[u8],
    ) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put_block(height, hash, block_bytes)?;
        batch.commit()?;
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .blocks_db
            .get(&rtxn, &hash.as_bytes()[..])
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("block {hash}")))?;
        Ok(val.to_vec())
    }

    fn get_block_hash(&self, height: u64) -> Result<BlockHash, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .block_heights_db
            .get(&rtxn, &height.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("block at height {height}")))?;
        let bytes: [u8; 32] = val.try_into().map_err(|_| {
            StoreError::Corruption(format!("height index entry {height} is not a 32-byte hash"))
        })?;
        Ok(BlockHash::new(bytes))
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self
            .block_heights_db
            .len(&rtxn)
            .map_err(LmdbError::from)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 64 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    #[test]
    fn block_by_height_roundtrip() {
        let (_dir, env) = temp_env();
        let hash = BlockHash::new([7; 32]);
        env.put_block(0, &hash, b"genesis").unwrap();

        assert_eq!(env.block_count().unwrap(), 1);
        assert_eq!(env.get_block_hash(0).unwrap(), hash);
        assert_eq!(env.get_block_by_height(0).unwrap(), b"genesis");
    }

    #[test]
    fn missing_height_is_not_found() {
        let (_dir, env) = temp_env();
        let err = env.get_block_by_height(3).unwrap_err();
        assert!(err.is_not_found());
    }
}
