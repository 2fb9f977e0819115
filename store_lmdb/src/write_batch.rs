//! Multi-table writes under one LMDB write transaction.
//!
//! Dropping a [`WriteBatch`] without [`commit`](WriteBatch::commit) aborts
//! the transaction, so nothing it staged becomes visible.

use heed::RwTxn;

use mindepth_store::{BlockWrite, BlockWriter, OutputLocation, StoreError};
use mindepth_types::{BlockHash, TxHash};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub(crate) fn output_key(amount: u64, index: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&amount.to_be_bytes());
    key[8..].copy_from_slice(&index.to_be_bytes());
    key
}

pub(crate) fn decode_count(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("output count has unexpected byte length".into()))?;
    Ok(u64::from_be_bytes(arr))
}

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, LmdbError> {
        let txn = env.env.write_txn()?;
        Ok(Self { txn, env })
    }

    /// Store an encoded block and point `height` at it.
    pub fn put_block(
        &mut self,
        height: u64,
        hash: &BlockHash,
        block_bytes: &[u8],
    ) -> Result<(), LmdbError> {
        self.env
            .blocks_db
            .put(&mut self.txn, &hash.as_bytes()[..], block_bytes)?;
        self.env
            .block_heights_db
            .put(&mut self.txn, &height.to_be_bytes(), &hash.as_bytes()[..])?;
        Ok(())
    }

    pub fn put_transaction(&mut self, hash: &TxHash, tx_bytes: &[u8]) -> Result<(), LmdbError> {
        self.env
            .transactions_db
            .put(&mut self.txn, &hash.as_bytes()[..], tx_bytes)?;
        Ok(())
    }

    /// Count of `amount` as seen by this batch, staged writes included.
    pub fn output_count(&self, amount: u64) -> Result<u64, LmdbError> {
        match self
            .env
            .output_counts_db
            .get(&self.txn, &amount.to_be_bytes())?
        {
            Some(bytes) => decode_count(bytes),
            None => Ok(0),
        }
    }

    /// Index `location` at `index`, raising the class count past it.
    pub fn put_output(
        &mut self,
        amount: u64,
        index: u64,
        location: &OutputLocation,
    ) -> Result<(), LmdbError> {
        let value =
            bincode::serialize(location).map_err(|e| LmdbError::Serialization(e.to_string()))?;
        self.env
            .outputs_db
            .put(&mut self.txn, &output_key(amount, index), &value)?;
        if index >= self.output_count(amount)? {
            self.env.output_counts_db.put(
                &mut self.txn,
                &amount.to_be_bytes(),
                &(index + 1).to_be_bytes(),
            )?;
        }
        Ok(())
    }

    /// Index `location` after every output of `amount` so far; returns its
    /// index.
    pub fn append_output(
        &mut self,
        amount: u64,
        location: &OutputLocation,
    ) -> Result<u64, LmdbError> {
        let index = self.output_count(amount)?;
        self.put_output(amount, index, location)?;
        Ok(index)
    }

    pub fn commit(self) -> Result<(), LmdbError> {
        self.txn.commit()?;
        Ok(())
    }
}

impl BlockWriter for LmdbEnvironment {
    fn write_block(&self, write: &BlockWrite) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        for (hash, bytes) in &write.transactions {
            batch.put_transaction(hash, bytes)?;
        }
        for (amount, location) in &write.outputs {
            batch.append_output(*amount, location)?;
        }
        batch.put_block(write.height, &write.hash, &write.block_bytes)?;
        batch.commit()?;
        Ok(())
    }
}
