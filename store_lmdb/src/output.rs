//! LMDB implementation of OutputStore.
//!
//! Keys are big-endian so a cursor walks an amount class in index order.

use mindepth_store::{OutputLocation, OutputStore, StoreError};

use crate::write_batch::{decode_count, output_key};
use crate::{LmdbEnvironment, LmdbError};

impl OutputStore for LmdbEnvironment {
    fn put_output(
        &self,
        amount: u64,
        index: u64,
        location: &OutputLocation,
    ) -> Result<(), StoreError> {
        let mut batch = self.write_batch()?;
        batch.put_output(amount, index, location)?;
        batch.commit()?;
        Ok(())
    }

    fn get_output(&self, amount: u64, index: u64) -> Result<OutputLocation, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .outputs_db
            .get(&rtxn, &output_key(amount, index))
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("output {index} of amount {amount}")))?;
        let location =
            bincode::deserialize(val).map_err(|e| LmdbError::Serialization(e.to_string()))?;
        Ok(location)
    }

    fn output_count(&self, amount: u64) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = match self
            .output_counts_db
            .get(&rtxn, &amount.to_be_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_count(bytes)?,
            None => 0,
        };
        Ok(count)
    }
}
