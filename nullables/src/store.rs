//! In-memory ledger storage for tests, safe to share across threads.

use mindepth_store::{
    BlockStore, BlockWrite, BlockWriter, MetaStore, OutputLocation, OutputStore, StoreError,
    TransactionStore,
};
use mindepth_types::{BlockHash, TxHash};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory block + transaction + output store for testing.
pub struct NullStore {
    blocks: Mutex<HashMap<BlockHash, Vec<u8>>>,
    heights: Mutex<BTreeMap<u64, BlockHash>>,
    transactions: Mutex<HashMap<TxHash, Vec<u8>>>,
    outputs: Mutex<HashMap<(u64, u64), OutputLocation>>,
    output_counts: Mutex<HashMap<u64, u64>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
    fail_block_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            blocks: Mutex::new(HashMap::new()),
            heights: Mutex::new(BTreeMap::new()),
            transactions: Mutex::new(HashMap::new()),
            outputs: Mutex::new(HashMap::new()),
            output_counts: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
            fail_block_writes: AtomicBool::new(false),
        }
    }

    /// Remove a transaction, leaving every reference to it dangling.
    pub fn remove_transaction(&self, hash: &TxHash) {
        self.transactions.lock().unwrap().remove(hash);
    }

    /// Overwrite the stored bytes of a block without touching the height index.
    pub fn corrupt_block(&self, hash: &BlockHash, bytes: &[u8]) {
        self.blocks.lock().unwrap().insert(*hash, bytes.to_vec());
    }

    /// Make every following [`BlockWriter::write_block`] fail at its final
    /// step, after the transactions and outputs were staged.
    pub fn fail_block_writes(&self, fail: bool) {
        self.fail_block_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.lock().unwrap().len()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for NullStore {
    fn put_block(
        &self,
        height: u64,
        hash: &BlockHash,
        block_bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.blocks
            .lock()
            .unwrap()
            .insert(*hash, block_bytes.to_vec());
        self.heights.lock().unwrap().insert(height, *hash);
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Vec<u8>, StoreError> {
        self.blocks
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("block {hash}")))
    }

    fn get_block_hash(&self, height: u64) -> Result<BlockHash, StoreError> {
        self.heights
            .lock()
            .unwrap()
            .get(&height)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("block at height {height}")))
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.heights.lock().unwrap().len() as u64)
    }
}

impl TransactionStore for NullStore {
    fn put_transaction(&self, hash: &TxHash, tx_bytes: &[u8]) -> Result<(), StoreError> {
        self.transactions
            .lock()
            .unwrap()
            .insert(*hash, tx_bytes.to_vec());
        Ok(())
    }

    fn get_transaction(&self, hash: &TxHash) -> Result<Vec<u8>, StoreError> {
        self.transactions
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {hash}")))
    }

    fn exists(&self, hash: &TxHash) -> Result<bool, StoreError> {
        Ok(self.transactions.lock().unwrap().contains_key(hash))
    }
}

impl OutputStore for NullStore {
    fn put_output(
        &self,
        amount: u64,
        index: u64,
        location: &OutputLocation,
    ) -> Result<(), StoreError> {
        self.outputs
            .lock()
            .unwrap()
            .insert((amount, index), *location);
        let mut counts = self.output_counts.lock().unwrap();
        let count = counts.entry(amount).or_insert(0);
        if index >= *count {
            *count = index + 1;
        }
        Ok(())
    }

    fn get_output(&self, amount: u64, index: u64) -> Result<OutputLocation, StoreError> {
        self.outputs
            .lock()
            .unwrap()
            .get(&(amount, index))
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("output {index} of amount {amount}")))
    }

    fn output_count(&self, amount: u64) -> Result<u64, StoreError> {
        Ok(self
            .output_counts
            .lock()
            .unwrap()
            .get(&amount)
            .copied()
            .unwrap_or(0))
    }
}

impl BlockWriter for NullStore {
    fn write_block(&self, write: &BlockWrite) -> Result<(), StoreError> {
        let mut blocks = self.blocks.lock().unwrap();
        let mut heights = self.heights.lock().unwrap();
        let mut transactions = self.transactions.lock().unwrap();
        let mut outputs = self.outputs.lock().unwrap();
        let mut counts = self.output_counts.lock().unwrap();

        let mut staged_counts: HashMap<u64, u64> = HashMap::new();
        let mut staged_outputs = Vec::with_capacity(write.outputs.len());
        for (amount, location) in &write.outputs {
            let next = staged_counts
                .entry(*amount)
                .or_insert_with(|| counts.get(amount).copied().unwrap_or(0));
            staged_outputs.push(((*amount, *next), *location));
            *next += 1;
        }

        if self.fail_block_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!(
                "injected failure writing block {}",
                write.height
            )));
        }

        for (hash, bytes) in &write.transactions {
            transactions.insert(*hash, bytes.clone());
        }
        outputs.extend(staged_outputs);
        counts.extend(staged_counts);
        blocks.insert(write.hash, write.block_bytes.clone());
        heights.insert(write.height, write.hash);
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.meta
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("meta key '{}'", key)))
    }
}
