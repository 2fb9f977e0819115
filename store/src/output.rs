//! Global output index.

use serde::{Deserialize, Serialize};

use crate::StoreError;
use mindepth_types::PublicKey;

/// Where an indexed output lives: the height of the block that created it
/// and its one-time key. The owning transaction is found by scanning that
/// block for the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocation {
    pub height: u64,
    pub public_key: PublicKey,
}

/// Trait for the per-amount output index. Outputs of one amount class are
/// numbered 0..N-1 in creation order.
pub trait OutputStore {
    /// Record the output at `index` within `amount`.
    fn put_output(&self, amount: u64, index: u64, location: &OutputLocation)
        -> Result<(), StoreError>;

    /// Look up the output at `index` within `amount`.
    fn get_output(&self, amount: u64, index: u64) -> Result<OutputLocation, StoreError>;

    /// Number of outputs indexed for `amount` (the next index to assign).
    fn output_count(&self, amount: u64) -> Result<u64, StoreError>;
}
