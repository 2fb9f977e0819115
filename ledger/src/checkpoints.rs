//! Checkpoint registry: known-good (height → block hash) pairs.
//!
//! A block whose hash disagrees with a checkpoint at its height belongs to a
//! fork and is rejected. Checkpoints can be added programmatically or loaded
//! from a JSON hash file of the form
//! `{"hashlines": [{"height": 10, "hash": "<64 hex chars>"}]}`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use mindepth_types::BlockHash;

use crate::CheckpointError;

#[derive(Deserialize)]
struct HashLine {
    height: u64,
    hash: String,
}

#[derive(Deserialize)]
struct HashFile {
    hashlines: Vec<HashLine>,
}

/// Ordered map of checkpoint heights to expected block hashes.
#[derive(Clone, Debug, Default)]
pub struct Checkpoints {
    points: BTreeMap<u64, BlockHash>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a checkpoint from a hex-encoded hash. Re-adding the same pair is
    /// a no-op; a different hash at an existing height is a conflict.
    pub fn add_checkpoint(&mut self, height: u64, hash_hex: &str) -> Result<(), CheckpointError> {
        let hash: BlockHash = hash_hex
            .parse()
            .map_err(|e: mindepth_types::TypesError| CheckpointError::InvalidHash(e.to_string()))?;
        self.add(height, hash)
    }

    pub fn add(&mut self, height: u64, hash: BlockHash) -> Result<(), CheckpointError> {
        match self.points.get(&height) {
            Some(existing) if *existing != hash => Err(CheckpointError::Conflict { height }),
            _ => {
                self.points.insert(height, hash);
                Ok(())
            }
        }
    }

    /// True if `height` is at or below the highest checkpoint.
    pub fn is_in_checkpoint_zone(&self, height: u64) -> bool {
        self.points
            .last_key_value()
            .is_some_and(|(&max, _)| height <= max)
    }

    /// Check a block against the registry.
    ///
    /// Returns `Ok(true)` if `height` is a checkpoint and the hash matches,
    /// `Ok(false)` if there is no checkpoint at `height`.
    pub fn check_block(&self, height: u64, hash: &BlockHash) -> Result<bool, CheckpointError> {
        match self.points.get(&height) {
            None => Ok(false),
            Some(expected) if expected == hash => {
                tracing::info!(height, %hash, "checkpoint passed");
                Ok(true)
            }
            Some(expected) => {
                tracing::warn!(height, %expected, found = %hash, "checkpoint failed");
                Err(CheckpointError::Mismatch {
                    height,
                    expected: *expected,
                    found: *hash,
                })
            }
        }
    }

    /// Whether an alternative block at `block_height` may replace the main
    /// chain when the chain is `blockchain_height` long. Blocks at or below
    /// the last checkpoint the chain has passed are frozen; genesis never
    /// has an alternative.
    pub fn is_alternative_block_allowed(&self, blockchain_height: u64, block_height: u64) -> bool {
        if block_height == 0 {
            return false;
        }
        match self.points.range(..=blockchain_height).next_back() {
            None => true,
            Some((&checkpoint_height, _)) => checkpoint_height < block_height,
        }
    }

    /// Highest checkpoint height, or 0 with no checkpoints.
    pub fn max_height(&self) -> u64 {
        self.points.last_key_value().map_or(0, |(&h, _)| h)
    }

    pub fn points(&self) -> &BTreeMap<u64, BlockHash> {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fails if `other` pins a different hash at any height both registries
    /// know about.
    pub fn check_for_conflicts(&self, other: &Checkpoints) -> Result<(), CheckpointError> {
        for (height, hash) in other.points() {
            if self.points.get(height).is_some_and(|mine| mine != hash) {
                return Err(CheckpointError::Conflict { height: *height });
            }
        }
        Ok(())
    }

    /// Load checkpoints from a JSON hash file. Entries at or below the
    /// current highest checkpoint are ignored. A missing file is not an
    /// error. Returns the number of checkpoints added.
    pub fn load_from_json(&mut self, path: &Path) -> Result<usize, CheckpointError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "checkpoint file not found");
            return Ok(0);
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| CheckpointError::Io(e.to_string()))?;
        self.load_from_json_str(&content)
    }

    pub fn load_from_json_str(&mut self, content: &str) -> Result<usize, CheckpointError> {
        let file: HashFile =
            serde_json::from_str(content).map_err(|e| CheckpointError::Json(e.to_string()))?;

        let prev_max_height = self.max_height();
        let had_points = !self.is_empty();
        tracing::debug!(prev_max_height, "adding checkpoints from hash file");

        let mut added = 0;
        for line in file.hashlines {
            if had_points && line.height <= prev_max_height {
                tracing::debug!(height = line.height, "ignoring checkpoint below current max");
                continue;
            }
            self.add_checkpoint(line.height, &line.hash)?;
            added += 1;
        }
        Ok(added)
    }
}
