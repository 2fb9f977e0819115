//! LMDB storage backend for the ledger.
//!
//! Implements the `mindepth-store` traits on [`LmdbEnvironment`] using the
//! `heed` LMDB bindings. Each logical store maps to one or more named LMDB
//! databases within a single environment.

pub mod block;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod output;
pub mod transaction;
pub mod write_batch;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use integrity::{check_integrity, IntegrityReport};
pub use write_batch::WriteBatch;
