//! Fundamental types for the mindepth workspace.
//!
//! This crate defines the types shared by every other crate: block and
//! transaction hashes, one-time keys, the stored record layout, and the
//! domain types the tracer walks over. Records are what the store holds;
//! domain types are what the rest of the code reasons about.

pub mod block;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod offsets;
pub mod record;
pub mod transaction;

pub use block::Block;
pub use error::{CodecError, TypesError};
pub use hash::{blake2b_256, BlockHash, TxHash};
pub use keys::{KeyImage, PublicKey};
pub use network::NetworkId;
pub use record::{BlockRecord, InputRecord, OutputRecord, TxRecord};
pub use transaction::{Input, Output, Transaction};
