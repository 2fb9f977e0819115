//! Stored record layout.
//!
//! Records are the exact shape written to the store and to bootstrap files,
//! encoded with bincode. They are deliberately wider than the domain types:
//! the input record still knows the legacy script-based variants so that a
//! ledger written by an older protocol version decodes cleanly and can be
//! rejected with a precise error instead of a generic decode failure.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{BlockHash, CodecError, KeyImage, PublicKey, TxHash};

/// Encode a record with bincode.
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(record).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a record with bincode.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// An input as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRecord {
    /// Block-reward input; mints new outputs at `height`.
    Gen { height: u64 },
    /// Legacy script input spending a single previous output.
    ToScript {
        prev: TxHash,
        prevout: u64,
        sigset: Vec<u8>,
    },
    /// Legacy script-hash input.
    ToScriptHash {
        prev: TxHash,
        prevout: u64,
        script: Vec<u8>,
        sigset: Vec<u8>,
    },
    /// Input referencing a ring of outputs within one amount class.
    ToKey {
        amount: u64,
        key_offsets: Vec<u64>,
        key_image: KeyImage,
    },
}

impl InputRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gen { .. } => "gen",
            Self::ToScript { .. } => "to_script",
            Self::ToScriptHash { .. } => "to_scripthash",
            Self::ToKey { .. } => "to_key",
        }
    }
}

/// An output as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub amount: u64,
    pub key: PublicKey,
}

/// A transaction as stored. Its hash is the Blake2b-256 of this encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub version: u8,
    pub unlock_time: u64,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
    pub extra: Vec<u8>,
}

/// A block as stored. Regular transactions are referenced by hash and
/// stored separately; the block-reward transaction is embedded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub prev_hash: BlockHash,
    pub nonce: u32,
    pub reward_tx: TxRecord,
    pub tx_hashes: Vec<TxHash>,
}
