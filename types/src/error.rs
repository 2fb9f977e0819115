//! Error types shared across crates.

use thiserror::Error;

/// Errors from parsing or constructing fundamental types.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid hex identifier: {0}")]
    InvalidHex(String),

    #[error("invalid output offsets: {0}")]
    InvalidOffsets(String),
}

/// Errors from encoding, decoding or converting stored records.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record: {0}")]
    Decode(String),

    /// The record holds an input variant the domain model cannot express.
    #[error("unsupported input type: {0}")]
    UnsupportedInput(&'static str),

    #[error("malformed block-reward transaction: {0}")]
    MalformedReward(String),
}
