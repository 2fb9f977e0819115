use std::path::PathBuf;

use thiserror::Error;

use mindepth_ledger::LedgerError;
use mindepth_store::StoreError;
use mindepth_types::CodecError;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export directory path is a file: {0}")]
    NotADirectory(PathBuf),

    #[error("bad bootstrap magic {0:#010x}")]
    BadMagic(u32),

    #[error("invalid bootstrap header: {0}")]
    Header(String),

    #[error("chunk of {size} bytes exceeds the maximum of {max}")]
    ChunkTooLarge { size: u32, max: u32 },

    #[error("truncated bootstrap file: {0}")]
    Truncated(String),

    #[error("ledger has no blocks to export")]
    EmptyLedger,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
