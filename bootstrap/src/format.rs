//! On-disk layout.
//!
//! ```text
//! magic      u32 LE
//! header     HEADER_SIZE bytes:
//!              u32 LE len, bincode FileInfo
//!              u32 LE len, bincode BlocksInfo
//!              zero padding
//! chunk*     u32 LE len, then `len` bytes of
//!              (u32 LE len, bincode BlockPackage)*
//! ```

use serde::{Deserialize, Serialize};

use mindepth_types::{BlockRecord, TxRecord};

pub const BOOTSTRAP_MAGIC: u32 = 0x2872_1586;
pub const HEADER_SIZE: u32 = 1024;
pub const NUM_BLOCKS_PER_CHUNK: usize = 100;
/// Chunks above this size are written but logged.
pub const BUFFER_SIZE: usize = 1_000_000;
/// Chunks above this size are refused on read.
pub const MAX_CHUNK_SIZE: u32 = 64 * 1024 * 1024;

pub const FILE_MAJOR_VERSION: u32 = 1;
pub const FILE_MINOR_VERSION: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub major_version: u32,
    pub minor_version: u32,
    pub header_size: u32,
}

impl Default for FileInfo {
    fn default() -> Self {
        Self {
            major_version: FILE_MAJOR_VERSION,
            minor_version: FILE_MINOR_VERSION,
            header_size: HEADER_SIZE,
        }
    }
}

/// Height range the file was created for. Appends never rewrite it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksInfo {
    pub block_first: u64,
    pub block_last: u64,
    pub block_last_pos: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPackage {
    pub block: BlockRecord,
    pub txs: Vec<TxRecord>,
}
