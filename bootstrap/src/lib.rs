//! Bootstrap files: a chunked binary dump of the main chain.
//!
//! A file starts with a magic number and a fixed-size header describing the
//! dump, followed by length-prefixed chunks. Each chunk holds the packages
//! of up to [`NUM_BLOCKS_PER_CHUNK`] consecutive blocks, every package being
//! a block record plus the records of the regular transactions it confirms.

pub mod error;
pub mod format;
pub mod import;
pub mod reader;
pub mod writer;

pub use error::BootstrapError;
pub use format::{
    BlockPackage, BlocksInfo, FileInfo, BOOTSTRAP_MAGIC, BUFFER_SIZE, HEADER_SIZE,
    MAX_CHUNK_SIZE, NUM_BLOCKS_PER_CHUNK,
};
pub use import::{import, ImportSummary};
pub use reader::{count_blocks, BootstrapReader};
pub use writer::{export, BootstrapWriter, ExportSummary};
