//! Bootstrap file writer and chain export.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use mindepth_store::LedgerStore;
use mindepth_types::record::{self, BlockRecord, TxRecord};

use crate::format::{BlockPackage, BlocksInfo, FileInfo};
use crate::reader::count_blocks;
use crate::{BootstrapError, BOOTSTRAP_MAGIC, BUFFER_SIZE, HEADER_SIZE, NUM_BLOCKS_PER_CHUNK};

/// Appends block packages to a bootstrap file, one chunk per
/// [`NUM_BLOCKS_PER_CHUNK`] packages.
pub struct BootstrapWriter {
    output: BufWriter<File>,
    buffer: Vec<u8>,
    buffered: usize,
    next_height: u64,
    max_chunk: usize,
    written: u64,
}

impl BootstrapWriter {
    /// Create `path` with a header for `start..=stop`, or reopen an existing
    /// file for appending after its last block.
    pub fn open(path: &Path, start: u64, stop: u64) -> Result<Self, BootstrapError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if dir.exists() && !dir.is_dir() {
                return Err(BootstrapError::NotADirectory(dir.to_path_buf()));
            }
            std::fs::create_dir_all(dir)?;
        }

        let (output, next_height) = if path.exists() {
            let (count, block_first) = count_blocks(path)?;
            tracing::debug!(
                height = (block_first + count).saturating_sub(1),
                "appending to existing bootstrap file"
            );
            let file = OpenOptions::new().append(true).open(path)?;
            (BufWriter::new(file), block_first + count)
        } else {
            tracing::debug!(path = %path.display(), "creating bootstrap file");
            let mut output = BufWriter::new(File::create(path)?);
            write_header(&mut output, start, stop)?;
            (output, start)
        };

        Ok(Self {
            output,
            buffer: Vec::new(),
            buffered: 0,
            next_height,
            max_chunk: 0,
            written: 0,
        })
    }

    /// Height of the next block this file expects.
    pub fn next_height(&self) -> u64 {
        self.next_height
    }

    pub fn append(&mut self, package: &BlockPackage) -> Result<(), BootstrapError> {
        let bytes = record::encode(package)?;
        self.buffer
            .extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(&bytes);
        self.buffered += 1;
        self.next_height += 1;
        self.written += 1;
        if self.buffered == NUM_BLOCKS_PER_CHUNK {
            self.flush_chunk()?;
        }
        Ok(())
    }

    fn flush_chunk(&mut self) -> Result<(), BootstrapError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let size = self.buffer.len();
        if size > BUFFER_SIZE {
            tracing::warn!(size, "chunk size exceeds BUFFER_SIZE");
        }
        self.output.write_all(&(size as u32).to_le_bytes())?;
        self.output.write_all(&self.buffer)?;
        self.max_chunk = self.max_chunk.max(size);
        self.buffer.clear();
        self.buffered = 0;
        tracing::debug!(size, "flushed chunk");
        Ok(())
    }

    /// Flush the last partial chunk. Returns the number of blocks written
    /// through this writer.
    pub fn finish(mut self) -> Result<u64, BootstrapError> {
        self.flush_chunk()?;
        self.output.flush()?;
        tracing::info!(largest_chunk = self.max_chunk, "bootstrap file closed");
        Ok(self.written)
    }
}

fn write_header(output: &mut impl Write, start: u64, stop: u64) -> Result<(), BootstrapError> {
    let mut header = Vec::with_capacity(HEADER_SIZE as usize);
    for bytes in [
        record::encode(&FileInfo::default())?,
        record::encode(&BlocksInfo {
            block_first: start,
            block_last: stop,
            block_last_pos: 0,
        })?,
    ] {
        header.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        header.extend_from_slice(&bytes);
    }
    header.resize(HEADER_SIZE as usize, 0);

    output.write_all(&BOOTSTRAP_MAGIC.to_le_bytes())?;
    output.write_all(&header)?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub first: u64,
    pub last: u64,
    pub written: u64,
}

/// Export main-chain blocks `start..=stop` of `store` to `path`.
///
/// `stop == 0` or a stop past the tip means the tip. An existing file is
/// extended from its last block, so re-running an export resumes it.
pub fn export<S: LedgerStore>(
    store: &S,
    path: &Path,
    start: u64,
    stop: u64,
) -> Result<ExportSummary, BootstrapError> {
    let tip = match store.block_count()? {
        0 => return Err(BootstrapError::EmptyLedger),
        count => count - 1,
    };
    let block_stop = if stop > 0 && stop < tip {
        tracing::info!(stop, "using requested block height");
        stop
    } else {
        tip
    };

    let mut writer = BootstrapWriter::open(path, start, block_stop)?;
    if writer.next_height() < start {
        return Err(BootstrapError::Header(format!(
            "file ends before height {start}; appending would leave a gap"
        )));
    }
    let first = writer.next_height();
    tracing::info!(first, last = block_stop, "storing blocks raw data");

    for height in first..=block_stop {
        let block: BlockRecord = record::decode(&store.get_block_by_height(height)?)?;
        let mut txs = Vec::with_capacity(block.tx_hashes.len());
        for txid in &block.tx_hashes {
            let tx: TxRecord = record::decode(&store.get_transaction(txid)?)?;
            txs.push(tx);
        }
        writer.append(&BlockPackage { block, txs })?;
        if height % 100 == 0 {
            tracing::info!("block {height}/{block_stop}");
        }
    }

    let written = writer.finish()?;
    Ok(ExportSummary {
        first,
        last: block_stop,
        written,
    })
}
