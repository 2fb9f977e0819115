//! Sequential bootstrap file reader.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use mindepth_types::record;

use crate::format::{BlockPackage, BlocksInfo, FileInfo};
use crate::{BootstrapError, BOOTSTRAP_MAGIC, HEADER_SIZE, MAX_CHUNK_SIZE};

/// Iterates the block packages of a bootstrap file in file order.
pub struct BootstrapReader {
    input: BufReader<File>,
    file_info: FileInfo,
    blocks_info: BlocksInfo,
    chunk: Vec<u8>,
    pos: usize,
    chunks_read: u64,
    failed: bool,
}

impl BootstrapReader {
    /// Open `path` and parse its header.
    pub fn open(path: &Path) -> Result<Self, BootstrapError> {
        let mut input = BufReader::new(File::open(path)?);

        let magic = read_u32(&mut input)?
            .ok_or_else(|| BootstrapError::Truncated("missing magic".into()))?;
        if magic != BOOTSTRAP_MAGIC {
            return Err(BootstrapError::BadMagic(magic));
        }

        let mut header = vec![0u8; HEADER_SIZE as usize];
        input.read_exact(&mut header).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => BootstrapError::Truncated("short header".into()),
            _ => e.into(),
        })?;
        let mut cursor = 0usize;
        let file_info: FileInfo = record::decode(take_framed(&header, &mut cursor)?)?;
        let blocks_info: BlocksInfo = record::decode(take_framed(&header, &mut cursor)?)?;
        if file_info.header_size != HEADER_SIZE {
            return Err(BootstrapError::Header(format!(
                "unsupported header size {}",
                file_info.header_size
            )));
        }

        tracing::debug!(
            major = file_info.major_version,
            minor = file_info.minor_version,
            block_first = blocks_info.block_first,
            block_last = blocks_info.block_last,
            "opened bootstrap file"
        );

        Ok(Self {
            input,
            file_info,
            blocks_info,
            chunk: Vec::new(),
            pos: 0,
            chunks_read: 0,
            failed: false,
        })
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    pub fn blocks_info(&self) -> &BlocksInfo {
        &self.blocks_info
    }

    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Load the next chunk. Returns `false` at a clean end of file.
    fn next_chunk(&mut self) -> Result<bool, BootstrapError> {
        let size = match read_u32(&mut self.input)? {
            Some(size) => size,
            None => return Ok(false),
        };
        if size > MAX_CHUNK_SIZE {
            return Err(BootstrapError::ChunkTooLarge {
                size,
                max: MAX_CHUNK_SIZE,
            });
        }
        self.chunk.resize(size as usize, 0);
        self.input
            .read_exact(&mut self.chunk)
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => {
                    BootstrapError::Truncated(format!("chunk {} is short", self.chunks_read))
                }
                _ => e.into(),
            })?;
        self.pos = 0;
        self.chunks_read += 1;
        Ok(true)
    }

    /// Raw bytes of the next package, crossing chunk boundaries as needed.
    fn next_frame(&mut self) -> Result<Option<&[u8]>, BootstrapError> {
        while self.pos >= self.chunk.len() {
            if !self.next_chunk()? {
                return Ok(None);
            }
        }
        take_framed(&self.chunk, &mut self.pos).map(Some)
    }

    fn next_package(&mut self) -> Result<Option<BlockPackage>, BootstrapError> {
        match self.next_frame()? {
            Some(bytes) => Ok(Some(record::decode(bytes)?)),
            None => Ok(None),
        }
    }
}

impl Iterator for BootstrapReader {
    type Item = Result<BlockPackage, BootstrapError>;

    /// Yields `None` after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_package().transpose();
        self.failed = matches!(item, Some(Err(_)));
        item
    }
}

/// Number of blocks stored in the file and the height of the first one.
///
/// Appending resumes at `block_first + count`.
pub fn count_blocks(path: &Path) -> Result<(u64, u64), BootstrapError> {
    let mut reader = BootstrapReader::open(path)?;
    let block_first = reader.blocks_info.block_first;
    let mut count = 0u64;
    while reader.next_frame()?.is_some() {
        count += 1;
    }
    tracing::debug!(count, block_first, chunks = reader.chunks_read, "counted bootstrap blocks");
    Ok((count, block_first))
}

fn read_u32(input: &mut impl Read) -> Result<Option<u32>, BootstrapError> {
    let mut buf = [0u8; 4];
    match input.read_exact(&mut buf) {
        Ok(()) => Ok(Some(u32::from_le_bytes(buf))),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Take one `u32 LE len` framed slice from `buf` at `*pos`.
fn take_framed<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], BootstrapError> {
    let len_end = *pos + 4;
    let len_bytes: [u8; 4] = buf
        .get(*pos..len_end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| BootstrapError::Truncated("missing length prefix".into()))?;
    let end = len_end + u32::from_le_bytes(len_bytes) as usize;
    let bytes = buf
        .get(len_end..end)
        .ok_or_else(|| BootstrapError::Truncated("framed record runs past its buffer".into()))?;
    *pos = end;
    Ok(bytes)
}
