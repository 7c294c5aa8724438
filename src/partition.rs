//! Input partitioning into chunk files.

use std::io;
use std::path::Path;

use log;

use crate::chunk::ChunkWriter;
use crate::sort::SortError;

/// Partitioning result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSummary {
    /// Number of chunk files created.
    pub chunks: usize,
    /// Number of lines consumed from the input.
    pub lines_read: u64,
}

/// Splits the input line stream into chunk files `chunk_1.txt`, `chunk_2.txt`, ... in `dir`.
///
/// The input is divided into windows of `chunk_size` consecutive lines and every window opens a new chunk.
/// Only the first line of a window is written to its chunk, the remaining lines of the window are consumed
/// and dropped. With `chunk_size` equal to 1 every line gets its own chunk and nothing is lost.
///
/// Each chunk is closed before the next one is opened. On failure the chunks created so far are left in `dir`.
///
/// # Arguments
/// * `input` - Input line stream
/// * `dir` - Directory the chunk files are created in
/// * `chunk_size` - Window size in lines, must be positive
/// * `rw_buf_size` - Chunk file write buffer size
pub fn partition<I>(
    input: I,
    dir: &Path,
    chunk_size: usize,
    rw_buf_size: Option<usize>,
) -> Result<PartitionSummary, SortError>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    if chunk_size == 0 {
        return Err(SortError::InvalidChunkSize(chunk_size));
    }

    let mut chunk: Option<ChunkWriter> = None;
    let mut chunks: usize = 0;
    let mut lines_read: u64 = 0;

    for line in input.into_iter() {
        let line = line.map_err(SortError::InputError)?;

        if lines_read % chunk_size as u64 == 0 {
            if let Some(prev) = chunk.take() {
                prev.close().map_err(SortError::ChunkWriteError)?;
            }
            chunks += 1;

            let mut writer = ChunkWriter::create(dir, chunks, rw_buf_size).map_err(SortError::ChunkWriteError)?;
            writer.write_line(&line).map_err(SortError::ChunkWriteError)?;
            chunk = Some(writer);
        } else {
            log::trace!("line {} dropped (window of chunk {})", lines_read + 1, chunks);
        }
        lines_read += 1;
    }

    if let Some(last) = chunk.take() {
        last.close().map_err(SortError::ChunkWriteError)?;
    }

    log::debug!("partitioning done (lines: {}, chunks: {})", lines_read, chunks);

    return Ok(PartitionSummary { chunks, lines_read });
}
