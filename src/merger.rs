//! Binary heap merger.

use std::cmp::Ordering;
use std::error::Error;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use log;

use crate::chunk::ChunkReader;
use crate::heap::MinHeap;
use crate::sort::SortError;

/// Binary heap merger implementation.
/// Merges multiple sorted inputs into a single sorted output.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number of items,
/// *n* is the number of chunks (inputs).
///
/// Items comparing equal are emitted in chunk order.
pub struct BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering,
    C: IntoIterator<Item = Result<T, E>>,
{
    items: MinHeap<(T, usize)>,
    chunks: Vec<C::IntoIter>,
    compare: F,
    initiated: bool,
}

impl<T, E, F, C> BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering,
    C: IntoIterator<Item = Result<T, E>>,
{
    /// Creates an instance of a binary heap merger using chunks as inputs.
    /// Chunk items should be sorted in ascending order otherwise the result is undefined.
    ///
    /// # Arguments
    /// * `chunks` - Chunks to be merged in a single sorted one
    /// * `compare` - Function to be used to compare items
    pub fn new<I>(chunks: I, compare: F) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let chunks = Vec::from_iter(chunks.into_iter().map(|c| c.into_iter()));
        let items = MinHeap::with_capacity(chunks.len());

        return BinaryHeapMerger {
            chunks,
            items,
            compare,
            initiated: false,
        };
    }

    fn push(&mut self, item: T, idx: usize) {
        let compare = &self.compare;
        self.items
            .push_by((item, idx), |a, b| compare(&a.0, &b.0).then(a.1.cmp(&b.1)));
    }

    fn pop(&mut self) -> Option<(T, usize)> {
        let compare = &self.compare;
        self.items.pop_by(|a, b| compare(&a.0, &b.0).then(a.1.cmp(&b.1)))
    }
}

impl<T, E, F, C> Iterator for BinaryHeapMerger<T, E, F, C>
where
    E: Error,
    F: Fn(&T, &T) -> Ordering,
    C: IntoIterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    /// Returns the next item from the inputs in ascending order.
    fn next(&mut self) -> Option<Self::Item> {
        if !self.initiated {
            self.initiated = true;
            for idx in 0..self.chunks.len() {
                if let Some(item) = self.chunks[idx].next() {
                    match item {
                        Ok(item) => self.push(item, idx),
                        Err(err) => return Some(Err(err)),
                    }
                }
            }
        }

        let (result, idx) = self.pop()?;
        if let Some(item) = self.chunks[idx].next() {
            match item {
                Ok(item) => self.push(item, idx),
                Err(err) => return Some(Err(err)),
            }
        }

        return Some(Ok(result));
    }
}

/// Merges chunk files `chunk_1.txt` ..= `chunk_<chunk_count>.txt` from `dir` into `output`,
/// one line per item terminated by `\n`. Returns the number of lines written.
///
/// All chunk files are opened before anything is written, so a missing chunk leaves the output untouched.
/// A chunk that becomes unreadable later aborts the merge and the lines written so far stay in `output`.
pub fn merge_into<W, F>(
    dir: &Path,
    chunk_count: usize,
    output: &mut W,
    compare: F,
    rw_buf_size: Option<usize>,
) -> Result<u64, SortError>
where
    W: Write,
    F: Fn(&String, &String) -> Ordering,
{
    let mut chunks = Vec::with_capacity(chunk_count);
    for index in 1..=chunk_count {
        chunks.push(ChunkReader::open(dir, index, rw_buf_size).map_err(SortError::ChunkReadError)?);
    }
    log::debug!("merging {} chunks ...", chunks.len());

    let mut lines_written: u64 = 0;
    for line in BinaryHeapMerger::new(chunks, compare) {
        let line = line.map_err(SortError::ChunkReadError)?;
        output.write_all(line.as_bytes()).map_err(SortError::OutputError)?;
        output.write_all(b"\n").map_err(SortError::OutputError)?;
        lines_written += 1;
    }
    output.flush().map_err(SortError::OutputError)?;

    log::debug!("merge done (lines: {})", lines_written);

    return Ok(lines_written);
}

/// Merges chunk files from `dir` into a newly created file at `output_path`.
/// Returns the output path.
pub fn merge_chunks<F>(
    dir: &Path,
    chunk_count: usize,
    output_path: &Path,
    compare: F,
    rw_buf_size: Option<usize>,
) -> Result<PathBuf, SortError>
where
    F: Fn(&String, &String) -> Ordering,
{
    let file = fs::File::create(output_path).map_err(SortError::OutputError)?;
    let mut output = match rw_buf_size {
        Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
        None => io::BufWriter::new(file),
    };

    merge_into(dir, chunk_count, &mut output, compare, rw_buf_size)?;

    return Ok(output_path.to_path_buf());
}
