//! `ext-line-sort` sorts text files that do not fit into memory line by line.
//!
//! External sorting is a class of sorting algorithms that can handle massive amounts of data. External sorting
//! is required when the data being sorted do not fit into the main memory (RAM) of a computer and instead must be
//! resided in slower external memory, usually a hard disk drive. Sorting is achieved in two passes. During the
//! first pass the input is split into chunk files, during the second pass the chunks are merged together.
//! For more information see [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! * **Partitioning:**
//!   the input line stream is read once and split into windows of `chunk_size` lines. Each window opens a new
//!   chunk file `chunk_<N>.txt` holding the first line of the window (see [`partition::partition`]).
//! * **Merging:**
//!   one cursor per chunk file feeds a binary min-heap, so each output line costs *O*(log(*n*)) comparisons
//!   for *n* chunks (see [`BinaryHeapMerger`]).
//! * **Locale-aware ordering:**
//!   lines are compared with Unicode collation rules, not by raw code points (see [`LocaleCollator`]).
//! * **Scoped temporary data:**
//!   every run creates its own scratch directory and removes it when the run finishes, successfully or not.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ext_line_sort::ExternalSorterBuilder;
//!
//! fn main() {
//!     let sorter = ExternalSorterBuilder::new()
//!         .with_chunk_size(1)
//!         .with_tmp_dir(Path::new("./"))
//!         .build()
//!         .unwrap();
//!
//!     sorter.sort_file(Path::new("input.txt"), Path::new("output.txt")).unwrap();
//! }
//! ```

pub mod chunk;
pub mod collate;
pub mod heap;
pub mod merger;
pub mod partition;
pub mod sort;

pub use chunk::{ChunkReader, ChunkWriter};
pub use collate::{CollatorError, LocaleCollator};
pub use heap::MinHeap;
pub use merger::{merge_chunks, merge_into, BinaryHeapMerger};
pub use partition::{partition, PartitionSummary};
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError, SortSummary};
