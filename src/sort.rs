//! External sorter.

use log;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display};
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::collate::{CollatorError, LocaleCollator};
use crate::merger;
use crate::partition;

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Chunk size is not a positive number.
    InvalidChunkSize(usize),
    /// Line collator initialization error.
    CollatorError(CollatorError),
    /// Temporary directory creation error.
    TempDir(io::Error),
    /// Input data stream error.
    InputError(io::Error),
    /// Chunk file creation or writing error.
    ChunkWriteError(io::Error),
    /// Chunk file opening or reading error.
    ChunkReadError(io::Error),
    /// Output creation or writing error.
    OutputError(io::Error),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            SortError::InvalidChunkSize(_) => None,
            SortError::CollatorError(err) => Some(err),
            SortError::TempDir(err) => Some(err),
            SortError::InputError(err) => Some(err),
            SortError::ChunkWriteError(err) => Some(err),
            SortError::ChunkReadError(err) => Some(err),
            SortError::OutputError(err) => Some(err),
        }
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::InvalidChunkSize(size) => write!(f, "chunk size must be positive, got {}", size),
            SortError::CollatorError(err) => write!(f, "collator initialization failed: {}", err),
            SortError::TempDir(err) => write!(f, "temporary directory not created: {}", err),
            SortError::InputError(err) => write!(f, "input data stream error: {}", err),
            SortError::ChunkWriteError(err) => write!(f, "chunk writing failed: {}", err),
            SortError::ChunkReadError(err) => write!(f, "chunk reading failed: {}", err),
            SortError::OutputError(err) => write!(f, "output writing failed: {}", err),
        }
    }
}

/// Sorting run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSummary {
    /// Number of chunk files the input was partitioned into.
    pub chunks: usize,
    /// Number of lines consumed from the input.
    pub lines_read: u64,
    /// Number of lines written to the output.
    pub lines_written: u64,
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Clone, Debug)]
pub struct ExternalSorterBuilder {
    /// Partition window size in lines.
    chunk_size: usize,
    /// Directory the per-run scratch directory is created in.
    tmp_dir: Option<Box<Path>>,
    /// Chunk file read/write buffer size.
    rw_buf_size: Option<usize>,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(self.chunk_size, self.tmp_dir.as_deref(), self.rw_buf_size)
    }

    /// Sets partition window size in lines.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> ExternalSorterBuilder {
        self.chunk_size = chunk_size;
        return self;
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        return self;
    }

    /// Sets chunk read/write buffer size.
    pub fn with_rw_buf_size(mut self, buf_size: usize) -> ExternalSorterBuilder {
        self.rw_buf_size = Some(buf_size);
        return self;
    }
}

impl Default for ExternalSorterBuilder {
    fn default() -> Self {
        ExternalSorterBuilder {
            chunk_size: 1,
            tmp_dir: None,
            rw_buf_size: None,
        }
    }
}

/// External sorter.
pub struct ExternalSorter {
    /// Partition window size in lines.
    chunk_size: usize,
    /// Directory the per-run scratch directory is created in.
    tmp_path: Option<Box<Path>>,
    /// Chunk file read/write buffer size.
    rw_buf_size: Option<usize>,
    /// Line comparator.
    collator: LocaleCollator,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `chunk_size` - Partition window size in lines. Must be positive.
    /// * `tmp_path` - Directory to be used to store temporary data. If paramater is [`None`] default OS temporary
    ///   directory will be used. Every sorting run creates its own scratch directory inside it and removes it
    ///   when the run finishes.
    /// * `rw_buf_size` - Chunks file read/write buffer size.
    pub fn new(chunk_size: usize, tmp_path: Option<&Path>, rw_buf_size: Option<usize>) -> Result<Self, SortError> {
        if chunk_size == 0 {
            return Err(SortError::InvalidChunkSize(chunk_size));
        }
        log::info!("initializing sorter (chunk size: {})", chunk_size);

        return Ok(ExternalSorter {
            chunk_size,
            rw_buf_size,
            tmp_path: tmp_path.map(Into::into),
            collator: LocaleCollator::new().map_err(SortError::CollatorError)?,
        });
    }

    fn init_tmp_directory(&self) -> Result<tempfile::TempDir, SortError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ext-line-sort-");

        let tmp_dir = if let Some(tmp_path) = &self.tmp_path {
            builder.tempdir_in(tmp_path)
        } else {
            builder.tempdir()
        }
        .map_err(SortError::TempDir)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        return Ok(tmp_dir);
    }

    fn release_tmp_directory(tmp_dir: tempfile::TempDir) {
        let path = tmp_dir.path().to_path_buf();
        if let Err(err) = tmp_dir.close() {
            log::warn!("temporary directory {} not removed: {}", path.display(), err);
        }
    }

    /// Sorts lines of the input file and saves the result to the output file.
    /// Returns the output file path.
    ///
    /// The input is opened before any temporary data is created. The output file is created once the input
    /// has been partitioned; if merging fails the lines already written are left in it.
    ///
    /// # Arguments
    /// * `input` - Path of the file to be sorted
    /// * `output` - Path of the result file
    pub fn sort_file(&self, input: &Path, output: &Path) -> Result<PathBuf, SortError> {
        let input_file = fs::File::open(input).map_err(SortError::InputError)?;
        let input_stream = match self.rw_buf_size {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, input_file),
            None => io::BufReader::new(input_file),
        };

        let tmp_dir = self.init_tmp_directory()?;
        let result = partition::partition(input_stream.lines(), tmp_dir.path(), self.chunk_size, self.rw_buf_size)
            .and_then(|summary| {
                merger::merge_chunks(
                    tmp_dir.path(),
                    summary.chunks,
                    output,
                    |a, b| self.collator.compare(a, b),
                    self.rw_buf_size,
                )
            });
        Self::release_tmp_directory(tmp_dir);

        return result;
    }

    /// Sorts lines from the input stream and writes them to the output, one per line terminated by `\n`.
    ///
    /// # Arguments
    /// * `input` - Input line stream
    /// * `output` - Sorted lines sink
    pub fn sort<I, W>(&self, input: I, mut output: W) -> Result<SortSummary, SortError>
    where
        I: IntoIterator<Item = io::Result<String>>,
        W: Write,
    {
        let tmp_dir = self.init_tmp_directory()?;
        let result = partition::partition(input, tmp_dir.path(), self.chunk_size, self.rw_buf_size).and_then(
            |summary| {
                let lines_written = merger::merge_into(
                    tmp_dir.path(),
                    summary.chunks,
                    &mut output,
                    |a, b| self.collator.compare(a, b),
                    self.rw_buf_size,
                )?;

                Ok(SortSummary {
                    chunks: summary.chunks,
                    lines_read: summary.lines_read,
                    lines_written,
                })
            },
        );
        Self::release_tmp_directory(tmp_dir);

        return result;
    }
}

impl Debug for ExternalSorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalSorter")
            .field("chunk_size", &self.chunk_size)
            .field("tmp_path", &self.tmp_path)
            .field("rw_buf_size", &self.rw_buf_size)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::fs;
    use std::io::{self, ErrorKind};
    use std::path::Path;

    use rand::seq::SliceRandom;
    use rand::Rng;
    use rstest::*;

    use super::{ExternalSorter, ExternalSorterBuilder, SortError, SortSummary};
    use crate::collate::LocaleCollator;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn build_sorter(chunk_size: usize, tmp_path: &Path) -> ExternalSorter {
        ExternalSorterBuilder::new()
            .with_chunk_size(chunk_size)
            .with_tmp_dir(tmp_path)
            .build()
            .unwrap()
    }

    fn lines(items: &[&str]) -> Vec<io::Result<String>> {
        items.iter().map(|item| Ok(item.to_string())).collect()
    }

    fn sort_lines(sorter: &ExternalSorter, input: &[&str]) -> (SortSummary, Vec<String>) {
        let mut output = Vec::new();
        let summary = sorter.sort(lines(input), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        (summary, output.lines().map(String::from).collect())
    }

    fn counts<'a>(items: impl IntoIterator<Item = &'a str>) -> HashMap<&'a str, usize> {
        let mut counts = HashMap::new();
        for item in items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }

    fn scratch_entries(dir: &tempfile::TempDir) -> usize {
        fs::read_dir(dir.path()).unwrap().count()
    }

    #[rstest]
    fn test_sort_scenario(tmp_dir: tempfile::TempDir) {
        let sorter = build_sorter(1, tmp_dir.path());

        let (summary, actual) = sort_lines(&sorter, &["banana", "apple", "cherry", "date"]);

        assert_eq!(
            summary,
            SortSummary {
                chunks: 4,
                lines_read: 4,
                lines_written: 4
            }
        );
        assert_eq!(actual, vec!["apple", "banana", "cherry", "date"]);
    }

    #[rstest]
    fn test_sort_locale_aware(tmp_dir: tempfile::TempDir) {
        let sorter = build_sorter(1, tmp_dir.path());

        let (_, actual) = sort_lines(&sorter, &["Äpfel", "apple", "Zebra"]);

        assert_eq!(actual, vec!["Äpfel", "apple", "Zebra"]);
    }

    #[rstest]
    fn test_sort_random(tmp_dir: tempfile::TempDir) {
        let mut rng = rand::thread_rng();
        let alphabet: Vec<char> = "aAbBcCéÉzZ -".chars().collect();
        let input: Vec<String> = (0..200)
            .map(|_| {
                let len = rng.gen_range(0..6);
                (0..len).map(|_| *alphabet.choose(&mut rng).unwrap()).collect()
            })
            .collect();
        let input_refs: Vec<&str> = input.iter().map(String::as_str).collect();

        let sorter = build_sorter(1, tmp_dir.path());
        let (summary, actual) = sort_lines(&sorter, &input_refs);

        assert_eq!(summary.lines_written, 200);
        assert_eq!(counts(actual.iter().map(String::as_str)), counts(input_refs.iter().copied()));

        let collator = LocaleCollator::new().unwrap();
        assert!(actual.windows(2).all(|pair| collator.compare(&pair[0], &pair[1]).is_le()));
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    fn test_sort_windowing(tmp_dir: tempfile::TempDir, #[case] chunk_size: usize) {
        let mut input = Vec::from_iter((0..20).map(|n| format!("line {:02}", n)));
        input.shuffle(&mut rand::thread_rng());
        let input_refs: Vec<&str> = input.iter().map(String::as_str).collect();

        let sorter = build_sorter(chunk_size, tmp_dir.path());
        let (summary, actual) = sort_lines(&sorter, &input_refs);

        let mut expected = Vec::from_iter(input.iter().step_by(chunk_size).cloned());
        expected.sort();

        assert_eq!(summary.chunks, (20 + chunk_size - 1) / chunk_size);
        assert_eq!(summary.lines_read, 20);
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn test_sort_file_idempotent(tmp_dir: tempfile::TempDir) {
        let input_path = tmp_dir.path().join("input.txt");
        let output_path = tmp_dir.path().join("output.txt");
        let content = "apple\nBanana\ncherry\nDate\nÉclair\nzebra\n";
        fs::write(&input_path, content).unwrap();

        let scratch = tempfile::tempdir().unwrap();
        let sorter = build_sorter(1, scratch.path());
        let result = sorter.sort_file(&input_path, &output_path).unwrap();

        assert_eq!(result, output_path);
        assert_eq!(fs::read_to_string(&output_path).unwrap(), content);
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[rstest]
    fn test_sort_file_crlf_input(tmp_dir: tempfile::TempDir) {
        let input_path = tmp_dir.path().join("input.txt");
        let output_path = tmp_dir.path().join("output.txt");
        fs::write(&input_path, "banana\r\napple\r\ncherry").unwrap();

        let scratch = tempfile::tempdir().unwrap();
        build_sorter(1, scratch.path()).sort_file(&input_path, &output_path).unwrap();

        assert_eq!(fs::read_to_string(&output_path).unwrap(), "apple\nbanana\ncherry\n");
    }

    #[rstest]
    fn test_sort_empty_input(tmp_dir: tempfile::TempDir) {
        let input_path = tmp_dir.path().join("input.txt");
        let output_path = tmp_dir.path().join("output.txt");
        fs::write(&input_path, "").unwrap();

        let scratch = tempfile::tempdir().unwrap();
        let sorter = build_sorter(1, scratch.path());
        sorter.sort_file(&input_path, &output_path).unwrap();

        assert_eq!(fs::read_to_string(&output_path).unwrap(), "");
        assert_eq!(scratch_entries(&scratch), 0);

        let mut output = Vec::new();
        let summary = sorter.sort(lines(&[]), &mut output).unwrap();
        assert_eq!(
            summary,
            SortSummary {
                chunks: 0,
                lines_read: 0,
                lines_written: 0
            }
        );
        assert!(output.is_empty());
    }

    #[rstest]
    fn test_sort_missing_input(tmp_dir: tempfile::TempDir) {
        let scratch = tempfile::tempdir().unwrap();
        let sorter = build_sorter(1, scratch.path());
        let output_path = tmp_dir.path().join("output.txt");

        let result = sorter.sort_file(&tmp_dir.path().join("missing.txt"), &output_path);

        match result {
            Err(SortError::InputError(err)) => assert_eq!(err.kind(), ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!output_path.exists());
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[rstest]
    fn test_scratch_released_on_partition_failure(tmp_dir: tempfile::TempDir) {
        let sorter = build_sorter(1, tmp_dir.path());
        let input = vec![
            Ok("b".to_string()),
            Ok("a".to_string()),
            Err(io::Error::new(ErrorKind::Other, "read failure")),
        ];

        let mut output = Vec::new();
        let result = sorter.sort(input, &mut output);

        assert!(matches!(result, Err(SortError::InputError(_))));
        assert!(output.is_empty());
        assert_eq!(scratch_entries(&tmp_dir), 0);
    }

    #[rstest]
    fn test_scratch_released_on_merge_failure(tmp_dir: tempfile::TempDir) {
        let input_path = tmp_dir.path().join("input.txt");
        fs::write(&input_path, "b\na\n").unwrap();
        // a directory cannot be opened as the output file
        let output_path = tmp_dir.path().join("output");
        fs::create_dir(&output_path).unwrap();

        let scratch = tempfile::tempdir().unwrap();
        let sorter = build_sorter(1, scratch.path());
        let result = sorter.sort_file(&input_path, &output_path);

        assert!(matches!(result, Err(SortError::OutputError(_))));
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[rstest]
    fn test_scratch_dir_unavailable(tmp_dir: tempfile::TempDir) {
        let sorter = build_sorter(1, &tmp_dir.path().join("missing"));

        let result = sorter.sort(lines(&["a"]), Vec::new());

        assert!(matches!(result, Err(SortError::TempDir(_))));
    }

    #[test]
    fn test_zero_chunk_size() {
        let result = ExternalSorterBuilder::new().with_chunk_size(0).build();

        assert!(matches!(result, Err(SortError::InvalidChunkSize(0))));
    }

    #[test]
    fn test_error_display() {
        let err = SortError::ChunkReadError(io::Error::new(ErrorKind::NotFound, "chunk_3.txt: not found"));

        assert_eq!(err.to_string(), "chunk reading failed: chunk_3.txt: not found");
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&SortError::InvalidChunkSize(0)).is_none());
    }
}
