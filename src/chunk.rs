//! Chunk files stored in a scratch directory.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

/// Returns the path of the chunk with the provided 1-based index.
pub fn chunk_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("chunk_{}.txt", index))
}

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}

/// Writer of a single chunk file. Each line is terminated by `\n`.
pub struct ChunkWriter {
    index: usize,
    path: PathBuf,
    writer: io::BufWriter<fs::File>,
}

impl ChunkWriter {
    /// Creates (or truncates) the chunk file `chunk_<index>.txt` in `dir`.
    pub fn create(dir: &Path, index: usize, buf_size: Option<usize>) -> io::Result<Self> {
        let path = chunk_path(dir, index);
        let file = fs::File::create(&path).map_err(|err| with_path(err, &path))?;

        let writer = match buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        };

        return Ok(ChunkWriter { index, path, writer });
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;

        return Ok(());
    }

    /// Flushes buffered data and closes the chunk file.
    pub fn close(self) -> io::Result<()> {
        let path = self.path;
        self.writer.into_inner().map_err(|err| with_path(err.into_error(), &path))?;

        return Ok(());
    }
}

/// Sequential line cursor over a chunk file.
pub struct ChunkReader {
    index: usize,
    path: PathBuf,
    lines: io::Lines<io::BufReader<fs::File>>,
}

impl ChunkReader {
    /// Opens the chunk file `chunk_<index>.txt` in `dir` for reading.
    pub fn open(dir: &Path, index: usize, buf_size: Option<usize>) -> io::Result<Self> {
        let path = chunk_path(dir, index);
        let file = fs::File::open(&path).map_err(|err| with_path(err, &path))?;

        let reader = match buf_size {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, file),
            None => io::BufReader::new(file),
        };

        return Ok(ChunkReader {
            index,
            path,
            lines: reader.lines(),
        });
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Iterator for ChunkReader {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) => Some(Ok(line)),
            Err(err) => Some(Err(with_path(err, &self.path))),
        }
    }
}
