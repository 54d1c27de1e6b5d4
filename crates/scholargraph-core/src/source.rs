//! Line-delimited JSON record source over an ordered list of files.
//!
//! Files are concatenated in the given order; `.gz` files are decompressed on
//! the fly. The source is a single-pass iterator: once exhausted (or after the
//! first error) it yields nothing more, and a new source must be built to
//! re-read the input.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use rayon::prelude::*;
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Buffer size for file readers (256KB)
const READ_BUF_SIZE: usize = 256 * 1024;

/// Initial capacity for per-line JSON read buffer (typical paper line: 1–5KB)
const LINE_BUF_CAPACITY: usize = 4096;

struct OpenFile {
    path: PathBuf,
    reader: Box<dyn BufRead + Send>,
    line_no: usize,
}

/// Open a JSONL file, transparently gunzipping `*.gz`.
fn open_lines(path: &Path) -> Result<Box<dyn BufRead + Send>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    Ok(if is_gzip {
        Box::new(BufReader::with_capacity(
            READ_BUF_SIZE,
            GzDecoder::new(file),
        ))
    } else {
        Box::new(BufReader::with_capacity(READ_BUF_SIZE, file))
    })
}

fn decode<T: DeserializeOwned>(path: &Path, line: usize, text: &str) -> Result<T, SourceError> {
    serde_json::from_str(text).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        line,
        source,
    })
}

/// Lazy, finite, single-pass sequence of decoded records.
///
/// With [`parallel_decode`](Self::parallel_decode) enabled, lines are read in
/// chunks and decoded on the rayon pool; records are still yielded in input
/// order and the first malformed line (in input order) is the one reported.
pub struct RecordSource<T> {
    paths: VecDeque<PathBuf>,
    current: Option<OpenFile>,
    pending: VecDeque<Result<T, SourceError>>,
    chunk_lines: usize,
    lines_read: usize,
    done: bool,
    buf: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RecordSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSource")
            .field("remaining_files", &self.paths.len())
            .field("lines_read", &self.lines_read)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned + Send> RecordSource<T> {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            current: None,
            pending: VecDeque::new(),
            chunk_lines: 0,
            lines_read: 0,
            done: false,
            buf: String::with_capacity(LINE_BUF_CAPACITY),
            _record: PhantomData,
        }
    }

    /// Decode `chunk_lines` lines at a time on the rayon pool (0 or 1 = sequential).
    pub fn parallel_decode(mut self, chunk_lines: usize) -> Self {
        self.chunk_lines = chunk_lines;
        self
    }

    /// Non-blank lines consumed so far, across all files
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Path of the file currently being read, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    /// Next non-blank line as `(path, line_no, text)`, advancing across files.
    fn next_line(&mut self) -> Option<Result<(PathBuf, usize, String), SourceError>> {
        loop {
            if self.current.is_none() {
                let path = self.paths.pop_front()?;
                log::debug!("reading {}", path.display());
                match open_lines(&path) {
                    Ok(reader) => {
                        self.current = Some(OpenFile {
                            path,
                            reader,
                            line_no: 0,
                        })
                    }
                    Err(e) => return Some(Err(e)),
                }
            }

            let file = self.current.as_mut()?;
            self.buf.clear();
            match file.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.current = None;
                }
                Ok(_) => {
                    file.line_no += 1;
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    self.lines_read += 1;
                    return Some(Ok((file.path.clone(), file.line_no, self.buf.clone())));
                }
                Err(source) => {
                    return Some(Err(SourceError::Read {
                        path: file.path.clone(),
                        line: file.line_no + 1,
                        source,
                    }));
                }
            }
        }
    }

    fn fill_chunk(&mut self) {
        let mut lines = Vec::with_capacity(self.chunk_lines);
        let mut read_error = None;
        while lines.len() < self.chunk_lines {
            match self.next_line() {
                Some(Ok(line)) => lines.push(line),
                Some(Err(e)) => {
                    read_error = Some(e);
                    break;
                }
                None => break,
            }
        }

        let decoded: Vec<Result<T, SourceError>> = lines
            .par_iter()
            .map(|(path, line_no, text)| decode(path, *line_no, text))
            .collect();
        self.pending.extend(decoded);
        if let Some(e) = read_error {
            self.pending.push_back(Err(e));
        }
    }
}

impl<T: DeserializeOwned + Send> Iterator for RecordSource<T> {
    type Item = Result<T, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.chunk_lines > 1 && self.pending.is_empty() {
            self.fill_chunk();
        }

        let item = if self.chunk_lines > 1 {
            self.pending.pop_front()
        } else {
            self.next_line().map(|line| {
                line.and_then(|(path, line_no, text)| decode(&path, line_no, &text))
            })
        };

        match item {
            Some(Ok(record)) => Some(Ok(record)),
            Some(Err(e)) => {
                self.done = true;
                self.pending.clear();
                self.current = None;
                Some(Err(e))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<T: DeserializeOwned + Send> std::iter::FusedIterator for RecordSource<T> {}
