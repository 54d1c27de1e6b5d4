//! Batched CSV sink — rolls over to a new numbered file every `batch_size` rows

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SinkError;

/// Placeholder replaced by the 1-based batch number in sink templates
pub const BATCH_PLACEHOLDER: &str = "{batch}";

/// Write buffer per open batch file (256KB)
const WRITE_BUF_SIZE: usize = 256 * 1024;

type CsvWriter = csv::Writer<BufWriter<File>>;

/// Sequenced CSV writer bound to a filename template.
///
/// Every physical file starts with the header row. Rollover happens before
/// writing the row that would exceed `batch_size`, so every file except the
/// last holds exactly `batch_size` data rows. The open file is flushed on
/// [`finish`](Self::finish) and, best effort, on drop.
pub struct BatchedSink {
    template: String,
    header: &'static [&'static str],
    batch_size: usize,
    batch: usize,
    rows_in_batch: usize,
    row_count: usize,
    writer: Option<CsvWriter>,
    files: Vec<PathBuf>,
}

impl std::fmt::Debug for BatchedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchedSink")
            .field("template", &self.template)
            .field("batch", &self.batch)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

/// What a sink wrote, returned by [`BatchedSink::finish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

impl BatchedSink {
    /// Validate the template and open batch file 1 (header written immediately).
    pub fn new(
        template: impl Into<String>,
        header: &'static [&'static str],
        batch_size: usize,
    ) -> Result<Self, SinkError> {
        let template = template.into();
        if template.matches(BATCH_PLACEHOLDER).count() != 1 {
            return Err(SinkError::MissingPlaceholder(template));
        }
        if batch_size == 0 {
            return Err(SinkError::ZeroBatchSize);
        }

        let mut sink = Self {
            template,
            header,
            batch_size,
            batch: 1,
            rows_in_batch: 0,
            row_count: 0,
            writer: None,
            files: Vec::new(),
        };
        sink.open_batch()?;
        Ok(sink)
    }

    /// Path of batch `n` for this sink's template
    pub fn batch_path(&self, n: usize) -> PathBuf {
        PathBuf::from(self.template.replace(BATCH_PLACEHOLDER, &n.to_string()))
    }

    fn open_batch(&mut self) -> Result<(), SinkError> {
        let path = self.batch_path(self.batch);
        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::with_capacity(WRITE_BUF_SIZE, file));
        writer.write_record(self.header)?;
        log::debug!("opened batch file {}", path.display());
        self.files.push(path);
        self.writer = Some(writer);
        self.rows_in_batch = 0;
        Ok(())
    }

    fn close_batch(&mut self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Append one row, rolling over first if the current file is full.
    pub fn write<R: Serialize>(&mut self, row: &R) -> Result<(), SinkError> {
        if self.rows_in_batch >= self.batch_size {
            self.close_batch()?;
            self.batch += 1;
            self.open_batch()?;
        }
        let writer = self.writer.as_mut().ok_or_else(|| {
            SinkError::Io(std::io::Error::other("write on a closed batch sink"))
        })?;
        writer.serialize(row)?;
        self.rows_in_batch += 1;
        self.row_count += 1;
        Ok(())
    }

    /// Total data rows written across all batch files
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Current 1-based batch number
    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn header(&self) -> &'static [&'static str] {
        self.header
    }

    /// Flush and close the open file.
    pub fn finish(mut self) -> Result<SinkSummary, SinkError> {
        self.close_batch()?;
        Ok(SinkSummary {
            rows: self.row_count,
            files: std::mem::take(&mut self.files),
        })
    }
}

impl Drop for BatchedSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                log::warn!("failed to flush {}: {e}", self.template);
            }
        }
    }
}

/// Batch number encoded in `path` for a `<prefix>{batch}<suffix>` template.
pub fn parse_batch_number(path: &Path, prefix: &str, suffix: &str) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix(prefix)?
        .strip_suffix(suffix)?
        .parse()
        .ok()
}

/// Existing batch files of a template in `dir`, ordered by batch number.
///
/// The template is a bare file name such as `nodes-papers-{batch}.csv`.
pub fn list_batches(dir: &Path, file_template: &str) -> std::io::Result<Vec<PathBuf>> {
    let Some((prefix, suffix)) = file_template.split_once(BATCH_PLACEHOLDER) else {
        return Ok(Vec::new());
    };
    let mut found: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(n) = parse_batch_number(&path, prefix, suffix) {
            found.push((n, path));
        }
    }
    found.sort_by_key(|(n, _)| *n);
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Remove every existing batch file of a template in `dir`.
pub fn remove_batches(dir: &Path, file_template: &str) -> std::io::Result<usize> {
    let stale = list_batches(dir, file_template)?;
    for path in &stale {
        log::debug!("removing stale batch file {}", path.display());
        fs::remove_file(path)?;
    }
    Ok(stale.len())
}
