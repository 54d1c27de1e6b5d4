//! Error types shared by record sources and batch sinks

use std::path::PathBuf;

/// Failure while reading or decoding line-delimited JSON input.
///
/// Every variant carries the input path; read and decode failures also carry
/// the 1-based line number so the operator can locate the offending record.
#[derive(Debug)]
pub enum SourceError {
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    Read {
        path: PathBuf,
        line: usize,
        source: std::io::Error,
    },
    Decode {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => write!(f, "cannot open {}: {source}", path.display()),
            Self::Read { path, line, source } => {
                write!(f, "{}:{line}: read failed: {source}", path.display())
            }
            Self::Decode { path, line, source } => {
                write!(f, "{}:{line}: malformed record: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl SourceError {
    /// Line number of the failing record, if the failure is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Open { .. } => None,
            Self::Read { line, .. } | Self::Decode { line, .. } => Some(*line),
        }
    }
}

/// Failure while creating or writing a batched output table.
#[derive(Debug)]
pub enum SinkError {
    /// Filename template does not contain exactly one `{batch}` placeholder
    MissingPlaceholder(String),
    /// Batch size must be a positive integer
    ZeroBatchSize,
    /// A row was addressed to a table that was never opened
    NotOpen(&'static str),
    /// A list-valued attribute could not be JSON-encoded
    Encode(serde_json::Error),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPlaceholder(t) => {
                write!(f, "output template must contain exactly one {{batch}}: {t}")
            }
            Self::ZeroBatchSize => write!(f, "batch size must be positive"),
            Self::NotOpen(table) => write!(f, "table not open: {table}"),
            Self::Encode(e) => write!(f, "JSON encode: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Csv(e) => write!(f, "CSV: {e}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

impl From<csv::Error> for SinkError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
