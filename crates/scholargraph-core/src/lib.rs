//! Scholargraph Core - streaming building blocks for record-to-graph pipelines
//!
//! Line-delimited JSON input, size-bounded CSV batch output, and the
//! logging/progress plumbing shared by the pipeline crates.

pub mod error;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod source;

// Re-exports for convenience
pub use error::{SinkError, SourceError};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use sink::{BATCH_PLACEHOLDER, BatchedSink, SinkSummary, list_batches, remove_batches};
pub use source::RecordSource;
