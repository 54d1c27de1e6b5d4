//! Scholargraph S2 - Semantic Scholar records to property-graph tables
//!
//! Decodes paper and citation records, normalizes them into deduplicated
//! node and edge rows, and writes batched CSV tables for bulk import.

pub mod anomaly;
pub mod builder;
pub mod config;
pub mod generate;
pub mod pick;
pub mod record;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod state;
pub mod stats;
pub mod tables;

// Re-exports
pub use anomaly::{Anomalies, Anomaly};
pub use builder::{BuildOptions, GraphBuilder, MainAuthorPolicy, PageSource};
pub use config::{Config, PrepareArgs};
pub use generate::{GenerateArgs, GenerateConfig};
pub use record::{CitationRecord, PaperRecord, Record};
pub use registry::{EntityKey, EntityKind, EntityRegistry};
pub use runner::run;
pub use schema::Table;
pub use state::{GenerateKind, RecordKind};
pub use stats::{GenerateSummary, RunSummary};
pub use tables::{MemoryTables, TableSet, TableSink};
