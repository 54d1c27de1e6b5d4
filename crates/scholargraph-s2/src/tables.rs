//! Table sinks: where graph rows go

use std::path::{Path, PathBuf};

use serde::Serialize;

use scholargraph_core::{BatchedSink, SinkError};

use crate::schema::Table;

/// Destination for rows keyed by output table
pub trait TableSink {
    fn write<R: Serialize>(&mut self, table: Table, row: &R) -> Result<(), SinkError>;
}

/// Rows and files written for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutput {
    pub table: Table,
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

/// One [`BatchedSink`] per opened table, all under one output directory
#[derive(Debug)]
pub struct TableSet {
    sinks: Vec<Option<BatchedSink>>,
}

impl TableSet {
    /// Open batch 1 of every table in `tables`; each gets its header immediately.
    pub fn create(dir: &Path, tables: &[Table], batch_size: usize) -> Result<Self, SinkError> {
        let mut sinks: Vec<Option<BatchedSink>> = Table::ALL.iter().map(|_| None).collect();
        for &table in tables {
            let sink = BatchedSink::new(table.path_template(dir), table.header(), batch_size)?;
            sinks[table.index()] = Some(sink);
        }
        Ok(Self { sinks })
    }

    /// Rows written so far to `table` (0 when not open)
    pub fn row_count(&self, table: Table) -> usize {
        self.sinks[table.index()]
            .as_ref()
            .map_or(0, BatchedSink::row_count)
    }

    /// Flush every sink; outputs are in table catalog order.
    pub fn finish(self) -> Result<Vec<TableOutput>, SinkError> {
        let mut outputs = Vec::new();
        for (table, sink) in Table::ALL.into_iter().zip(self.sinks) {
            if let Some(sink) = sink {
                let summary = sink.finish()?;
                outputs.push(TableOutput {
                    table,
                    rows: summary.rows,
                    files: summary.files,
                });
            }
        }
        Ok(outputs)
    }
}

impl TableSink for TableSet {
    fn write<R: Serialize>(&mut self, table: Table, row: &R) -> Result<(), SinkError> {
        match self.sinks[table.index()].as_mut() {
            Some(sink) => sink.write(row),
            None => Err(SinkError::NotOpen(table.name())),
        }
    }
}

/// In-memory sink holding every row as its CSV fields
#[derive(Debug, Default)]
pub struct MemoryTables {
    rows: Vec<Vec<Vec<String>>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self {
            rows: Table::ALL.iter().map(|_| Vec::new()).collect(),
        }
    }

    pub fn rows(&self, table: Table) -> &[Vec<String>] {
        match self.rows.get(table.index()) {
            Some(rows) => rows,
            None => &[],
        }
    }

    pub fn count(&self, table: Table) -> usize {
        self.rows(table).len()
    }

    /// Values of one column, looked up by header name
    pub fn column(&self, table: Table, name: &str) -> Vec<&str> {
        let Some(idx) = table.header().iter().position(|h| *h == name) else {
            return Vec::new();
        };
        self.rows(table)
            .iter()
            .map(|row| row[idx].as_str())
            .collect()
    }
}

impl TableSink for MemoryTables {
    fn write<R: Serialize>(&mut self, table: Table, row: &R) -> Result<(), SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(row)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes.as_slice());
        let mut record = csv::StringRecord::new();
        reader.read_record(&mut record)?;

        if self.rows.is_empty() {
            self.rows = Table::ALL.iter().map(|_| Vec::new()).collect();
        }
        self.rows[table.index()].push(record.iter().map(str::to_owned).collect());
        Ok(())
    }
}
