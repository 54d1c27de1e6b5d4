//! Completion summaries for `prepare` and `generate` runs.
//!
//! TTY mode renders `comfy-table` tables above the spinners; non-TTY mode
//! emits one `log::info!` line per table instead.

use std::time::Duration;

use comfy_table::{
    Cell, Color, Table as TextTable, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use scholargraph_core::{ProgressContext, fmt_num};

use crate::anomaly::Anomalies;
use crate::schema::Table;
use crate::state::{GenerateKind, RecordKind};
use crate::tables::TableOutput;

/// Data a papers run cannot derive; populated later by `generate` or by hand.
pub const DEFERRED: &[&str] = &[
    "city of each conference/workshop edition (edges-isheldin.city, nodes-cities)",
    "peer-review assignments and review content (edges-reviewed)",
];

fn new_table(title: &str, columns: &[&str]) -> TextTable {
    let mut table = TextTable::new();
    let mut header = vec![Cell::new(title)
        .fg(Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)];
    header.extend(columns.iter().map(|c| Cell::new(c).fg(Color::Cyan)));
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

// =============================================================================
// Prepare
// =============================================================================

/// Outcome of one `prepare` run
#[derive(Debug)]
pub struct RunSummary {
    pub kind: RecordKind,
    pub inputs: usize,
    pub records: usize,
    pub tables: Vec<TableOutput>,
    pub anomalies: Anomalies,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Rows written to `table` (0 if the run did not open it)
    pub fn rows(&self, table: Table) -> usize {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map_or(0, |t| t.rows)
    }

    pub fn files(&self) -> usize {
        self.tables.iter().map(|t| t.files.len()).sum()
    }

    /// Data the run could not derive and must be filled in separately
    pub fn deferred(&self) -> &'static [&'static str] {
        match self.kind {
            RecordKind::Papers => DEFERRED,
            RecordKind::Citations => &[],
        }
    }

    /// Format per-table row counts as a string.
    pub fn format_table(&self) -> String {
        let mut table = new_table(
            &format!("prepare {}", self.kind),
            &["Rows", "Files"],
        );
        table.add_row(vec![
            Cell::new("records read").fg(Color::Green),
            Cell::new(fmt_num(self.records)).fg(Color::Green),
            Cell::new(format!("{} inputs", self.inputs)),
        ]);
        for output in &self.tables {
            table.add_row(vec![
                Cell::new(output.table.to_string()),
                Cell::new(fmt_num(output.rows)),
                Cell::new(output.files.len()),
            ]);
        }
        format!("\n{table}")
    }

    /// Format anomaly counts, `None` when the run was clean.
    pub fn format_anomalies(&self) -> Option<String> {
        if self.anomalies.iter().next().is_none() {
            return None;
        }
        let mut table = new_table("Data quality", &["Count", "Level"]);
        for (anomaly, count) in self.anomalies.iter() {
            table.add_row(vec![
                Cell::new(anomaly.label()),
                Cell::new(fmt_num(count)),
                Cell::new(if anomaly.is_skip() { "warn" } else { "debug" }),
            ]);
        }
        for (declared, count) in self.anomalies.venue_types() {
            table.add_row(vec![
                Cell::new(format!("  venue type {declared}")).fg(Color::Yellow),
                Cell::new(fmt_num(*count)).fg(Color::Yellow),
                Cell::new(""),
            ]);
        }
        Some(format!("\n{table}"))
    }

    /// Print summary tables (TTY mode).
    pub fn print(&self, progress: &ProgressContext) {
        progress.println(self.format_table());
        if let Some(anomalies) = self.format_anomalies() {
            progress.println(anomalies);
        }
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        let parts: Vec<String> = self
            .tables
            .iter()
            .map(|t| format!("{}={}", t.table, fmt_num(t.rows)))
            .collect();
        log::info!(
            "prepare {} complete: {} records from {} inputs in {:.1}s",
            self.kind,
            fmt_num(self.records),
            self.inputs,
            self.elapsed.as_secs_f64()
        );
        log::info!("rows: {}", parts.join(" "));
        let anomalies: Vec<String> = self
            .anomalies
            .iter()
            .map(|(a, n)| format!("{}={}", a.label(), fmt_num(n)))
            .collect();
        if !anomalies.is_empty() {
            log::info!("data quality: {}", anomalies.join(", "));
        }
        if let Some(line) = self.format_venue_types() {
            log::info!("{line}");
        }
    }

    /// Unmodelled venue types on one line, `None` when there were none.
    pub fn format_venue_types(&self) -> Option<String> {
        let types = self.anomalies.venue_types();
        if types.is_empty() {
            return None;
        }
        let parts: Vec<String> = types
            .iter()
            .map(|(name, n)| format!("{name}={}", fmt_num(*n)))
            .collect();
        Some(format!("venue types: {}", parts.join(", ")))
    }

    /// One line per kind of missing optional attribute seen in the run
    pub fn gap_warnings(&self) -> Vec<String> {
        self.anomalies
            .gaps()
            .map(|(a, n)| format!("{} records: {}", fmt_num(n), a.label()))
            .collect()
    }

    /// Summary in the mode the terminal supports, then the deferred follow-ups.
    pub fn report(&self, progress: &ProgressContext) {
        if progress.is_tty() {
            self.print(progress);
        } else {
            self.log();
        }
        for line in self.gap_warnings() {
            log::warn!("{line}");
        }
        for item in self.deferred() {
            log::warn!("not derivable from input, populate separately: {item}");
        }
    }
}

// =============================================================================
// Generate
// =============================================================================

/// Table written by one generator
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub kind: GenerateKind,
    pub output: TableOutput,
    /// Rows that got fewer picks than requested (reviews only)
    pub short: usize,
}

#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub outputs: Vec<GenerateOutput>,
    pub elapsed: Duration,
}

impl GenerateSummary {
    pub fn format_table(&self) -> String {
        let mut table = new_table("generate", &["Table", "Rows", "Short"]);
        for g in &self.outputs {
            table.add_row(vec![
                Cell::new(g.kind.name()),
                Cell::new(g.output.table.to_string()),
                Cell::new(fmt_num(g.output.rows)),
                Cell::new(fmt_num(g.short)),
            ]);
        }
        format!("\n{table}")
    }

    pub fn log(&self) {
        for g in &self.outputs {
            log::info!(
                "generate {}: {} rows in {} ({} files)",
                g.kind,
                fmt_num(g.output.rows),
                g.output.table,
                g.output.files.len()
            );
        }
    }

    pub fn report(&self, progress: &ProgressContext) {
        if progress.is_tty() {
            progress.println(self.format_table());
        } else {
            self.log();
        }
    }
}
