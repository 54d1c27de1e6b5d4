//! Main execution logic for the prepare command

use std::time::Instant;

use anyhow::Context;
use indicatif::ProgressBar;
use scholargraph_core::{RecordSource, SharedProgress, fmt_num, progress::tick, remove_batches};
use serde::de::DeserializeOwned;

use crate::builder::GraphBuilder;
use crate::config::Config;
use crate::record::{CitationRecord, PaperRecord, Record};
use crate::state::RecordKind;
use crate::stats::RunSummary;
use crate::tables::{TableSet, TableSink};

/// Main entry point for the prepare command.
///
/// Any decode or write failure aborts the run; files written so far stay on
/// disk and the current batch may be partial.
pub fn run(config: &Config, progress: &SharedProgress) -> anyhow::Result<RunSummary> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Cannot create output directory {}",
            config.output_dir.display()
        )
    })?;

    log::info!(
        "prepare starting: kind={}, inputs={}, batch_size={}, output={}",
        config.kind,
        config.inputs.len(),
        fmt_num(config.batch_size),
        config.output_dir.display()
    );
    let started = Instant::now();

    // A previous run may have written more batches than this one will.
    for table in config.kind.tables() {
        let removed = remove_batches(&config.output_dir, &table.file_template())
            .with_context(|| format!("Cannot remove old {table} files"))?;
        if removed > 0 {
            log::info!("{table}: replacing {removed} existing batch files");
        }
    }

    let tables = TableSet::create(&config.output_dir, config.kind.tables(), config.batch_size)
        .context("Cannot open output tables")?;
    let mut builder = GraphBuilder::new(tables, config.options.clone());

    let pb = progress.records_line(config.kind.name());
    let is_tty = progress.is_tty();
    let records = match config.kind {
        RecordKind::Papers => {
            let source = RecordSource::<PaperRecord>::new(config.inputs.iter().cloned())
                .parallel_decode(config.decode_chunk);
            drain(source, &mut builder, &pb, config.kind, is_tty)?
        }
        RecordKind::Citations => {
            let source = RecordSource::<CitationRecord>::new(config.inputs.iter().cloned())
                .parallel_decode(config.decode_chunk);
            drain(source, &mut builder, &pb, config.kind, is_tty)?
        }
    };
    pb.finish_and_clear();

    let output = builder.finish();
    let tables = output.tables.finish().context("Cannot flush output tables")?;

    Ok(RunSummary {
        kind: config.kind,
        inputs: config.inputs.len(),
        records,
        tables,
        anomalies: output.anomalies,
        elapsed: started.elapsed(),
    })
}

/// Feed every record of `source` through the builder, in input order.
fn drain<T, S>(
    source: RecordSource<T>,
    builder: &mut GraphBuilder<S>,
    pb: &ProgressBar,
    kind: RecordKind,
    is_tty: bool,
) -> anyhow::Result<usize>
where
    T: DeserializeOwned + Send + Into<Record>,
    S: TableSink,
{
    let mut processed = 0;
    for record in source {
        let record = record.context("Cannot read input")?;
        builder
            .push(&record.into())
            .context("Cannot write output tables")?;
        processed += 1;
        tick(pb, kind.name(), processed, is_tty);
    }
    pb.set_position(processed as u64);
    Ok(processed)
}
