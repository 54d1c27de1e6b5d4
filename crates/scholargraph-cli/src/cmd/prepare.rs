//! Prepare subcommand - turn S2 JSONL records into node/edge CSV batches

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use scholargraph_core::SharedProgress;
use scholargraph_s2::{MainAuthorPolicy, PrepareArgs as RunArgs};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Input JSONL files (.jsonl or .jsonl.gz) or glob patterns
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Record type of the inputs: papers or citations
    #[arg(short = 't', long = "type", default_value = "papers")]
    pub kind: String,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rows per output file before rolling over
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Main author policy when the first author has no id (skip, first-valid)
    #[arg(long)]
    pub main_author: Option<String>,

    /// Lines decoded in parallel per chunk (0 = sequential)
    #[arg(long)]
    pub decode_chunk: Option<usize>,
}

impl PrepareArgs {
    /// Merge CLI flags over the config file values.
    fn resolve(self, config: &Config) -> Result<RunArgs> {
        let mut options = config.prepare.build_options();
        if let Some(name) = &self.main_author {
            options.main_author = MainAuthorPolicy::from_name(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown main author policy: {name} (expected skip or first-valid)")
            })?;
        }
        Ok(RunArgs {
            inputs: self.inputs,
            output_dir: self
                .output
                .unwrap_or_else(|| config.output.default_dir.clone()),
            kind: self.kind,
            batch_size: self.batch_size.unwrap_or(config.prepare.batch_size),
            options,
            decode_chunk: self.decode_chunk.unwrap_or(config.prepare.decode_chunk),
        })
    }
}

pub fn run(args: PrepareArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let run_config = scholargraph_s2::Config::try_from(args.resolve(config)?)?;
    let summary = scholargraph_s2::run(&run_config, progress)?;
    summary.report(progress);
    Ok(())
}
