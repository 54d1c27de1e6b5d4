//! Generate subcommand - synthesize tables the prepared input cannot provide

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use scholargraph_core::SharedProgress;
use scholargraph_s2::{GenerateArgs as RunArgs, GenerateConfig};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Generators to run: reviews, cities, proceedings-cities
    #[arg(required = true, value_delimiter = ',')]
    pub kinds: Vec<String>,

    /// Directory holding the prepared tables
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Countries payload for `cities` ({"data":[{"country":..,"cities":[..]}]})
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Seed of the deterministic pick stream
    #[arg(long)]
    pub seed: Option<u64>,

    /// Countries whose cities are kept (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub countries: Option<Vec<String>>,

    #[arg(long)]
    pub min_reviewers: Option<usize>,

    #[arg(long)]
    pub max_reviewers: Option<usize>,

    /// Rows per output file (default: one file per table)
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

impl GenerateArgs {
    fn resolve(self, config: &Config) -> RunArgs {
        let defaults = &config.generate;
        RunArgs {
            kinds: self.kinds,
            output_dir: self
                .output
                .unwrap_or_else(|| config.output.default_dir.clone()),
            batch_size: self.batch_size,
            seed: self.seed.unwrap_or(defaults.seed),
            countries: self
                .countries
                .unwrap_or_else(|| defaults.countries.clone()),
            min_reviewers: self.min_reviewers.unwrap_or(defaults.min_reviewers),
            max_reviewers: self.max_reviewers.unwrap_or(defaults.max_reviewers),
            cities_source: self.source,
        }
    }
}

pub fn run(args: GenerateArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let run_config = GenerateConfig::try_from(args.resolve(config))?;
    let summary = scholargraph_s2::generate::run(&run_config, progress)?;
    summary.report(progress);
    Ok(())
}
