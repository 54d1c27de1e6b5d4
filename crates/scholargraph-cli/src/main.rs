//! scholargraph - Semantic Scholar records to property-graph CSV tables
//!
//! Normalizes paper and citation JSONL into deduplicated node and edge
//! batch files ready for a graph database bulk import.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "scholargraph")]
#[command(about = "Semantic Scholar records to property-graph CSV tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./scholargraph.toml or ~/.config/scholargraph/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert paper or citation JSONL into node/edge CSV batches
    Prepare(cmd::prepare::PrepareArgs),
    /// Generate reviews, cities and proceedings cities over prepared tables
    Generate(cmd::generate::GenerateArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let progress = Arc::new(scholargraph_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, spinners show activity
    //   non-TTY: info unless --quiet/--debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = cli.quiet || (is_tty && !cli.debug);
    scholargraph_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Prepare(args) => cmd::prepare::run(args, &config, &progress)?,
        Command::Generate(args) => cmd::generate::run(args, &config, &progress)?,
        Command::Config => print_config(&config),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let pages: Vec<String> = config
        .prepare
        .proceedings_pages
        .iter()
        .map(|s| format!("{s:?}").to_lowercase())
        .collect();

    table.add_row(vec![
        "Output directory",
        &config.output.default_dir.display().to_string(),
    ]);
    table.add_row(vec!["Batch size", &config.prepare.batch_size.to_string()]);
    table.add_row(vec![
        "Main author",
        &format!("{:?}", config.prepare.main_author),
    ]);
    table.add_row(vec!["Proceedings pages", &pages.join(", ")]);
    table.add_row(vec![
        "Decode chunk",
        &match config.prepare.decode_chunk {
            0 => "sequential".to_string(),
            n => format!("{n} lines"),
        },
    ]);
    table.add_row(vec!["Seed", &config.generate.seed.to_string()]);
    table.add_row(vec!["Countries", &config.generate.countries.join(", ")]);
    table.add_row(vec![
        "Reviewers",
        &format!(
            "{}..={}",
            config.generate.min_reviewers, config.generate.max_reviewers
        ),
    ]);

    eprintln!("\n{table}");
}
