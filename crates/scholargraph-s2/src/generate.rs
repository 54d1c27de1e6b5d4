//! Out-of-band generators for data a papers run cannot derive.
//!
//! Each generator reads tables of a previous `prepare` run from the output
//! directory and replaces every batch file of its own table:
//! - `reviews` → edges-reviewed (reviewers never review their own papers)
//! - `cities` → nodes-cities from a countries payload
//! - `proceedings-cities` → edges-isheldin, one city per proceedings

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use scholargraph_core::{SharedProgress, fmt_num, list_batches, progress::tick, remove_batches};

use crate::pick::Picker;
use crate::registry::{EntityKey, EntityRegistry};
use crate::schema::{HeldIn, Link, NameNode, Table};
use crate::state::GenerateKind;
use crate::stats::{GenerateOutput, GenerateSummary};
use crate::tables::{TableSet, TableSink};

/// CLI-facing arguments for the generate command
#[derive(Debug)]
pub struct GenerateArgs {
    pub kinds: Vec<String>,
    pub output_dir: PathBuf,
    /// Rows per batch file; `None` writes a single file per table
    pub batch_size: Option<usize>,
    pub seed: u64,
    pub countries: Vec<String>,
    pub min_reviewers: usize,
    pub max_reviewers: usize,
    pub cities_source: Option<PathBuf>,
}

/// Validated generate configuration
#[derive(Debug)]
pub struct GenerateConfig {
    /// Generators to run, in execution order
    pub kinds: Vec<GenerateKind>,
    pub output_dir: PathBuf,
    pub batch_size: usize,
    pub seed: u64,
    pub countries: Vec<String>,
    pub min_reviewers: usize,
    pub max_reviewers: usize,
    pub cities_source: Option<PathBuf>,
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        let mut kinds: Vec<GenerateKind> = args
            .kinds
            .iter()
            .map(|s| {
                GenerateKind::from_name(s).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown generator: {s} (expected reviews, cities or proceedings-cities)"
                    )
                })
            })
            .collect::<anyhow::Result<_>>()?;
        anyhow::ensure!(!kinds.is_empty(), "At least one generator is required");
        kinds.sort();
        kinds.dedup();

        let batch_size = args.batch_size.unwrap_or(usize::MAX);
        anyhow::ensure!(batch_size > 0, "Batch size must be a positive integer");
        anyhow::ensure!(
            args.min_reviewers <= args.max_reviewers,
            "min_reviewers ({}) exceeds max_reviewers ({})",
            args.min_reviewers,
            args.max_reviewers
        );
        anyhow::ensure!(
            args.output_dir.is_dir(),
            "Output directory does not exist: {}. Run prepare first.",
            args.output_dir.display()
        );
        if kinds.contains(&GenerateKind::Cities) {
            match &args.cities_source {
                Some(path) => anyhow::ensure!(
                    path.is_file(),
                    "Cities source does not exist: {}",
                    path.display()
                ),
                None => anyhow::bail!("cities requires --source <countries.json>"),
            }
        }

        Ok(Self {
            kinds,
            output_dir: args.output_dir,
            batch_size,
            seed: args.seed,
            countries: args.countries,
            min_reviewers: args.min_reviewers,
            max_reviewers: args.max_reviewers,
            cities_source: args.cities_source,
        })
    }
}

/// Run every configured generator in order.
pub fn run(config: &GenerateConfig, progress: &SharedProgress) -> anyhow::Result<GenerateSummary> {
    let started = Instant::now();
    let mut outputs = Vec::with_capacity(config.kinds.len());
    for &kind in &config.kinds {
        log::info!("generate {kind}: starting");
        let output = match kind {
            GenerateKind::Reviews => generate_reviews(config, progress)?,
            GenerateKind::Cities => generate_cities(config)?,
            GenerateKind::ProceedingsCities => generate_proceedings_cities(config, progress)?,
        };
        outputs.push(output);
    }
    Ok(GenerateSummary {
        outputs,
        elapsed: started.elapsed(),
    })
}

// =============================================================================
// Table IO
// =============================================================================

/// Selected columns of every row of `table`, across its batch files in order.
pub fn read_rows(dir: &Path, table: Table, columns: &[&str]) -> anyhow::Result<Vec<Vec<String>>> {
    let files = list_batches(dir, &table.file_template())
        .with_context(|| format!("Cannot list {}", dir.display()))?;
    anyhow::ensure!(
        !files.is_empty(),
        "No {table} files found in {}. Run prepare first.",
        dir.display()
    );

    let mut rows = Vec::new();
    for file in files {
        let mut reader = csv::Reader::from_path(&file)
            .with_context(|| format!("Cannot open {}", file.display()))?;
        let headers = reader.headers()?.clone();
        let indices: Vec<usize> = columns
            .iter()
            .map(|col| {
                headers.iter().position(|h| h == *col).ok_or_else(|| {
                    anyhow::anyhow!("{} has no column {col}", file.display())
                })
            })
            .collect::<anyhow::Result<_>>()?;
        for record in reader.records() {
            let record = record.with_context(|| format!("Cannot read {}", file.display()))?;
            rows.push(
                indices
                    .iter()
                    .map(|&i| record.get(i).unwrap_or_default().to_owned())
                    .collect(),
            );
        }
    }
    Ok(rows)
}

/// Sorted, deduplicated values of one column
fn read_pool(dir: &Path, table: Table, column: &str) -> anyhow::Result<Vec<String>> {
    let mut pool: Vec<String> = read_rows(dir, table, &[column])?
        .into_iter()
        .filter_map(|mut row| row.pop())
        .filter(|v| !v.is_empty())
        .collect();
    pool.sort_unstable();
    pool.dedup();
    Ok(pool)
}

/// Remove the old batches of `table` and open a fresh sink for it.
fn replace_table(config: &GenerateConfig, table: Table) -> anyhow::Result<TableSet> {
    let removed = remove_batches(&config.output_dir, &table.file_template())
        .with_context(|| format!("Cannot remove old {table} files"))?;
    if removed > 0 {
        log::info!("{table}: replacing {removed} existing batch files");
    }
    Ok(TableSet::create(
        &config.output_dir,
        &[table],
        config.batch_size,
    )?)
}

fn single_output(tables: TableSet) -> anyhow::Result<crate::tables::TableOutput> {
    tables
        .finish()?
        .pop()
        .context("generator opened no table")
}

// =============================================================================
// Reviews
// =============================================================================

/// Pick `target` distinct reviewers from `pool`, never one of `authors`.
///
/// Returns every eligible author (pool order) when fewer than `target` exist.
pub fn pick_reviewers<'a>(
    pool: &'a [String],
    authors: &FxHashSet<&str>,
    target: usize,
    picker: &mut Picker,
) -> Vec<&'a str> {
    let excluded = authors
        .iter()
        .filter(|a| pool.binary_search_by(|p| p.as_str().cmp(**a)).is_ok())
        .count();
    let eligible = pool.len() - excluded;

    if eligible <= target {
        return pool
            .iter()
            .map(String::as_str)
            .filter(|p| !authors.contains(p))
            .collect();
    }

    // Dense pool: rejection sampling accepts at least one draw in four.
    if eligible * 2 >= pool.len() && eligible >= target * 2 {
        let mut chosen: Vec<&str> = Vec::with_capacity(target);
        while chosen.len() < target {
            let candidate = pool[picker.below(pool.len())].as_str();
            if !authors.contains(candidate) && !chosen.contains(&candidate) {
                chosen.push(candidate);
            }
        }
        return chosen;
    }

    // Sparse pool: partial Fisher-Yates over the eligible authors.
    let mut candidates: Vec<&str> = pool
        .iter()
        .map(String::as_str)
        .filter(|p| !authors.contains(p))
        .collect();
    for i in 0..target {
        let j = i + picker.below(candidates.len() - i);
        candidates.swap(i, j);
    }
    candidates.truncate(target);
    candidates
}

fn generate_reviews(
    config: &GenerateConfig,
    progress: &SharedProgress,
) -> anyhow::Result<GenerateOutput> {
    let papers = read_rows(&config.output_dir, Table::Papers, &["paperID"])?;
    let pool = read_pool(&config.output_dir, Table::Authors, "authorID")?;
    let wrote = read_rows(&config.output_dir, Table::Wrote, &["paperID", "authorID"])?;
    log::info!(
        "reviews: {} papers, {} authors in pool",
        fmt_num(papers.len()),
        fmt_num(pool.len())
    );

    let mut authorship: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
    for row in &wrote {
        authorship
            .entry(row[0].as_str())
            .or_default()
            .insert(row[1].as_str());
    }
    let no_authors = FxHashSet::default();

    let mut tables = replace_table(config, Table::Reviewed)?;
    let pb = progress.records_line("reviews");
    let mut short = 0;
    for (i, row) in papers.iter().enumerate() {
        let paper_id = row[0].as_str();
        let authors = authorship.get(paper_id).unwrap_or(&no_authors);
        let mut picker = Picker::new(config.seed, paper_id);
        let target = picker.between(config.min_reviewers, config.max_reviewers);

        let reviewers = pick_reviewers(&pool, authors, target, &mut picker);
        if reviewers.len() < target {
            short += 1;
            log::warn!(
                "paper {paper_id}: only {} eligible reviewers, wanted {target}",
                reviewers.len()
            );
        }
        for reviewer in reviewers {
            tables.write(Table::Reviewed, &Link::new(reviewer, paper_id))?;
        }
        tick(&pb, "reviews", i + 1, progress.is_tty());
    }
    pb.finish_and_clear();

    Ok(GenerateOutput {
        kind: GenerateKind::Reviews,
        output: single_output(tables)?,
        short,
    })
}

// =============================================================================
// Cities
// =============================================================================

/// countriesnow-style payload: `{"data":[{"country":..,"cities":[..]}]}`
#[derive(Debug, Deserialize)]
struct CountriesPayload {
    #[serde(default)]
    data: Vec<CountryEntry>,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    country: String,
    #[serde(default)]
    cities: Vec<String>,
}

/// `Country/City` names of the selected countries, in payload order, deduplicated.
///
/// An empty `countries` list keeps every country.
pub fn city_names(payload: &str, countries: &[String]) -> anyhow::Result<Vec<String>> {
    let payload: CountriesPayload =
        serde_json::from_str(payload).context("Malformed countries payload")?;
    anyhow::ensure!(!payload.data.is_empty(), "Countries payload has no data");

    let mut registry = EntityRegistry::new();
    let mut names = Vec::new();
    for entry in payload.data {
        if !countries.is_empty() && !countries.contains(&entry.country) {
            continue;
        }
        for city in entry.cities {
            let name = format!("{}/{city}", entry.country);
            if registry.mark_seen(EntityKey::City(name.clone())) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn generate_cities(config: &GenerateConfig) -> anyhow::Result<GenerateOutput> {
    let source = config
        .cities_source
        .as_deref()
        .context("cities requires a countries source file")?;
    let payload = std::fs::read_to_string(source)
        .with_context(|| format!("Cannot read {}", source.display()))?;
    let names = city_names(&payload, &config.countries)?;
    if names.is_empty() {
        log::warn!("cities: no cities for countries {:?}", config.countries);
    }

    let mut tables = replace_table(config, Table::Cities)?;
    for name in &names {
        tables.write(Table::Cities, &NameNode { name })?;
    }
    Ok(GenerateOutput {
        kind: GenerateKind::Cities,
        output: single_output(tables)?,
        short: 0,
    })
}

fn generate_proceedings_cities(
    config: &GenerateConfig,
    progress: &SharedProgress,
) -> anyhow::Result<GenerateOutput> {
    let proceedings = read_rows(&config.output_dir, Table::Proceedings, &["proceedingsID"])?;
    let cities = read_pool(&config.output_dir, Table::Cities, "name")?;
    anyhow::ensure!(
        !cities.is_empty(),
        "{} has no cities. Run generate cities first.",
        Table::Cities
    );

    let mut tables = replace_table(config, Table::IsHeldIn)?;
    let pb = progress.records_line("proceedings");
    for (i, row) in proceedings.iter().enumerate() {
        let proceedings_id = row[0].as_str();
        let city = cities[Picker::new(config.seed, proceedings_id).below(cities.len())].as_str();
        tables.write(
            Table::IsHeldIn,
            &HeldIn {
                proceedings_id,
                city: Some(city),
            },
        )?;
        tick(&pb, "proceedings", i + 1, progress.is_tty());
    }
    pb.finish_and_clear();

    Ok(GenerateOutput {
        kind: GenerateKind::ProceedingsCities,
        output: single_output(tables)?,
        short: 0,
    })
}
