//! Prepare run configuration

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::builder::BuildOptions;
use crate::state::RecordKind;

/// CLI-facing arguments for the prepare command (plain struct, no clap derive).
#[derive(Debug)]
pub struct PrepareArgs {
    /// Input files or glob patterns, in processing order
    pub inputs: Vec<String>,
    pub output_dir: PathBuf,
    pub kind: String,
    pub batch_size: usize,
    pub options: BuildOptions,
    pub decode_chunk: usize,
}

/// Validated runtime configuration for one prepare run
#[derive(Debug)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub kind: RecordKind,
    pub batch_size: usize,
    pub options: BuildOptions,
    pub decode_chunk: usize,
}

impl TryFrom<PrepareArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: PrepareArgs) -> Result<Self, Self::Error> {
        let kind = RecordKind::from_name(&args.kind).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown record type: {} (expected papers or citations)",
                args.kind
            )
        })?;
        anyhow::ensure!(args.batch_size > 0, "Batch size must be a positive integer");
        anyhow::ensure!(!args.inputs.is_empty(), "At least one input file is required");
        anyhow::ensure!(
            !args.output_dir.is_file(),
            "Output path is a file, not a directory: {}",
            args.output_dir.display()
        );

        let inputs = expand_inputs(&args.inputs)?;

        Ok(Self {
            inputs,
            output_dir: args.output_dir,
            kind,
            batch_size: args.batch_size,
            options: args.options,
            decode_chunk: args.decode_chunk,
        })
    }
}

fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand input arguments into file paths.
///
/// Plain paths are kept in argument order and must exist; glob patterns are
/// expanded in sorted order and must match at least one file.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !is_pattern(input) {
            let path = Path::new(input);
            anyhow::ensure!(path.is_file(), "Input file does not exist: {input}");
            paths.push(path.to_path_buf());
            continue;
        }

        let mut matched: Vec<PathBuf> = glob::glob(input)
            .with_context(|| format!("Invalid input pattern: {input}"))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Cannot read matches of {input}"))?;
        matched.retain(|p| p.is_file());
        anyhow::ensure!(!matched.is_empty(), "Input pattern matched no files: {input}");
        matched.sort();
        log::debug!("{input}: {} files", matched.len());
        paths.extend(matched);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir, inputs: Vec<String>) -> PrepareArgs {
        PrepareArgs {
            inputs,
            output_dir: dir.path().join("out"),
            kind: "papers".into(),
            batch_size: 100,
            options: BuildOptions::default(),
            decode_chunk: 0,
        }
    }

    fn touch(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, "").unwrap();
        path.display().to_string()
    }

    #[test]
    fn valid_args() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "papers.jsonl");
        let config = Config::try_from(args(&dir, vec![input])).unwrap();
        assert_eq!(config.kind, RecordKind::Papers);
        assert_eq!(config.inputs.len(), 1);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "papers.jsonl");
        let mut a = args(&dir, vec![input]);
        a.kind = "authors".into();
        let err = Config::try_from(a).unwrap_err().to_string();
        assert!(err.contains("Unknown record type: authors"), "{err}");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir, "papers.jsonl");
        let mut a = args(&dir, vec![input]);
        a.batch_size = 0;
        assert!(Config::try_from(a).is_err());
    }

    #[test]
    fn missing_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.jsonl").display().to_string();
        assert!(Config::try_from(args(&dir, vec![missing])).is_err());
        assert!(Config::try_from(args(&dir, vec![])).is_err());
    }

    #[test]
    fn glob_expands_sorted_after_plain_paths() {
        let dir = TempDir::new().unwrap();
        let first = touch(&dir, "z-first.jsonl");
        touch(&dir, "part-2.jsonl.gz");
        touch(&dir, "part-1.jsonl.gz");
        let pattern = dir.path().join("part-*.jsonl.gz").display().to_string();

        let paths = expand_inputs(&[first, pattern]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["z-first.jsonl", "part-1.jsonl.gz", "part-2.jsonl.gz"]);
    }

    #[test]
    fn empty_glob_is_fatal() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.jsonl").display().to_string();
        let err = expand_inputs(&[pattern]).unwrap_err().to_string();
        assert!(err.contains("matched no files"), "{err}");
    }
}
