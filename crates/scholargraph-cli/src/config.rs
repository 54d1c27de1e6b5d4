//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use scholargraph_s2::{BuildOptions, MainAuthorPolicy, PageSource};

/// Global configuration for scholargraph
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub prepare: PrepareConfig,
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./graph"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub batch_size: usize,
    pub main_author: MainAuthorPolicy,
    /// Page sources tried in order for conference and workshop papers
    pub proceedings_pages: Vec<PageSource>,
    /// Lines decoded in parallel per chunk (0 = sequential)
    pub decode_chunk: usize,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        let options = BuildOptions::default();
        Self {
            batch_size: 10_000,
            main_author: options.main_author,
            proceedings_pages: options.proceedings_pages,
            decode_chunk: 0,
        }
    }
}

impl PrepareConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            main_author: self.main_author,
            proceedings_pages: self.proceedings_pages.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub seed: u64,
    pub countries: Vec<String>,
    pub min_reviewers: usize,
    pub max_reviewers: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            countries: vec!["Spain".to_string()],
            min_reviewers: 3,
            max_reviewers: 5,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./scholargraph.toml (current directory)
    /// 2. ~/.config/scholargraph/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("scholargraph.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "scholargraph") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
