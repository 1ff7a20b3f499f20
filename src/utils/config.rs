use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::transform::aggregate::{AggregateOptions, CountPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "art-pipeline.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the five source CSVs.
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub enriched_file: String,
    pub summary_file: String,
    pub count_policy: CountPolicy,
    pub price_event_types: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            out_dir: PathBuf::from("out"),
            enriched_file: "artworks_enriched.csv".to_string(),
            summary_file: "summary_by_artist.csv".to_string(),
            count_policy: CountPolicy::Rows,
            price_event_types: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub count_policy: Option<CountPolicy>,
    pub price_event_types: Vec<String>,
}

impl PipelineConfig {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = overrides.out_dir {
            self.out_dir = dir;
        }
        if let Some(policy) = overrides.count_policy {
            self.count_policy = policy;
        }
        if !overrides.price_event_types.is_empty() {
            self.price_event_types = Some(overrides.price_event_types);
        }
        self
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            count_policy: self.count_policy,
            price_event_types: self.price_event_types.clone(),
        }
    }
}

/// Resolves the pipeline config. An explicit path must exist; otherwise
/// `art-pipeline.toml` in the working directory is used when present, and
/// built-in defaults when not.
pub fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        return load_from_file(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return load_from_file(default_path);
    }

    info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
    Ok(PipelineConfig::default())
}

fn load_from_file(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: PipelineConfig = toml::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
