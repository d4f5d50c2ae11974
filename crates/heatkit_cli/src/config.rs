//! `heatkit.toml` configuration.
//!
//! ```toml
//! capacity = 8
//!
//! [mapping]
//! bib = "Bib No"
//! date_of_birth = "DOB"
//!
//! [input]
//! sheet = "Entries"
//! delimiter = ";"
//!
//! [output]
//! heats_xlsx = "out/heats.xlsx"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use heatkit_heat::{N_CAPACITY_HEAT_DEFAULT, SpecColumnMapping};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const C_CONFIG_FILE_DEFAULT: &str = "heatkit.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecHeatkitConfig {
    /// Maximum intended heat size.
    pub capacity: usize,
    /// Role → source column overrides on top of the inferred mapping.
    pub mapping: SpecColumnMapping,
    pub input: SpecInputConfig,
    pub output: SpecOutputConfig,
}

impl Default for SpecHeatkitConfig {
    fn default() -> Self {
        Self {
            capacity: N_CAPACITY_HEAT_DEFAULT,
            mapping: SpecColumnMapping::default(),
            input: SpecInputConfig::default(),
            output: SpecOutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecInputConfig {
    pub sheet: Option<String>,
    pub delimiter: Option<char>,
    pub keep_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecOutputConfig {
    /// Expanded one-row-per-event table.
    pub transformed: PathBuf,
    pub heats_xlsx: PathBuf,
    pub heats_pdf: PathBuf,
}

impl Default for SpecOutputConfig {
    fn default() -> Self {
        Self {
            transformed: PathBuf::from("transformed_data.xlsx"),
            heats_xlsx: PathBuf::from("heats.xlsx"),
            heats_pdf: PathBuf::from("heats.pdf"),
        }
    }
}

/// Parse configuration text.
pub fn parse_config(text: &str) -> Result<SpecHeatkitConfig> {
    toml::from_str(text).context("invalid heatkit configuration")
}

/// Load `path`, or `./heatkit.toml` when present, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<SpecHeatkitConfig> {
    let path_config = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let path_default = PathBuf::from(C_CONFIG_FILE_DEFAULT);
            if !path_default.is_file() {
                debug!("no config file, using defaults");
                return Ok(SpecHeatkitConfig::default());
            }
            path_default
        }
    };

    let text = fs::read_to_string(&path_config)
        .with_context(|| format!("failed to read config {}", path_config.display()))?;
    let config = parse_config(&text)
        .with_context(|| format!("failed to parse config {}", path_config.display()))?;
    debug!(path = %path_config.display(), "loaded config");
    Ok(config)
}
