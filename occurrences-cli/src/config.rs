use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::ingest::{CanonicalField, IngestOptions};

const CONFIG_FILE_NAME: &str = "occurrences.toml";
const DATA_DIR_ENV: &str = "OCCURRENCES_DATA_DIR";
const BIND_ENV: &str = "OCCURRENCES_BIND";

/// Root configuration, deserialized from `occurrences.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the most recently uploaded spreadsheet
    pub data_dir: PathBuf,
    /// Address the HTTP server listens on
    pub bind: String,
    /// Upper bound for upload request bodies, in megabytes
    pub max_upload_mb: usize,
    pub ingest: IngestConfig,
}

/// Header detection and column mapping overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows probed when looking for the header. Defaults to 10.
    pub max_header_rows: Option<usize>,
    /// Replaces the built-in header keywords when set.
    pub header_keywords: Option<Vec<String>>,
    /// Extra aliases per canonical field, tried after the built-in ones.
    pub aliases: HashMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            bind: "127.0.0.1:8000".to_string(),
            max_upload_mb: 25,
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Build parser options from the `[ingest]` section
    pub fn ingest_options(&self) -> Result<IngestOptions> {
        let mut options = IngestOptions::default();

        if let Some(rows) = self.ingest.max_header_rows {
            if rows == 0 {
                bail!("ingest.max_header_rows must be at least 1");
            }
            options.max_header_rows = rows;
        }

        if let Some(keywords) = &self.ingest.header_keywords {
            options.header_keywords = keywords.clone();
        }

        for (name, aliases) in &self.ingest.aliases {
            let field = CanonicalField::from_name(name).with_context(|| {
                format!(
                    "Unknown field '{}' in [ingest.aliases] (expected one of: id, type, location, severity, status, timestamp)",
                    name
                )
            })?;
            options.aliases.extend(field, aliases.iter().cloned());
        }

        Ok(options)
    }

    /// Environment variables win over the config file
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(bind) = std::env::var(BIND_ENV) {
            if !bind.trim().is_empty() {
                self.bind = bind;
            }
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `./occurrences.toml`
/// 3. `<config dir>/occurrences/config.toml`
/// 4. Built-in [`Config::default`]
///
/// `OCCURRENCES_DATA_DIR` and `OCCURRENCES_BIND` are applied on top.
pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    let mut config = match find_config_file(config_override) {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            read_config_file(&path)?
        }
        None => Config::default(),
    };

    config.apply_env_overrides();
    Ok(config)
}

fn find_config_file(config_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_override {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("occurrences").join("config.toml"))
        .filter(|path| path.exists())
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
