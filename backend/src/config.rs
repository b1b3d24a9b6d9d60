//! Application configuration.
//!
//! Loaded from a single `config.yaml` at the root of the data directory,
//! with sensible defaults when the file is absent. Only operational
//! parameters live here; nothing in this file is required for the domain
//! logic to be correct.

use crate::error::Result;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default sales tax rate (8%).
pub fn default_tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

fn default_auto_save_interval_secs() -> u64 {
    300
}

fn default_backup_prune_interval_secs() -> u64 {
    86_400
}

fn default_max_backups() -> usize {
    30
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the flat-file tables and their `backups/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory report exports are written to.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    /// Tax rate applied when an order is submitted.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// How often dirty in-memory state is flushed to disk.
    #[serde(default = "default_auto_save_interval_secs")]
    pub auto_save_interval_secs: u64,
    /// How often aged backups are pruned.
    #[serde(default = "default_backup_prune_interval_secs")]
    pub backup_prune_interval_secs: u64,
    /// Most recent backups retained per table (30-day policy).
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
            tax_rate: default_tax_rate(),
            auto_save_interval_secs: default_auto_save_interval_secs(),
            backup_prune_interval_secs: default_backup_prune_interval_secs(),
            max_backups: default_max_backups(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            crate::error::Error::validation("config", format!("could not parse {}: {}", path.display(), e))
        })?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Configuration rooted at a specific directory, useful for tests and
    /// embedded hosts.
    pub fn with_data_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            reports_dir: dir.join("reports"),
            data_dir: dir,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_match_policy() {
        let config = AppConfig::default();
        assert_eq!(config.tax_rate, Decimal::from_str("0.08").unwrap());
        assert_eq!(config.auto_save_interval_secs, 300);
        assert_eq!(config.max_backups, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/config.yaml").unwrap();
        assert_eq!(config.max_backups, 30);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "tax_rate: \"0.10\"\nmax_backups: 5\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.tax_rate, Decimal::from_str("0.10").unwrap());
        assert_eq!(config.max_backups, 5);
        assert_eq!(config.auto_save_interval_secs, 300);
    }
}
