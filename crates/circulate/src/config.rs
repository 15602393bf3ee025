//! TOML configuration parsing and validation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
}

/// Which backend holds the four record collections.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON document, rewritten atomically on every mutation.
    File,
    /// One SQLite table per collection, via sqlx.
    Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Path to the JSON document or the SQLite database file.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CirculationConfig {
    #[serde(default = "default_loan_days")]
    pub loan_days: u32,
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            loan_days: default_loan_days(),
        }
    }
}

fn default_loan_days() -> u32 {
    circulate_core::circulation::DEFAULT_LOAN_DAYS
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.circulation.loan_days < 1 {
        anyhow::bail!("circulation.loan_days must be >= 1");
    }
    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_backend_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [store]
            backend = "file"
            path = "data/library.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.store.backend, Backend::File);
        assert_eq!(cfg.circulation.loan_days, 14);
    }

    #[test]
    fn parses_sqlite_backend_with_loan_override() {
        let cfg: Config = toml::from_str(
            r#"
            [store]
            backend = "sqlite"
            path = "data/library.sqlite"

            [circulation]
            loan_days = 7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.store.backend, Backend::Sqlite);
        assert_eq!(cfg.circulation.loan_days, 7);
    }

    #[test]
    fn rejects_unknown_backend() {
        let parsed: Result<Config, _> = toml::from_str(
            r#"
            [store]
            backend = "postgres"
            path = "x"
            "#,
        );
        assert!(parsed.is_err());
    }
}
