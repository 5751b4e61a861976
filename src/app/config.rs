//! Configuration loading: a `config.toml` file merged with environment
//! overrides, mirroring the teacher's `app/config` module.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tickers: Vec<String>,
    pub state_db_path: PathBuf,
    pub index_db_path: PathBuf,
    pub signals_db_path: PathBuf,
    pub reports_dir: PathBuf,
    pub interval_seconds: Option<u64>,
    pub cron: Option<String>,
    pub max_workers: Option<usize>,
    pub misfire_grace_seconds: u64,
    pub auto_ingest: bool,
    pub max_stale_hours: i64,
    pub signal_ttl_hours: i64,
    pub semantic_threshold: f64,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            state_db_path: PathBuf::from("filingwatch-state.db"),
            index_db_path: PathBuf::from("filingwatch-index.db"),
            signals_db_path: PathBuf::from("filingwatch-signals.db"),
            reports_dir: PathBuf::from("reports"),
            interval_seconds: Some(3600),
            cron: None,
            max_workers: None,
            misfire_grace_seconds: 60,
            auto_ingest: true,
            max_stale_hours: 6,
            signal_ttl_hours: 24,
            semantic_threshold: 0.35,
            user_agent: "filingwatch/0.1 (contact@example.com)".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default config file location (`dirs::config_dir()/filingwatch/config.toml`),
    /// mirroring the teacher's `cli/mod.rs` default config path argument.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("filingwatch").join("config.toml"))
    }

    /// Load from `path` if it exists, falling back to defaults. Environment
    /// variables loaded via `dotenvy` take precedence for a small set of
    /// deployment-specific overrides (identity/credentials) — see
    /// `SPEC_FULL.md` §6.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))?
            }
            _ => Config::default(),
        };

        if let Ok(user_agent) = std::env::var("FILINGWATCH_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Ok(level) = std::env::var("FILINGWATCH_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.max_stale_hours, 6);
        assert!((config.semantic_threshold - 0.35).abs() < 1e-9);
    }

    #[test]
    fn load_falls_back_to_defaults_when_path_missing() {
        let config = Config::load(Some(std::path::Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.signal_ttl_hours, 24);
    }
}
