//! Configuration module for stockdash.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: data mode, providers, HTTP and exports.

mod provider_config;

pub use provider_config::{HttpConfig, PolygonConfig, YahooConfig};

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where market data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    /// Real Polygon and Yahoo endpoints
    Live,
    /// Deterministic synthetic data, no network
    Mock,
}

impl FromStr for DataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(DataMode::Live),
            "mock" => Ok(DataMode::Mock),
            _ => anyhow::bail!("Invalid DATA_MODE: {}. Must be 'live' or 'mock'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: DataMode,
    pub polygon: PolygonConfig,
    pub yahoo: YahooConfig,
    pub http: HttpConfig,
    /// Directory spreadsheet exports are written to
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("DATA_MODE").unwrap_or_else(|_| "live".to_string());
        let mode = DataMode::from_str(&mode_str).context("Failed to parse DATA_MODE")?;

        let export_dir = PathBuf::from(env::var("EXPORT_DIR").unwrap_or_else(|_| ".".to_string()));
        if export_dir.as_os_str().is_empty() {
            anyhow::bail!("EXPORT_DIR must not be empty");
        }

        Ok(Self {
            mode,
            polygon: PolygonConfig::from_env(),
            yahoo: YahooConfig::from_env(),
            http: HttpConfig::from_env(),
            export_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Global lock to prevent race conditions when modifying environment variables in tests
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn get_env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn test_data_mode_parsing() {
        assert_eq!(DataMode::from_str("LIVE").unwrap(), DataMode::Live);
        assert_eq!(DataMode::from_str(" mock ").unwrap(), DataMode::Mock);
        assert!(DataMode::from_str("paper").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let _guard = get_env_lock().lock().unwrap();
        unsafe {
            env::remove_var("DATA_MODE");
            env::remove_var("EXPORT_DIR");
        }

        let config = Config::from_env().expect("Should parse with defaults");
        assert_eq!(config.mode, DataMode::Live);
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_config_reads_overrides() {
        let _guard = get_env_lock().lock().unwrap();
        unsafe {
            env::set_var("DATA_MODE", "mock");
            env::set_var("EXPORT_DIR", "/tmp/stockdash-exports");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.mode, DataMode::Mock);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/stockdash-exports"));

        unsafe {
            env::remove_var("DATA_MODE");
            env::remove_var("EXPORT_DIR");
        }
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let _guard = get_env_lock().lock().unwrap();
        unsafe {
            env::set_var("DATA_MODE", "replay");
        }

        let err = Config::from_env().unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid DATA_MODE"));

        unsafe {
            env::remove_var("DATA_MODE");
        }
    }
}
