//! Service configuration
//!
//! A small optional TOML file; every field has an explicit default so an
//! absent file (or any subset of fields) works.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    /// Data directory for the store (default: /var/lib/latchd)
    pub data_dir: Option<PathBuf>,

    /// Refresh cycle period in seconds (default: 2)
    pub refresh_period_secs: Option<u64>,

    /// Persistence debounce quiet period in milliseconds (default: 400)
    pub debounce_ms: Option<u64>,
}

/// Validated configuration ready for use
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub refresh_period: Duration,
    pub debounce_quiet: Duration,
}

impl ServiceConfig {
    fn from_raw(raw: RawConfig) -> Self {
        Self {
            data_dir: raw
                .data_dir
                .unwrap_or_else(|| PathBuf::from("/var/lib/latchd")),
            refresh_period: Duration::from_secs(raw.refresh_period_secs.unwrap_or(2).max(1)),
            debounce_quiet: Duration::from_millis(raw.debounce_ms.unwrap_or(400)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

/// Load configuration from a TOML file. A missing file yields defaults;
/// a present but unparsable file is an error worth failing startup over.
pub fn load_config(path: &Path) -> Result<ServiceConfig> {
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let raw: RawConfig =
        toml::from_str(&text).with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(ServiceConfig::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/latchd.toml")).unwrap();
        assert_eq!(config.refresh_period, Duration::from_secs(2));
        assert_eq!(config.debounce_quiet, Duration::from_millis(400));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/latchd"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latchd.toml");
        std::fs::write(&path, "refresh_period_secs = 5\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.refresh_period, Duration::from_secs(5));
        assert_eq!(config.debounce_quiet, Duration::from_millis(400));
    }

    #[test]
    fn zero_refresh_period_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latchd.toml");
        std::fs::write(&path, "refresh_period_secs = 0\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.refresh_period, Duration::from_secs(1));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latchd.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(load_config(&path).is_err());
    }
}
