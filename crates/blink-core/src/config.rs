//! Optional `blink.toml` configuration.

use crate::error::{BlinkError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the base58 private key.
pub const PRIVATE_KEY_ENV: &str = "BLINK_PRIVATE_KEY";

pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Default re-hash interval for the monitor.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(DEFAULT_INTERVAL_MS);

/// Settings for a long-running tracking process.
///
/// ```toml
/// interval_ms = 2000
/// track = ["server.rs", "/etc/app/config.json"]
/// private_key_env = "APP_SIGNING_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlinkConfig {
    pub interval_ms: u64,
    pub track: Vec<PathBuf>,
    pub private_key_env: String,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            track: Vec::new(),
            private_key_env: PRIVATE_KEY_ENV.to_string(),
        }
    }
}

impl BlinkConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a file. Relative `track` entries are resolved against the
    /// file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| BlinkError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&source)?;
        if let Some(base) = path.parent() {
            for entry in &mut config.track {
                if entry.is_relative() {
                    *entry = base.join(&*entry);
                }
            }
        }
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlinkConfig::from_toml("").unwrap();
        assert_eq!(config, BlinkConfig::default());
        assert_eq!(config.interval(), DEFAULT_INTERVAL);
        assert_eq!(config.private_key_env, "BLINK_PRIVATE_KEY");
    }

    #[test]
    fn test_parse_full() {
        let config = BlinkConfig::from_toml(
            r#"
            interval_ms = 250
            track = ["a.txt", "/abs/b.txt"]
            private_key_env = "OTHER_KEY"
            "#,
        )
        .unwrap();
        assert_eq!(config.interval(), Duration::from_millis(250));
        assert_eq!(config.track.len(), 2);
        assert_eq!(config.private_key_env, "OTHER_KEY");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BlinkConfig::from_toml("intervl_ms = 3").unwrap_err();
        assert!(matches!(err, BlinkError::ConfigParse(_)));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blink.toml");
        fs::write(&path, "track = [\"watched.txt\"]\n").unwrap();

        let config = BlinkConfig::load(&path).unwrap();
        assert_eq!(config.track, vec![dir.path().join("watched.txt")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BlinkConfig::load("/nonexistent/blink.toml").unwrap_err();
        assert!(matches!(err, BlinkError::Config { .. }));
    }
}
