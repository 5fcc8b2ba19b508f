//! Relay configuration: `~/.probe/config.yaml`, then environment overrides

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_RELAY_URL, DEFAULT_TIMEOUT_MS};
use crate::error::ConfigError;

pub const ENV_RELAY_URL: &str = "PROBE_RELAY_URL";
pub const ENV_CSRF_TOKEN: &str = "PROBE_CSRF_TOKEN";
pub const ENV_TIMEOUT_MS: &str = "PROBE_TIMEOUT_MS";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the relay, e.g. `http://127.0.0.1:8000`
    pub relay_url: String,
    /// Token the relay expects in `X-CSRFToken`
    pub csrf_token: Option<String>,
    /// Client-side timeout for a relay round-trip
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            relay_url: String::from(DEFAULT_RELAY_URL),
            csrf_token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load the default file (if any) and apply `PROBE_*` environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RELAY_URL).filter(|v| !v.trim().is_empty()) {
            self.relay_url = url.trim().to_string();
        }
        if let Some(token) = lookup(ENV_CSRF_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.csrf_token = Some(token.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "relay_url: https://probe.internal\ncsrf_token: abc123\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.relay_url, "https://probe.internal");
        assert_eq!(config.csrf_token.as_deref(), Some("abc123"));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "timeout_ms: [not, a, number]\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CSRF_TOKEN, " tok "),
            (ENV_TIMEOUT_MS, "5000"),
            (ENV_RELAY_URL, ""),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.csrf_token.as_deref(), Some("tok"));
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);

        let bad: HashMap<&str, &str> = HashMap::from([(ENV_TIMEOUT_MS, "soon")]);
        let err = Config::default()
            .apply_overrides(|key| bad.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }
}
