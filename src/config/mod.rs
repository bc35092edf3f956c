// SPDX-License-Identifier: MPL-2.0
//! This module handles the player configuration, including loading and saving
//! it to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use polyglot_player::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.server_url = Some("http://media.example:8080".to_string());
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_file = PathBuf::from("./temp_config_dir/test_settings.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert_eq!(loaded.server_url, config.server_url);
//! ```

pub mod defaults;
mod locale;

pub use defaults::*;
pub use locale::resolve_subtitle_language;

use crate::application::port::EngineOptions;
use crate::domain::diagnostics::HistoryCapacity;
use crate::error::Result;
use crate::video_player::AcquirePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "PolyglotPlayer";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "POLYGLOT_PLAYER_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_subtitle_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_rates: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            preferred_subtitle_language: None,
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
            playback_rates: None,
            history_capacity: None,
        }
    }
}

impl Config {
    /// Server URL without a trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        self.server_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Bounded poll settings, clamped to the allowed ranges.
    #[must_use]
    pub fn acquire_policy(&self) -> AcquirePolicy {
        let interval_ms = self
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        let attempts = self
            .max_poll_attempts
            .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS)
            .clamp(MIN_POLL_ATTEMPTS, MAX_POLL_ATTEMPTS);
        AcquirePolicy::new(Duration::from_millis(interval_ms), attempts)
    }

    /// Engine options with the configured rate menu.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        let mut options = EngineOptions::default();
        if let Some(rates) = self.playback_rates.as_ref().filter(|r| !r.is_empty()) {
            options.playback_rates = rates.clone();
        }
        options
    }

    #[must_use]
    pub fn history_capacity(&self) -> HistoryCapacity {
        HistoryCapacity::new(self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY))
    }
}

/// Resolves the default config file path.
///
/// `POLYGLOT_PLAYER_CONFIG_DIR` wins over the platform config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir).join(CONFIG_FILE));
    }
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid settings file, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_server() {
        let config = Config {
            server_url: Some("http://media.local:9000".to_string()),
            preferred_subtitle_language: Some("ja".to_string()),
            poll_interval_ms: Some(250),
            max_poll_attempts: Some(8),
            playback_rates: Some(vec![1.0, 2.0]),
            history_capacity: Some(64),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "server_url = \"http://x:1/\"\n").expect("write");

        let loaded = load_from_path(&config_path).expect("load");
        assert_eq!(loaded.server_url(), "http://x:1");
        assert_eq!(
            loaded.acquire_policy(),
            AcquirePolicy::new(
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
                DEFAULT_MAX_POLL_ATTEMPTS
            )
        );
    }

    #[test]
    fn acquire_policy_is_clamped() {
        let config = Config {
            poll_interval_ms: Some(0),
            max_poll_attempts: Some(1_000_000),
            ..Config::default()
        };
        let policy = config.acquire_policy();
        assert_eq!(policy.interval(), Duration::from_millis(MIN_POLL_INTERVAL_MS));
        assert_eq!(policy.max_attempts(), MAX_POLL_ATTEMPTS);
    }

    #[test]
    fn engine_options_use_configured_rates() {
        let config = Config {
            playback_rates: Some(vec![0.75, 1.0]),
            ..Config::default()
        };
        assert_eq!(config.engine_options().playback_rates, vec![0.75, 1.0]);

        let empty = Config {
            playback_rates: Some(Vec::new()),
            ..Config::default()
        };
        assert_eq!(empty.engine_options().playback_rates, vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn empty_server_url_uses_default() {
        let config = Config {
            server_url: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);
    }
}
