//! Device configuration for the handheld client.
//!
//! Loaded from a JSON file; the search order is the `FLOORTRACK_CONFIG`
//! environment variable, then `/etc/floortrack/config.json`, then
//! `~/.floortrack/config.json`. A missing config is the one startup
//! condition allowed to halt the process: without an API URL and token
//! the device cannot do anything useful.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable overriding the config file location.
pub const ENV_CONFIG_PATH: &str = "FLOORTRACK_CONFIG";

/// Fixed search locations tried after the env override.
const SEARCH_PATHS: &[&str] = &["/etc/floortrack/config.json"];

/// Per-device configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HandheldConfig {
    /// Scan ingestion endpoint, e.g. `http://server:3000/api/v1/scans`.
    pub api_url: String,
    /// Bearer token sent with every POST.
    pub api_token: String,
    /// Device ID reported in each payload.
    pub device_id: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Queue file location.
    #[serde(default = "default_queue_path")]
    pub queue_path: PathBuf,
    /// mirrorctl state file location.
    #[serde(default = "default_mirror_state_path")]
    pub mirror_state_path: PathBuf,
    /// mirrorctl audit log location.
    #[serde(default = "default_mirror_audit_path")]
    pub mirror_audit_path: PathBuf,
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_queue_path() -> PathBuf {
    home_relative(".floortrack/scan_queue.json")
}

fn default_mirror_state_path() -> PathBuf {
    home_relative(".floortrack/mirrorctl_state.json")
}

fn default_mirror_audit_path() -> PathBuf {
    home_relative(".floortrack/mirrorctl_audit.log")
}

fn home_relative(rest: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home).join(rest),
        None => PathBuf::from(rest),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Config file not found. Set {ENV_CONFIG_PATH} or create /etc/floortrack/config.json"
    )]
    NotFound,

    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl HandheldConfig {
    /// Load from the first existing candidate path.
    pub fn load() -> Result<Self, ConfigError> {
        for candidate in candidate_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }
        Err(ConfigError::NotFound)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(explicit) = std::env::var_os(ENV_CONFIG_PATH) {
        paths.push(PathBuf::from(explicit));
    }
    paths.extend(SEARCH_PATHS.iter().map(PathBuf::from));
    paths.push(home_relative(".floortrack/config.json"));
    paths
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: HandheldConfig = serde_json::from_str(
            r#"{"api_url": "http://server/api/v1/scans", "api_token": "t", "device_id": "HH-1"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_seconds, 5);
        assert!(config.queue_path.ends_with(".floortrack/scan_queue.json"));
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let result: Result<HandheldConfig, _> =
            serde_json::from_str(r#"{"api_url": "http://server"}"#);
        assert!(result.is_err());
    }
}
