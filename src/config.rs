use crate::logging::{LogLevel, LogRotationPolicy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default worker tick, also the worst-case delivery latency for a
/// submission that misses its wake signal.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_THREAD_NAME: &str = "prong-uplink";

/// Scheduler settings, loadable from a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub tick_interval_ms: u64,
    pub thread_name: String,
    pub log_level: LogLevel,
    pub log_rotation: LogRotationPolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            log_level: LogLevel::Info,
            log_rotation: LogRotationPolicy::default(),
        }
    }
}

impl UploadConfig {
    /// Loads and validates a config file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let payload = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&payload).map_err(|source| ConfigError::Parse {
                path: Some(path_ref.to_path_buf()),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than zero".into(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid("thread_name must not be empty".into()));
        }
        if self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid(
                "thread_name must not contain NUL bytes".into(),
            ));
        }
        if self.log_rotation.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "log_rotation.max_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Errors surfaced while loading scheduler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config{}: {source}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}
