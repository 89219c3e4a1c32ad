//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend names accepted in `[storage] backend`.
pub const STORAGE_BACKENDS: [&str; 2] = ["sqlite", "memory"];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Job storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `sqlite` or `memory`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// SQLite database file. `~` is expanded.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/hookcron.db")
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_timeout")]
    pub timeout_seconds: u64,

    /// Defaults to `hookcron/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_dispatch_timeout(),
            user_agent: None,
        }
    }
}

fn default_dispatch_timeout() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Emit JSON lines on the console instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Shutdown configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Upper bound on waiting for in-flight firings. Unbounded when unset.
    #[serde(default)]
    pub drain_timeout_seconds: Option<u64>,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
