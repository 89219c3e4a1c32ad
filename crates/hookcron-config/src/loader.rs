//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        config.storage.path = Self::expand_path_buf(&config.storage.path);
        config.logging.directory = config
            .logging
            .directory
            .as_deref()
            .map(Self::expand_path_buf);
        Ok(config)
    }

    /// Render a configuration back to TOML.
    pub fn to_toml(config: &Config) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/hookcron`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(Self::expand_path(s)),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, "sqlite");
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [storage]
            backend = "memory"
            path = "/var/lib/hookcron/jobs.db"

            [dispatch]
            timeout_seconds = 10
            user_agent = "probe/1.0"

            [logging]
            level = "debug"
            directory = "/var/log/hookcron"
            json = true

            [shutdown]
            drain_timeout_seconds = 20
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/hookcron/jobs.db"));
        assert_eq!(config.dispatch.timeout_seconds, 10);
        assert_eq!(config.dispatch.user_agent.as_deref(), Some("probe/1.0"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, Some(PathBuf::from("/var/log/hookcron")));
        assert!(config.logging.json);
        assert_eq!(config.shutdown.drain_timeout_seconds, Some(20));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/hookcron.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/hookcron.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_or_default_keeps_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server").unwrap();
        assert!(matches!(
            ConfigLoader::load_or_default(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = ConfigLoader::load_str("[server]\nport = \"eighty\"");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("HOOKCRON_TEST_DB_PATH", "/tmp/hookcron-test.db");
        }
        let config = ConfigLoader::load_str("[storage]\npath = \"${HOOKCRON_TEST_DB_PATH}\"").unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/hookcron-test.db"));
        unsafe {
            std::env::remove_var("HOOKCRON_TEST_DB_PATH");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_HOOKCRON_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(ref v)) if v == "NONEXISTENT_HOOKCRON_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_storage_path_tilde_expanded() {
        let config = ConfigLoader::load_str("[storage]\npath = \"~/hookcron.db\"").unwrap();
        let path = config.storage.path.to_string_lossy().to_string();
        assert!(!path.starts_with('~'));
        assert!(path.ends_with("/hookcron.db"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        let path = "/usr/local/bin";
        assert_eq!(ConfigLoader::expand_path(path), path);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let config = ConfigLoader::load_str("[server]\nport = 7070").unwrap();
        let rendered = ConfigLoader::to_toml(&config).unwrap();
        let reparsed = ConfigLoader::load_str(&rendered).unwrap();
        assert_eq!(reparsed.server.port, 7070);
    }
}
