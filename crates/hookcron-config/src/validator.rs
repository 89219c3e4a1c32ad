//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, STORAGE_BACKENDS};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError::InvalidValue`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_dispatch(config, &mut result);
        Self::validate_shutdown(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        let backend = config.storage.backend.as_str();
        if !STORAGE_BACKENDS.contains(&backend) {
            result.add_error(ValidationError::new(
                "storage.backend",
                format!(
                    "Unknown storage backend '{}', valid values: {:?}",
                    backend, STORAGE_BACKENDS
                ),
            ));
            return;
        }

        if backend == "memory" {
            result.add_warning(ValidationWarning::new(
                "storage.backend",
                "In-memory storage loses every job on restart",
            ));
        } else if config.storage.path.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "storage.path",
                "SQLite backend requires a database path",
            ));
        }
    }

    fn validate_dispatch(config: &Config, result: &mut ValidationResult) {
        if config.dispatch.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "dispatch.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if config.dispatch.timeout_seconds > 600 {
            result.add_warning(ValidationWarning::new(
                "dispatch.timeout_seconds",
                "timeout_seconds is very high (>600), slow targets will hold shutdown",
            ));
        }
    }

    fn validate_shutdown(config: &Config, result: &mut ValidationResult) {
        if config.shutdown.drain_timeout_seconds == Some(0) {
            result.add_warning(ValidationWarning::new(
                "shutdown.drain_timeout_seconds",
                "A zero drain timeout abandons in-flight firings at shutdown",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
