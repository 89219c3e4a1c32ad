use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_empty_host() {
    let mut config = Config::default();
    config.server.host.clear();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_unknown_backend() {
    let mut config = Config::default();
    config.storage.backend = "postgres".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "storage.backend" && e.message.contains("postgres")));
}

#[test]
fn test_validate_memory_backend_warns() {
    let mut config = Config::default();
    config.storage.backend = "memory".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "storage.backend"));
}

#[test]
fn test_validate_zero_dispatch_timeout() {
    let mut config = Config::default();
    config.dispatch.timeout_seconds = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "dispatch.timeout_seconds"));
}

#[test]
fn test_validate_high_dispatch_timeout_warning() {
    let mut config = Config::default();
    config.dispatch.timeout_seconds = 3600;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.server.port = 0;
    config.dispatch.timeout_seconds = 0;

    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
}

#[test]
fn test_into_result_passes_warnings_through() {
    let mut config = Config::default();
    config.shutdown.drain_timeout_seconds = Some(0);

    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].path, "shutdown.drain_timeout_seconds");
}

#[test]
fn test_validation_error_new() {
    let err = ValidationError::new("server.port", "must be positive");
    assert_eq!(err.path, "server.port");
    assert_eq!(err.message, "must be positive");
}
