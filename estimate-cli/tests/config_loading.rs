//! Loads configuration and schema files from the on-disk fixtures.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use estimate_cli::{
    AppConfig,
    config::ConfigError,
    schema_loader::{self, SchemaLoadError},
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_config_fixture_sections_are_read() {
    let config = AppConfig::load(&fixture("estimate-form.toml")).expect("fixture config loads");

    assert_eq!(config.transport.backend, "outbox");
    assert_eq!(config.transport.target, "/var/spool/estimates");
    assert_eq!(config.submit.policy().max_attempts, 3);
    assert_eq!(config.submit.policy().timeout, Duration::from_secs(10));
    assert_eq!(config.submit.policy().backoff, Duration::from_millis(250));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.stdout);
}

#[test]
fn test_schema_path_is_relative_to_config_file() {
    let config = AppConfig::load(&fixture("estimate-form.toml")).unwrap();

    assert_eq!(config.schema, Some(fixture("small_schema.toml")));

    let schema = schema_loader::load(config.schema.as_deref()).expect("referenced schema loads");
    assert_eq!(schema.total_steps(), 2);
    assert_eq!(schema.step_of("terms"), Some(2));
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let err = AppConfig::load(Path::new("/this/path/does/not/exist.toml")).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_no_config_file_means_defaults() {
    let config = AppConfig::load_or_default(None).unwrap();

    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_schema_with_unknown_dependency_is_rejected() {
    let err = schema_loader::load_from_file(&fixture("broken_schema.toml")).unwrap_err();

    assert!(matches!(err, SchemaLoadError::Invalid(_)));
    assert!(err.to_string().contains("insuranceClaim"), "{err}");
}

#[test]
fn test_missing_schema_file_is_an_io_error() {
    let err = schema_loader::load_from_file(&fixture("nope.toml")).unwrap_err();

    assert!(matches!(err, SchemaLoadError::Io { .. }));
}
