//! Unit tests for config file resolution and TOML loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate VOXCHECK_TEST_CONFIG are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use voxcheck_common::config::{load_toml_config, resolve_config_path, LoggingConfig};
use voxcheck_common::Error;

const ENV_VAR: &str = "VOXCHECK_TEST_CONFIG";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct TestConfig {
    port: Option<u16>,
    logging: LoggingConfig,
}

fn write_temp_toml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(ENV_VAR, "/tmp/voxcheck-env.toml");

    let path = resolve_config_path(None, ENV_VAR, "voxcheck-test");
    assert_eq!(path, Some(PathBuf::from("/tmp/voxcheck-env.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_overrides_env_var() {
    env::set_var(ENV_VAR, "/tmp/voxcheck-env.toml");

    let path = resolve_config_path(Some(Path::new("/tmp/cli.toml")), ENV_VAR, "voxcheck-test");
    assert_eq!(path, Some(PathBuf::from("/tmp/cli.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(ENV_VAR, "   ");

    let path = resolve_config_path(None, ENV_VAR, "voxcheck-module-that-has-no-file");
    assert_ne!(path, Some(PathBuf::from("   ")));

    env::remove_var(ENV_VAR);
}

#[test]
fn test_load_valid_toml() {
    let file = write_temp_toml(
        r#"
port = 9001

[logging]
level = "debug"
"#,
    );

    let config: TestConfig = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.port, Some(9001));
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
}

#[test]
fn test_load_partial_toml_fills_defaults() {
    let file = write_temp_toml("port = 1234\n");

    let config: TestConfig = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.port, Some(1234));
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let file = write_temp_toml("port = [unterminated\n");

    let result: Result<TestConfig, Error> = load_toml_config(Some(file.path()));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("Parse")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_not_fatal() {
    let config: TestConfig =
        load_toml_config(Some(Path::new("/nonexistent/dir/voxcheck.toml"))).unwrap();
    assert_eq!(config, TestConfig::default());
}
