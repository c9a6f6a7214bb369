//! Table-driven tests for configuration loading and validation.

mod common;

use common::TestHarness;
use moodmail::config::{load_config, load_config_from_str, resolve_config, LogFormat};
use serial_test::serial;

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_empty",
        config_json: "{}",
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "server": { "host": "127.0.0.1", "port": 8081 },
            "database": { "path": "/tmp/moodmail-test.db" },
            "classifier": {
                "baseUrl": "https://inference.example.com/models",
                "model": "org/emotions",
                "tokenEnvVar": "EMOTION_API_TOKEN"
            },
            "logging": { "level": "moodmail=debug,info", "format": "json" }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: r#"{ "server": "#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
    ConfigTestCase {
        name: "invalid_port_type",
        config_json: r#"{ "server": { "port": "http" } }"#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
    ConfigTestCase {
        name: "invalid_port_zero",
        config_json: r#"{ "server": { "port": 0 } }"#,
        should_succeed: false,
        expected_error: Some("server.port"),
    },
    ConfigTestCase {
        name: "invalid_empty_model",
        config_json: r#"{ "classifier": { "model": "" } }"#,
        should_succeed: false,
        expected_error: Some("classifier.model"),
    },
    ConfigTestCase {
        name: "invalid_classifier_url",
        config_json: r#"{ "classifier": { "baseUrl": "inference.example.com" } }"#,
        should_succeed: false,
        expected_error: Some("classifier.baseUrl"),
    },
    ConfigTestCase {
        name: "invalid_log_format",
        config_json: r#"{ "logging": { "format": "xml" } }"#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
];

#[test]
fn test_json_config_loading() {
    for test_case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(test_case.config_json);

        if test_case.should_succeed {
            assert!(
                result.is_ok(),
                "Test '{}': Expected success but got error: {:?}",
                test_case.name,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Test '{}': Expected error but got success",
                test_case.name
            );

            if let Some(expected_error) = test_case.expected_error {
                let error_msg = result.err().unwrap().to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}': Expected error containing '{}', got '{}'",
                    test_case.name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

const ENV_KEYS: &[&str] = &[
    "MOODMAIL_CONFIG",
    "PORT",
    "HOST",
    "DATABASE_PATH",
    "CLASSIFIER_URL",
    "CLASSIFIER_MODEL",
    "LOG_LEVEL",
    "LOG_FORMAT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_load_config_from_file() {
    let harness = TestHarness::new();
    let path = harness.write_config(
        "moodmail.json",
        r#"{ "server": { "port": 9000 }, "logging": { "format": "json" } }"#,
    );

    let config = load_config(&path).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_resolve_config_defaults() {
    clear_env();

    let config = resolve_config(None).unwrap();

    assert_eq!(config.server.bind_address(), "0.0.0.0:3001");
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_resolve_config_env_overrides_file() {
    clear_env();
    let harness = TestHarness::new();
    let path = harness.write_config(
        "moodmail.json",
        r#"{ "server": { "port": 9000 }, "classifier": { "model": "from/file" } }"#,
    );
    std::env::set_var("PORT", "9100");
    std::env::set_var("DATABASE_PATH", "/tmp/env.db");

    let config = resolve_config(Some(&path));
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.classifier.model, "from/file");
    assert_eq!(
        config.database.path.as_deref(),
        Some(std::path::Path::new("/tmp/env.db"))
    );
}

#[test]
#[serial]
fn test_resolve_config_from_env_path() {
    clear_env();
    let harness = TestHarness::new();
    let path = harness.write_config("env.json", r#"{ "server": { "host": "127.0.0.1" } }"#);
    std::env::set_var("MOODMAIL_CONFIG", &path);

    let config = resolve_config(None);
    clear_env();

    assert_eq!(config.unwrap().server.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_resolve_config_rejects_invalid_env() {
    clear_env();
    std::env::set_var("CLASSIFIER_URL", "not-a-url");

    let result = resolve_config(None);
    clear_env();

    let err = result.unwrap_err().to_string();
    assert!(err.contains("classifier.baseUrl"), "got '{}'", err);
}
