//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use localchat_protocol::config::{Limits, LoggingConfig, ProtocolConfig};
use localchat_protocol::error::{ErrorKind, ProtocolError};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = ProtocolConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_default_limits() {
    let limits = Limits::default();
    assert_eq!(limits.max_user_name_length, 64);
    assert_eq!(limits.max_message_length, 64 * 1024);
    assert_eq!(limits.max_chat_name_length, 64);
    assert_eq!(limits.max_method_name_length, 64);
    assert_eq!(limits.max_user_count, 1024);
    assert_eq!(limits.max_message_count, 65_536);
}

#[test]
fn test_zero_limit_rejected() {
    let mut config = ProtocolConfig::default();
    config.limits.max_message_count = 0;

    let errors = config.validate();
    assert!(!errors.is_empty());
    assert!(errors
        .iter()
        .any(|e| e.contains("max_message_count must be greater than 0")));
}

#[test]
fn test_excessive_limit_rejected() {
    let mut config = ProtocolConfig::default();
    config.limits.max_message_length = 64 * 1024 * 1024;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("max_message_length too large")));
}

#[test]
fn test_single_character_user_names_rejected() {
    let mut config = ProtocolConfig::default();
    config.limits.max_user_name_length = 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("at least 2 characters")));
}

#[test]
fn test_log_file_in_missing_directory() {
    let mut config = ProtocolConfig::default();
    config.logging.file = Some("/definitely/not/here/protocol.log".into());

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Log file directory does not exist")));
}

#[test]
fn test_no_logging_output() {
    let config = ProtocolConfig {
        logging: LoggingConfig {
            console: false,
            file: None,
            ..LoggingConfig::default()
        },
        ..ProtocolConfig::default()
    };

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("No logging output")));
}

#[test]
fn test_validate_strict_collects_all_errors() {
    let mut config = ProtocolConfig::default();
    config.limits.max_user_count = 0;
    config.logging.console = false;

    match config.validate_strict() {
        Err(ProtocolError::ConfigError(msg)) => {
            assert!(msg.contains("max_user_count"));
            assert!(msg.contains("No logging output"));
        }
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = ProtocolConfig::from_toml(
        r#"
        [limits]
        max_user_name_length = 32
        max_message_count = 100

        [logging]
        app_name = "chat-node"
        log_level = "debug"
        console = true
        json = true
        "#,
    )
    .expect("Failed to parse config");

    assert_eq!(config.limits.max_user_name_length, 32);
    assert_eq!(config.limits.max_message_count, 100);
    assert_eq!(
        config.limits.max_message_length,
        Limits::default().max_message_length
    );
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json);
}

#[test]
fn test_invalid_toml() {
    let err = ProtocolConfig::from_toml("[limits]\nmax_user_count = \"many\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_invalid_log_level_in_toml() {
    let result = ProtocolConfig::from_toml(
        r#"
        [logging]
        app_name = "chat-node"
        log_level = "loud"
        console = true
        json = false
        "#,
    );
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_file_only_logging_from_toml() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = dir.path().join("chat.log");
    let config = ProtocolConfig::from_toml(&format!(
        "[logging]\nconsole = false\nfile = {:?}\n",
        log.display().to_string()
    ))
    .expect("Failed to parse config");

    assert_eq!(config.logging.file.as_deref(), Some(log.as_path()));
    assert_eq!(config.logging.log_level, Level::INFO);
    assert!(config.validate().is_empty());
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("protocol.toml");

    let config = ProtocolConfig::default_with_overrides(|c| {
        c.limits.max_chat_name_length = 128;
        c.logging.log_level = Level::WARN;
    });
    config.save_to_file(&path).expect("Failed to save config");

    let loaded = ProtocolConfig::from_file(&path).expect("Failed to load config");
    assert_eq!(loaded.limits, config.limits);
    assert_eq!(loaded.logging.log_level, Level::WARN);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = ProtocolConfig::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_example_config_parses() {
    let example = ProtocolConfig::example_config();
    assert!(example.contains("[limits]"));
    let parsed = ProtocolConfig::from_toml(&example).expect("Example config should parse");
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_env_overrides() {
    std::env::set_var("LOCALCHAT_MAX_USER_COUNT", "12");
    std::env::set_var("LOCALCHAT_LOG_LEVEL", "trace");
    let config = ProtocolConfig::from_env().expect("Failed to read environment");
    std::env::remove_var("LOCALCHAT_MAX_USER_COUNT");
    std::env::remove_var("LOCALCHAT_LOG_LEVEL");

    assert_eq!(config.limits.max_user_count, 12);
    assert_eq!(config.logging.log_level, Level::TRACE);
    assert_eq!(
        config.limits.max_message_count,
        Limits::default().max_message_count
    );
}
