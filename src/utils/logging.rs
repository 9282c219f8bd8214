//! # Logging
//!
//! Installs the global `tracing` subscriber described by a [`LoggingConfig`].
//!
//! The configured level is the default filter; `RUST_LOG` directives override
//! it. Output goes to stderr, to an appended log file, or both, formatted as
//! plain text or JSON lines.

use crate::config::LoggingConfig;
use crate::error::{constants, ProtocolError, Result};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// # Errors
/// - `ProtocolError::ConfigError` if the configuration is invalid, the log
///   file cannot be opened, or a global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ProtocolError::ConfigError(errors.join("; ")));
    }

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console {
        layers.push(console_layer(config.json));
    }

    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ProtocolError::ConfigError(format!("Failed to open log file {}: {e}", path.display()))
            })?;
        layers.push(file_layer(Arc::new(file), config.json));
    }

    layers.push(Box::new(filter));

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|_| ProtocolError::ConfigError(constants::ERR_LOGGING_INITIALIZED.to_string()))?;

    tracing::info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        Box::new(fmt::layer().json().with_writer(std::io::stderr))
    } else {
        Box::new(fmt::layer().with_writer(std::io::stderr))
    }
}

fn file_layer(file: Arc<std::fs::File>, json: bool) -> BoxedLayer {
    if json {
        Box::new(fmt::layer().json().with_ansi(false).with_writer(file))
    } else {
        Box::new(fmt::layer().with_ansi(false).with_writer(file))
    }
}
