//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var} could not be parsed: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("{0} environment variable has to be set")]
    MissingEnv(&'static str),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => MonitorConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    if config.health.error_threshold.is_none() {
        return Err(ConfigError::MissingEnv("RESTART_THRESHOLD"));
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `RESTART_THRESHOLD`, `DEBUG` and `PORT`.
///
/// An unparsable threshold or port is fatal; an unparsable `DEBUG` is
/// treated as false.
pub fn apply_env_overrides(
    config: &mut MonitorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup("RESTART_THRESHOLD") {
        let threshold = value.trim().parse().map_err(|_| ConfigError::Env {
            var: "RESTART_THRESHOLD",
            value: value.clone(),
        })?;
        config.health.error_threshold = Some(threshold);
    }

    if let Some(value) = lookup("DEBUG") {
        config.observability.debug = value.trim().parse().unwrap_or(false);
    }

    if let Some(value) = lookup("PORT") {
        let port: u16 = value.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: value.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    Ok(())
}
