//! Environment variable handling.

use std::env;
use thiserror::Error;

use crate::types::VitrineConfig;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    pub const VITRINE_TEMPLATE_PATH: &str = "VITRINE_TEMPLATE_PATH";
    pub const VITRINE_TEMPLATE_EXTENSION: &str = "VITRINE_TEMPLATE_EXTENSION";
    pub const VITRINE_MAX_RETRIES: &str = "VITRINE_MAX_RETRIES";
    pub const VITRINE_RETRY_DELAY_MS: &str = "VITRINE_RETRY_DELAY_MS";
    pub const VITRINE_TIMEOUT_MS: &str = "VITRINE_TIMEOUT_MS";
    pub const VITRINE_RETRY_ON_TIMEOUT: &str = "VITRINE_RETRY_ON_TIMEOUT";
}

/// Environment access.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Self {
        // Later files override earlier ones.
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        Self { _guard: () }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_int<T: std::str::FromStr>(var: &str, value: Option<String>) -> Result<Option<T>, EnvError> {
    match value {
        Some(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
            var: var.to_string(),
            message: format!("expected integer, got '{}'", v),
        }),
        None => Ok(None),
    }
}

/// Apply `VITRINE_*` overrides from the process environment.
pub fn apply_env_overrides(config: &mut VitrineConfig) -> Result<(), EnvError> {
    apply_overrides_from(config, |var| env::var(var).ok())
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_from<F>(config: &mut VitrineConfig, lookup: F) -> Result<(), EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    let templates = &mut config.templates;

    if let Some(path) = lookup(vars::VITRINE_TEMPLATE_PATH) {
        templates.base_path = path;
    }
    if let Some(ext) = lookup(vars::VITRINE_TEMPLATE_EXTENSION) {
        templates.extension = ext;
    }
    if let Some(n) = parse_int(vars::VITRINE_MAX_RETRIES, lookup(vars::VITRINE_MAX_RETRIES))? {
        templates.max_retries = n;
    }
    if let Some(ms) = parse_int(vars::VITRINE_RETRY_DELAY_MS, lookup(vars::VITRINE_RETRY_DELAY_MS))? {
        templates.retry_delay_ms = ms;
    }
    if let Some(ms) = parse_int(vars::VITRINE_TIMEOUT_MS, lookup(vars::VITRINE_TIMEOUT_MS))? {
        templates.timeout_ms = ms;
    }
    if let Some(flag) = lookup(vars::VITRINE_RETRY_ON_TIMEOUT) {
        templates.retry_on_timeout = parse_bool(&flag);
    }

    Ok(())
}
