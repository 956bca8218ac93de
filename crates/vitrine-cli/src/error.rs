//! CLI error handling.

use std::io;

use thiserror::Error;
use vitrine_common_config::ConfigError;
use vitrine_common_http::HttpError;
use vitrine_templates::TemplateError;

use crate::Exit;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up HTTP client: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Validation { message: String },

    #[error("{failed} of {total} templates failed to load")]
    Incomplete { failed: usize, total: usize },

    #[error("failed to encode output: {0}")]
    Output(String),
}

impl CliError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> Exit {
        match self {
            CliError::Config(_) => Exit::ConfigError,
            CliError::Http(_) => Exit::NetworkError,
            CliError::Template(err) => match err {
                TemplateError::Timeout { .. } | TemplateError::Load { .. } => Exit::NetworkError,
                TemplateError::Target { .. } => Exit::IoError,
                TemplateError::NotFound { .. } => Exit::GeneralError,
            },
            CliError::Io { .. } => Exit::IoError,
            CliError::Validation { .. } => Exit::ValidationError,
            CliError::Incomplete { .. } | CliError::Output(_) => Exit::GeneralError,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
