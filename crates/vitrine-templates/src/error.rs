//! Error types for the template pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use vitrine_common_http::HttpError;

/// Failure of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response before the per-attempt deadline.
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    /// Response with a non-success status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Whether the retry loop may try again after this failure.
    pub fn is_retryable(&self, retry_on_timeout: bool) -> bool {
        match self {
            FetchError::Timeout { .. } => retry_on_timeout,
            FetchError::Http { .. } | FetchError::Network(_) => true,
        }
    }
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        match e.status() {
            Some(status) => FetchError::Http { status },
            None => FetchError::Network(e.to_string()),
        }
    }
}

/// Failure writing to a render target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid selector: '{0}'")]
    InvalidSelector(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The fetch deadline elapsed and timeouts are not retried.
    #[error("template {name} timed out after {after:?}")]
    Timeout { name: String, after: Duration },

    /// Retries exhausted; carries the last attempt's failure.
    #[error("failed to load {name} after {attempts} attempt(s): {source}")]
    Load {
        name: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    /// Render requested for a name that was never loaded or registered.
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// The render target rejected the write.
    #[error("failed to write template to {selector}: {message}")]
    Target { selector: String, message: String },
}

impl TemplateError {
    /// Name of the template the error concerns, if any.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            TemplateError::Timeout { name, .. }
            | TemplateError::Load { name, .. }
            | TemplateError::NotFound { name } => Some(name),
            TemplateError::Target { .. } => None,
        }
    }

    pub(crate) fn target(selector: &str, err: TargetError) -> Self {
        TemplateError::Target {
            selector: selector.to_string(),
            message: err.to_string(),
        }
    }
}
