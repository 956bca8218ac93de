//! Configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrineConfig {
    /// Template pipeline configuration.
    pub templates: TemplatesConfig,
    /// HTTP client configuration.
    pub http: HttpSection,
}

/// Template pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Prefix prepended to every template name. A URL prefix
    /// (`http://`, `https://`) selects the network source, anything else is
    /// a directory.
    pub base_path: String,
    /// Extension appended to every template name, without the dot.
    pub extension: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before each retry (ms).
    pub retry_delay_ms: u64,
    /// Per-attempt deadline (ms).
    pub timeout_ms: u64,
    /// Treat an elapsed deadline as retryable.
    pub retry_on_timeout: bool,
}

impl TemplatesConfig {
    /// Delay before each retry.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Per-attempt deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            base_path: "templates/".to_string(),
            extension: "hbs".to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 5000,
            retry_on_timeout: false,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Connection timeout (ms).
    pub connect_timeout_ms: u64,
    /// User agent override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            user_agent: None,
        }
    }
}
