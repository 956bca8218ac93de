//! HTTP client used to fetch template text.

use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// Client settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole-request deadline. Callers that impose their own deadline should
    /// keep this at least as long as that deadline.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("vitrine/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    /// A response arrived with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },
}

impl HttpError {
    /// The response status behind this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(e)
        }
    }
}

/// Shared, cheaply cloneable GET client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        let inner = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()
            .map_err(HttpError::ClientBuild)?;
        Ok(Self { inner })
    }

    /// GET `url` and return its body. Any non-2xx status is an error and
    /// its body is discarded.
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        tracing::debug!("GET {}", url);
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        tracing::debug!("GET {} -> {}", url, status);

        ensure_success(status)?;
        Ok(response.text().await?)
    }
}

fn ensure_success(status: StatusCode) -> Result<(), HttpError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(HttpError::Status {
            status: status.as_u16(),
        })
    }
}
