//! Where template text comes from.

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vitrine_common_config::VitrineConfig;
use vitrine_common_http::{HttpClient, HttpConfig, HttpError};

/// A provider of raw template text.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// The location `name` is fetched from.
    fn locate(&self, name: &str) -> String;

    /// Perform one fetch attempt for `name`.
    async fn fetch(&self, name: &str) -> Result<String, FetchError>;
}

/// `<base><name>.<extension>`
pub fn template_location(base: &str, name: &str, extension: &str) -> String {
    format!("{}{}.{}", base, name, extension)
}

/// Fetches templates over HTTP with one GET per attempt.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: HttpClient,
    base_url: String,
    extension: String,
}

impl HttpSource {
    pub fn new(client: HttpClient, base_url: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for HttpSource {
    fn locate(&self, name: &str) -> String {
        template_location(&self.base_url, name, &self.extension)
    }

    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let url = self.locate(name);
        self.client.get_text(&url).await.map_err(FetchError::from)
    }
}

/// Reads templates from the local filesystem.
///
/// A missing file is reported like an HTTP 404 so it goes through the same
/// retry path as a missing remote template.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_path: String,
    extension: String,
}

impl FileSource {
    pub fn new(base_path: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for FileSource {
    fn locate(&self, name: &str) -> String {
        template_location(&self.base_path, name, &self.extension)
    }

    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let path = PathBuf::from(self.locate(name));
        tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::Http { status: 404 },
            _ => FetchError::Network(format!("{}: {}", path.display(), e)),
        })
    }
}

fn is_url(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// Build the source described by `config`: HTTP for URL base paths, the
/// filesystem otherwise.
pub fn source_for(config: &VitrineConfig) -> Result<Arc<dyn TemplateSource>, HttpError> {
    let templates = &config.templates;

    if !is_url(&templates.base_path) {
        return Ok(Arc::new(FileSource::new(
            templates.base_path.clone(),
            templates.extension.clone(),
        )));
    }

    let mut http = HttpConfig {
        connect_timeout: Duration::from_millis(config.http.connect_timeout_ms),
        ..HttpConfig::default()
    };
    // The pipeline enforces its own deadline; the client's must not be shorter.
    http.request_timeout = http.request_timeout.max(templates.timeout());
    if let Some(agent) = &config.http.user_agent {
        http.user_agent = agent.clone();
    }

    let client = HttpClient::with_config(http)?;
    Ok(Arc::new(HttpSource::new(
        client,
        templates.base_path.clone(),
        templates.extension.clone(),
    )))
}
