//! Render targets: containers that receive rendered markup.

use crate::error::TargetError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Markup written in place of a template that failed to load.
pub const FALLBACK_MARKUP: &str = r#"<div class="blocks__single section-title">
  <p style="color: #ff6b6b;">Error loading content. Please refresh the page.</p>
</div>
"#;

/// A collaborator that installs markup as a container's entire content.
///
/// The pipeline never reads back or diffs existing content.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    async fn write(&self, selector: &str, markup: &str) -> Result<(), TargetError>;
}

/// Keeps container contents in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    contents: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `selector`.
    pub fn contents(&self, selector: &str) -> Option<String> {
        self.contents.lock().get(selector).cloned()
    }

    /// Selectors in the order they were written.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl RenderTarget for MemoryTarget {
    async fn write(&self, selector: &str, markup: &str) -> Result<(), TargetError> {
        self.contents
            .lock()
            .insert(selector.to_string(), markup.to_string());
        self.writes.lock().push(selector.to_string());
        Ok(())
    }
}

/// Writes each container to `<root>/<id>.html`.
///
/// Selectors may carry a leading `#` or `.`; the remainder must be made of
/// ASCII letters, digits, `-` and `_`.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that backs `selector`.
    pub fn path_for(&self, selector: &str) -> Result<PathBuf, TargetError> {
        let id = selector.trim_start_matches(['#', '.']);
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(TargetError::InvalidSelector(selector.to_string()));
        }
        Ok(self.root.join(format!("{}.html", id)))
    }
}

#[async_trait]
impl RenderTarget for DirectoryTarget {
    async fn write(&self, selector: &str, markup: &str) -> Result<(), TargetError> {
        let path = self.path_for(selector)?;
        let io_err = |source| TargetError::Io {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;
        tokio::fs::write(&path, markup).await.map_err(io_err)?;
        Ok(())
    }
}
