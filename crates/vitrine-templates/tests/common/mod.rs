//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use vitrine_templates::{FetchError, RetryPolicy, TemplatePipeline, TemplateSource};

/// In-memory source with scripted failures, latency and call counting.
#[derive(Default)]
pub struct ScriptedSource {
    templates: HashMap<String, String>,
    latency: HashMap<String, Duration>,
    fail_first: Mutex<HashMap<String, u32>>,
    broken: HashSet<String>,
    hanging: HashSet<String>,
    calls: Mutex<HashMap<String, u32>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: &str, text: &str) -> Self {
        self.templates.insert(name.to_string(), text.to_string());
        self
    }

    /// Delay every fetch of `name` by `latency`.
    pub fn with_latency(mut self, name: &str, latency: Duration) -> Self {
        self.latency.insert(name.to_string(), latency);
        self
    }

    /// Fail the first `times` fetches of `name` with a network error.
    pub fn failing_first(self, name: &str, times: u32) -> Self {
        self.fail_first.lock().insert(name.to_string(), times);
        self
    }

    /// Every fetch of `name` answers HTTP 500.
    pub fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    /// Fetches of `name` never resolve.
    pub fn hanging(mut self, name: &str) -> Self {
        self.hanging.insert(name.to_string());
        self
    }

    pub fn calls(&self, name: &str) -> u32 {
        self.calls.lock().get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl TemplateSource for ScriptedSource {
    fn locate(&self, name: &str) -> String {
        format!("scripted://{}", name)
    }

    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        *self.calls.lock().entry(name.to_string()).or_default() += 1;

        if let Some(latency) = self.latency.get(name) {
            tokio::time::sleep(*latency).await;
        }
        if self.hanging.contains(name) {
            std::future::pending::<()>().await;
        }
        if self.broken.contains(name) {
            return Err(FetchError::Http { status: 500 });
        }

        let should_fail = {
            let mut fail_first = self.fail_first.lock();
            match fail_first.get_mut(name) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(FetchError::Network("connection reset".to_string()));
        }

        self.templates
            .get(name)
            .cloned()
            .ok_or(FetchError::Http { status: 404 })
    }
}

/// A pipeline over `source` with the default policy (3 retries, 1s delay,
/// 5s timeout).
pub fn pipeline(source: ScriptedSource) -> (Arc<ScriptedSource>, TemplatePipeline) {
    pipeline_with(source, RetryPolicy::default())
}

pub fn pipeline_with(
    source: ScriptedSource,
    policy: RetryPolicy,
) -> (Arc<ScriptedSource>, TemplatePipeline) {
    let source = Arc::new(source);
    let pipeline = TemplatePipeline::new(source.clone(), policy);
    (source, pipeline)
}

/// Five project blocks, as on the landing page.
pub fn project_source() -> ScriptedSource {
    (1..=5).fold(ScriptedSource::new(), |source, i| {
        source.with_template(
            &format!("project{}", i),
            &format!("<article>Project {} {{{{title}}}}</article>", i),
        )
    })
}
