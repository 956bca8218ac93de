//! The template pipeline: cache-aware loading, rendering and batches.

use crate::cache::{CacheStats, TemplateCache};
use crate::error::TemplateError;
use crate::events::{EventBus, PipelineEvent};
use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::source::{source_for, TemplateSource};
use crate::state::{LoadState, StateTable};
use crate::target::{RenderTarget, FALLBACK_MARKUP};
use crate::template::{Template, TemplateData};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tracing::{debug, error, info, warn, Instrument};
use vitrine_common_async::{join_all, yield_now};
use vitrine_common_config::VitrineConfig;
use vitrine_common_http::HttpError;
use vitrine_common_log::spans::{batch_span, template_span, Timer};

/// One template to load and render into a target container.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    pub name: String,
    /// Selector of the container that receives the rendered markup.
    pub target: String,
    pub data: TemplateData,
}

impl TemplateEntry {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            data: TemplateData::new(),
        }
    }

    pub fn with_data(mut self, data: TemplateData) -> Self {
        self.data = data;
        self
    }
}

/// How a batch schedules its entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Start every entry before awaiting any; no ordering between entries.
    #[default]
    Concurrent,
    /// One entry at a time in declared order; entry N+1 starts after entry
    /// N's write has committed.
    Sequential,
}

impl BatchMode {
    fn as_str(self) -> &'static str {
        match self {
            BatchMode::Concurrent => "concurrent",
            BatchMode::Sequential => "sequential",
        }
    }
}

/// Outcome of a batch, including which entries failed and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Names that loaded and rendered, in declared order.
    pub loaded: Vec<String>,
    /// Names that failed, with their terminal error.
    pub failed: Vec<(String, TemplateError)>,
}

impl BatchReport {
    /// Whether every entry loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetches, caches, compiles and renders named templates.
///
/// Construct one per application and pass it by reference to whatever needs
/// templates.
pub struct TemplatePipeline {
    source: Arc<dyn TemplateSource>,
    policy: RetryPolicy,
    cache: TemplateCache,
    states: StateTable,
    load_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    events: EventBus,
}

impl TemplatePipeline {
    pub fn new(source: Arc<dyn TemplateSource>, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            cache: TemplateCache::new(),
            states: StateTable::new(),
            load_locks: Mutex::new(HashMap::new()),
            events: EventBus::default(),
        }
    }

    /// Build a pipeline with the source and retry policy described by `config`.
    pub fn from_config(config: &VitrineConfig) -> Result<Self, HttpError> {
        Ok(Self::new(
            source_for(config)?,
            RetryPolicy::from(&config.templates),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn source(&self) -> &dyn TemplateSource {
        self.source.as_ref()
    }

    /// Receive [`PipelineEvent`]s published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Whether `name` is cached.
    pub fn has(&self, name: &str) -> bool {
        self.cache.has(name)
    }

    /// Load state of `name`.
    pub fn state(&self, name: &str) -> LoadState {
        self.states.get(name)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Fetch raw text for `name` with timeout and retries. Does not touch
    /// the cache.
    pub async fn fetch_template(&self, name: &str) -> Result<String, TemplateError> {
        fetch_with_retry(self.source.as_ref(), name, &self.policy)
            .await
            .map(|fetched| fetched.text)
    }

    /// Cached template for `name`, fetching and compiling it on a miss.
    ///
    /// Concurrent loads of one name share a single fetch: later callers wait
    /// for the first and are served from the cache.
    pub async fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        self.load_uncached(name).instrument(template_span(name)).await
    }

    async fn load_uncached(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        if let Some(template) = self.cache.get(name) {
            return Ok(template);
        }

        let lock = self.load_lock(name);
        let result = self.load_locked(name, &lock).await;
        self.release_load_lock(name, lock);
        result
    }

    async fn load_locked(
        &self,
        name: &str,
        lock: &AsyncMutex<()>,
    ) -> Result<Arc<Template>, TemplateError> {
        let _guard = lock.lock().await;

        if let Some(template) = self.cache.get(name) {
            debug!("served by a concurrent load");
            return Ok(template);
        }

        self.states.begin(name);
        match fetch_with_retry(self.source.as_ref(), name, &self.policy).await {
            Ok(fetched) => {
                let template = self
                    .cache
                    .insert_if_absent(Template::compile(name, fetched.text));
                self.states.finish(name, true);
                debug!(attempts = fetched.attempts, "template cached");
                Ok(template)
            }
            Err(err) => {
                self.states.finish(name, false);
                warn!(error = %err, "Template loading error");
                Err(err)
            }
        }
    }

    fn load_lock(&self, name: &str) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.load_locks.lock().entry(name.to_string()).or_default())
    }

    /// Drop the lock entry for `name` once no other load holds it.
    ///
    /// Clones are only handed out under the map lock, so the count cannot
    /// grow while it is checked here.
    fn release_load_lock(&self, name: &str, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self.load_locks.lock();
        let idle = locks
            .get(name)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(name);
        }
    }

    /// Compile `text` and cache it under `name` without fetching, replacing
    /// any previous entry.
    pub fn register(&self, name: &str, text: impl Into<String>) -> Arc<Template> {
        let template = self.cache.set(Template::compile(name, text));
        self.states.mark_cached(name);
        template
    }

    /// Render a cached template.
    pub fn try_render(&self, name: &str, data: &TemplateData) -> Result<String, TemplateError> {
        self.cache
            .get(name)
            .map(|template| template.render(data))
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }

    /// Render a cached template; an unknown name renders as an empty string
    /// and logs a warning.
    pub fn render(&self, name: &str, data: &TemplateData) -> String {
        match self.try_render(name, data) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!("{}", err);
                String::new()
            }
        }
    }

    /// Load `name`, render it with `data` and, when given, write the result
    /// into `target`'s `selector`.
    pub async fn load_and_render(
        &self,
        name: &str,
        data: &TemplateData,
        target: Option<(&dyn RenderTarget, &str)>,
    ) -> Result<String, TemplateError> {
        let template = self.load(name).await?;
        let rendered = template.render(data);

        if let Some((target, selector)) = target {
            target
                .write(selector, &rendered)
                .await
                .map_err(|e| TemplateError::target(selector, e))?;
        }

        Ok(rendered)
    }

    /// Load and render one entry into `target`, returning its name.
    ///
    /// If loading fails, the fallback message is written to the entry's
    /// container before the error is returned.
    pub async fn load_template(
        &self,
        entry: &TemplateEntry,
        target: &dyn RenderTarget,
    ) -> Result<String, TemplateError> {
        let result = self
            .load_and_render(&entry.name, &entry.data, Some((target, entry.target.as_str())))
            .await;

        match result {
            Ok(_) => Ok(entry.name.clone()),
            Err(err) => {
                error!(template = %entry.name, error = %err, "Error loading template");
                if !matches!(err, TemplateError::Target { .. }) {
                    if let Err(write_err) = target.write(&entry.target, FALLBACK_MARKUP).await {
                        warn!(selector = %entry.target, error = %write_err, "failed to write fallback");
                    }
                }
                Err(err)
            }
        }
    }

    /// Load a batch concurrently. Failed entries are logged and left out;
    /// the call itself never fails.
    pub async fn load_templates(
        &self,
        entries: &[TemplateEntry],
        target: &dyn RenderTarget,
    ) -> Vec<String> {
        self.load_templates_detailed(entries, target, BatchMode::Concurrent)
            .await
            .loaded
    }

    /// Load a batch one entry at a time in declared order.
    pub async fn load_templates_in_order(
        &self,
        entries: &[TemplateEntry],
        target: &dyn RenderTarget,
    ) -> Vec<String> {
        self.load_templates_detailed(entries, target, BatchMode::Sequential)
            .await
            .loaded
    }

    /// Load a batch and report both loaded and failed entries. Publishes
    /// [`PipelineEvent::BatchComplete`] once every entry has settled.
    pub async fn load_templates_detailed(
        &self,
        entries: &[TemplateEntry],
        target: &dyn RenderTarget,
        mode: BatchMode,
    ) -> BatchReport {
        let span = batch_span(mode.as_str(), entries.len());
        let timer = Timer::start("batch");
        let report = self.run_batch(entries, target, mode).instrument(span).await;
        timer.finish();

        if report.is_complete() {
            info!(
                "Successfully loaded {} templates: {:?}",
                report.loaded.len(),
                report.loaded
            );
        } else {
            warn!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "batch finished with failures"
            );
        }

        self.events.publish(PipelineEvent::BatchComplete {
            loaded: report.loaded.clone(),
        });
        report
    }

    async fn run_batch(
        &self,
        entries: &[TemplateEntry],
        target: &dyn RenderTarget,
        mode: BatchMode,
    ) -> BatchReport {
        let results = match mode {
            BatchMode::Concurrent => {
                join_all(entries.iter().map(|entry| self.load_template(entry, target))).await
            }
            BatchMode::Sequential => {
                let mut results = Vec::with_capacity(entries.len());
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        yield_now().await;
                    }
                    results.push(self.load_template(entry, target).await);
                }
                results
            }
        };

        let mut report = BatchReport::default();
        for (entry, result) in entries.iter().zip(results) {
            match result {
                Ok(name) => report.loaded.push(name),
                Err(err) => report.failed.push((entry.name.clone(), err)),
            }
        }
        report
    }

    /// Fetch and cache templates without rendering. Each position holds the
    /// name on success and `None` on failure.
    pub async fn preload_templates<S>(&self, names: &[S]) -> Vec<Option<String>>
    where
        S: AsRef<str> + Sync,
    {
        let span = batch_span("preload", names.len());
        join_all(names.iter().map(|name| async move {
            let name = name.as_ref();
            match self.load(name).await {
                Ok(_) => Some(name.to_string()),
                Err(err) => {
                    warn!("Failed to preload {}: {}", name, err);
                    None
                }
            }
        }))
        .instrument(span)
        .await
    }

    /// Drop every cached template. Cached names return to
    /// [`LoadState::Unloaded`] and their next load fetches again.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        self.states.reset_cached();
        info!(removed, "Template cache cleared");
        self.events.publish(PipelineEvent::CacheCleared { removed });
        removed
    }
}

impl std::fmt::Debug for TemplatePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePipeline")
            .field("policy", &self.policy)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
