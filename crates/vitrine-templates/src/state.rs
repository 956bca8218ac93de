//! Per-name load state.
//!
//! `Unloaded -> Loading -> {Cached, Failed}`. Clearing the cache returns
//! cached names to `Unloaded`; a failed name may be loaded again later.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

/// Load state of one template name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Cached,
    Failed,
}

/// Load states for every name the pipeline has seen.
#[derive(Debug, Default)]
pub struct StateTable {
    states: Mutex<HashMap<String, LoadState>>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state; names never seen are `Unloaded`.
    pub fn get(&self, name: &str) -> LoadState {
        self.states.lock().get(name).copied().unwrap_or_default()
    }

    /// Enter `Loading`. A name that is already `Cached` stays `Cached`.
    pub fn begin(&self, name: &str) {
        let mut states = self.states.lock();
        let state = states.entry(name.to_string()).or_default();
        if *state != LoadState::Cached {
            *state = LoadState::Loading;
        }
    }

    /// Record the outcome of a load.
    pub fn finish(&self, name: &str, success: bool) {
        let next = if success {
            LoadState::Cached
        } else {
            LoadState::Failed
        };
        self.states.lock().insert(name.to_string(), next);
    }

    /// Mark `name` as cached without a fetch.
    pub fn mark_cached(&self, name: &str) {
        self.finish(name, true);
    }

    /// Return every cached name to `Unloaded`.
    pub fn reset_cached(&self) {
        self.states
            .lock()
            .retain(|_, state| *state != LoadState::Cached);
    }
}
