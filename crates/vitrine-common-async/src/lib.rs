//! Async runtime utilities.

use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Configuration for the Vitrine runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (0 = num_cpus).
    pub worker_threads: usize,
    /// Thread name prefix.
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: "vitrine".to_string(),
        }
    }
}

/// Build a configured Tokio runtime with I/O and timers enabled.
pub fn build_runtime(config: RuntimeConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();

    if config.worker_threads > 0 {
        builder.worker_threads(config.worker_threads);
    }

    builder.thread_name(&config.thread_name);
    builder.enable_io().enable_time();

    builder.build()
}

/// Run a future with a timeout.
///
/// When the deadline passes the future is dropped; whatever it would have
/// produced later is never observed.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { after: duration })
}

/// Timeout error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation timed out after {after:?}")]
pub struct TimeoutError {
    /// The deadline that elapsed.
    pub after: Duration,
}

/// Run multiple futures concurrently, returning when all complete.
///
/// Every future is polled before any result is returned, and results come
/// back in input order.
pub async fn join_all<I, F, T>(futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    futures::future::join_all(futures).await
}

/// Sleep for a duration.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await
}

/// Yield to the runtime.
pub async fn yield_now() {
    tokio::task::yield_now().await
}
