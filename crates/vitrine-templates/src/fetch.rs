//! Fetch with a per-attempt deadline and bounded, sequential retries.

use crate::error::{FetchError, TemplateError};
use crate::source::TemplateSource;
use std::time::Duration;
use tracing::{debug, warn};
use vitrine_common_async::{sleep, with_timeout};
use vitrine_common_config::TemplatesConfig;

/// Retry and deadline settings for template fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before each retry.
    pub retry_delay: Duration,
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Retry attempts that hit the deadline instead of failing immediately.
    pub retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TemplatesConfig::default())
    }
}

impl From<&TemplatesConfig> for RetryPolicy {
    fn from(config: &TemplatesConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            timeout: config.timeout(),
            retry_on_timeout: config.retry_on_timeout,
        }
    }
}

/// Successfully fetched template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub text: String,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Fetch `name` from `source` under `policy`.
///
/// An attempt that outlives `policy.timeout` is dropped and its eventual
/// result ignored. Unless `retry_on_timeout` is set, that ends the fetch with
/// [`TemplateError::Timeout`]. HTTP and network failures are retried while
/// `attempt < max_retries`, waiting `retry_delay` before each retry; once
/// exhausted the last failure is returned inside [`TemplateError::Load`].
pub async fn fetch_with_retry(
    source: &dyn TemplateSource,
    name: &str,
    policy: &RetryPolicy,
) -> Result<Fetched, TemplateError> {
    let mut attempt: u32 = 0;

    loop {
        debug!(template = %name, location = %source.locate(name), attempt, "fetching template");

        let outcome = match with_timeout(policy.timeout, source.fetch(name)).await {
            Ok(result) => result,
            Err(elapsed) => Err(FetchError::Timeout {
                after: elapsed.after,
            }),
        };

        let error = match outcome {
            Ok(text) => {
                return Ok(Fetched {
                    text,
                    attempts: attempt + 1,
                })
            }
            Err(error) => error,
        };

        if let FetchError::Timeout { after } = error {
            if !policy.retry_on_timeout {
                return Err(TemplateError::Timeout {
                    name: name.to_string(),
                    after,
                });
            }
        }

        if !error.is_retryable(policy.retry_on_timeout) || attempt >= policy.max_retries {
            return Err(TemplateError::Load {
                name: name.to_string(),
                attempts: attempt + 1,
                source: error,
            });
        }

        attempt += 1;
        warn!(
            template = %name,
            error = %error,
            "Retrying {} ({}/{})...",
            name,
            attempt,
            policy.max_retries
        );
        sleep(policy.retry_delay).await;
    }
}
