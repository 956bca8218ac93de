//! Spans for template pipeline operations.

use tracing::{info_span, Span};

/// Span covering one template's fetch, compile and render.
pub fn template_span(name: &str) -> Span {
    info_span!("template", name = %name)
}

/// Span covering a batch of template loads.
pub fn batch_span(mode: &str, size: usize) -> Span {
    info_span!("batch", mode = %mode, size = size)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
