//! Template pipeline for Vitrine.
//!
//! Named templates are fetched from a [`TemplateSource`] under a per-attempt
//! deadline with bounded retries, compiled once into a [`TemplateCache`],
//! interpolated with flat `{{key}}` substitution and written to a
//! [`RenderTarget`]. Batches run concurrently or in declared order and never
//! fail as a whole.

pub mod cache;
pub mod error;
pub mod events;
pub mod fetch;
pub mod pipeline;
pub mod source;
pub mod state;
pub mod target;
pub mod template;

pub use cache::{CacheStats, TemplateCache};
pub use error::{FetchError, TargetError, TemplateError};
pub use events::{EventBus, PipelineEvent};
pub use fetch::{fetch_with_retry, Fetched, RetryPolicy};
pub use pipeline::{BatchMode, BatchReport, TemplateEntry, TemplatePipeline};
pub use source::{source_for, template_location, FileSource, HttpSource, TemplateSource};
pub use state::{LoadState, StateTable};
pub use target::{DirectoryTarget, MemoryTarget, RenderTarget, FALLBACK_MARKUP};
pub use template::{data_from_pairs, interpolate, Template, TemplateData};
