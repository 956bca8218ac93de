//! Configuration types for Vitrine.
//!
//! This crate provides the configuration used by the template pipeline,
//! read from `.vitrine/config.yaml` files and `VITRINE_*` environment
//! variables.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
