//! HTTP client utilities for Vitrine.

pub mod client;

pub use client::{HttpClient, HttpConfig, HttpError};
