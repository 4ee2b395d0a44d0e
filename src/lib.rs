//! Aerial Fetcher Library
//!
//! A Rust library for downloading aerial screensaver videos listed in a JSON
//! manifest. Provides manifest parsing for both known schemas, quality-based
//! URL selection and bounded parallel downloads with length-based resume and
//! cooperative cancellation.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
