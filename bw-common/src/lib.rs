//! # Blue Waves Common Library
//!
//! Shared code for the Blue Waves client crates including:
//! - Configuration loading (TOML + environment + compiled defaults)
//! - API request/response types for every REST endpoint
//! - The common error type

pub mod api;
pub mod config;
pub mod error;

pub use config::ClientConfig;
pub use error::{Error, Result};
