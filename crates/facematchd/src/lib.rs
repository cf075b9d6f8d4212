//! facematchd: HTTP service for face embedding extraction and comparison.

pub mod api;
pub mod config;
pub mod engine;

pub use config::{Config, ConfigError};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "Face Recognition Service";
/// Service version reported by `/health`.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
