//! Utility modules for error handling, configuration and validation

pub mod config;
pub mod error;
pub mod platform;
pub mod validation;

// Re-export for convenience
pub use config::{AppSettings, ProviderEndpoints};
pub use error::CastdeskError;
