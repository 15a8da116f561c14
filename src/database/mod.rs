//! Database module

pub mod operations;
pub mod schema;

// Re-export for convenience
pub use operations::{DatabaseManager, SettingsRecord};
pub use schema::{database_url, initialize_database};
