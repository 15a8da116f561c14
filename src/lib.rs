//! castdesk library
//!
//! Media-portal back office: embed storage engines for third-party video
//! sites, the site settings store and comment moderation.

pub mod comments;
pub mod database;
pub mod library;
pub mod settings;
pub mod storage;
pub mod utils;

// Re-export main types for easier use
pub use comments::{Comment, CommentModerator, CommentStatus, ModerationResult};
pub use database::{initialize_database, DatabaseManager};
pub use library::MediaLibrary;
pub use settings::{SaveOutcome, SettingsCategory, SettingsManager};
pub use storage::{EmbedStorageEngine, EngineRegistry, MediaFile, MediaMeta, StorageUri};
pub use utils::{AppSettings, CastdeskError};
