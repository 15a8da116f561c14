//! Reader comments and their moderation

pub mod models;
pub mod moderation;
pub mod vulgarity;

pub use models::{Comment, CommentStatus, StatusTag};
pub use moderation::{CommentModerator, ModerationResult};
pub use vulgarity::{filter_vulgarity, VulgarityFilter};
