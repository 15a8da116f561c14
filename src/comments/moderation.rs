//! Comment moderation: listing, posting, approving, trashing and editing

use crate::comments::models::{Comment, CommentStatus};
use crate::comments::vulgarity::VulgarityFilter;
use crate::database::DatabaseManager;
use crate::settings::SettingsManager;
use crate::utils::error::CastdeskError;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Response body for approve and trash actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationResult {
    pub success: bool,
    pub id: i64,
    pub status: String,
}

/// Comment moderator
pub struct CommentModerator {
    db: DatabaseManager,
    settings: Arc<SettingsManager>,
}

impl CommentModerator {
    pub fn new(db: DatabaseManager, settings: Arc<SettingsManager>) -> Self {
        Self { db, settings }
    }

    /// Comments that are not trashed, unreviewed first. A blank search
    /// lists everything.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Comment>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.db.list_comments(search).await
    }

    /// Create a comment. It starts unreviewed when approval is required.
    pub async fn post(&self, subject: &str, body: &str) -> Result<Comment> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(CastdeskError::validation("subject", "Subject is required").into());
        }
        if body.trim().is_empty() {
            return Err(CastdeskError::validation("body", "Body is required").into());
        }

        let body = self.filter().await.apply(body);
        let status = if self.settings.get_bool("req_comment_approval").await {
            CommentStatus::unreviewed()
        } else {
            CommentStatus::published()
        };
        let created_on = Utc::now();

        let id = self.db.insert_comment(subject, &body, &status, created_on).await?;
        info!("Posted comment {} ({})", id, status);

        Ok(Comment {
            id,
            subject: subject.to_string(),
            body,
            status,
            created_on,
        })
    }

    pub async fn approve(&self, id: i64) -> Result<ModerationResult> {
        let mut comment = self.find(id).await?;
        comment.status.approve();
        self.db.update_comment_status(id, &comment.status).await?;

        info!("Approved comment {}", id);
        Ok(ModerationResult {
            success: true,
            id,
            status: comment.status.to_string(),
        })
    }

    pub async fn trash(&self, id: i64) -> Result<ModerationResult> {
        let mut comment = self.find(id).await?;
        comment.status.trash();
        self.db.update_comment_status(id, &comment.status).await?;

        info!("Trashed comment {}", id);
        Ok(ModerationResult {
            success: true,
            id,
            status: comment.status.to_string(),
        })
    }

    /// Replace the body of a comment that is not in the trash
    pub async fn save(&self, id: i64, body: &str) -> Result<Comment> {
        let mut comment = self.find(id).await?;
        if comment.status.is_trashed() {
            return Err(CastdeskError::NotFound(format!("comment {}", id)).into());
        }

        comment.body = self.filter().await.apply(body);
        self.db.update_comment_body(id, &comment.body).await?;

        info!("Edited comment {}", id);
        Ok(comment)
    }

    async fn find(&self, id: i64) -> Result<Comment> {
        self.db
            .get_comment(id)
            .await?
            .ok_or_else(|| CastdeskError::NotFound(format!("comment {}", id)).into())
    }

    async fn filter(&self) -> VulgarityFilter {
        let words = self
            .settings
            .get("vulgarity_filtered_words")
            .await
            .unwrap_or_default();
        VulgarityFilter::from_setting(&words)
    }
}
