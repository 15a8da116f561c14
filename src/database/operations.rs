//! Database CRUD operations

use crate::comments::models::{Comment, CommentStatus};
use crate::storage::models::{MediaFile, MediaType};
use crate::utils::error::CastdeskError;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqliteConnection, Transaction};
use tracing::debug;

/// Database manager
#[derive(Clone)]
pub struct DatabaseManager {
    pool: Pool<Sqlite>,
}

impl DatabaseManager {
    /// Create new database manager
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Start a transaction; multi-row saves commit or roll back as a unit
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await.map_err(CastdeskError::Database)?)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Insert or replace one setting on an open connection or transaction
    pub async fn upsert_setting(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(conn)
            .await?;

        debug!("Saved setting: {} = {}", key, value);
        Ok(())
    }

    /// Insert a setting only when the key is absent
    pub async fn seed_setting(&self, key: &str, value: &str) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get setting
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// Get all settings
    pub async fn get_all_settings(&self) -> Result<Vec<SettingsRecord>> {
        let rows = sqlx::query("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = Vec::with_capacity(rows.len());
        for row in rows {
            settings.push(SettingsRecord {
                key: row.try_get("key")?,
                value: row.try_get("value")?,
            });
        }

        Ok(settings)
    }

    // ------------------------------------------------------------------
    // Media files
    // ------------------------------------------------------------------

    /// Insert a media file and return its row id. `None` when a row for the
    /// same engine and unique id already exists; nothing is written then.
    pub async fn save_media_file(&self, file: &MediaFile) -> Result<Option<i64>> {
        let result = sqlx::query(
            r#"
            INSERT INTO media_files
            (storage_engine, unique_id, media_type, display_name, description, duration, thumbnail_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(storage_engine, unique_id) DO NOTHING
            "#,
        )
        .bind(&file.storage_engine)
        .bind(&file.unique_id)
        .bind(file.media_type.as_str())
        .bind(&file.display_name)
        .bind(&file.description)
        .bind(file.duration.map(i64::from))
        .bind(&file.thumbnail_url)
        .bind(file.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Media file {} {} already stored", file.storage_engine, file.unique_id);
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        debug!("Saved media file {} ({} {})", id, file.storage_engine, file.unique_id);
        Ok(Some(id))
    }

    /// Get media file by ID
    pub async fn get_media_file(&self, id: i64) -> Result<Option<MediaFile>> {
        let row = sqlx::query("SELECT * FROM media_files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_into_media_file).transpose()
    }

    /// Existing file for the same provider media, if already imported
    pub async fn find_media_file(&self, storage_engine: &str, unique_id: &str) -> Result<Option<MediaFile>> {
        let row = sqlx::query("SELECT * FROM media_files WHERE storage_engine = ? AND unique_id = ?")
            .bind(storage_engine)
            .bind(unique_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_into_media_file).transpose()
    }

    /// Get all media files, newest first
    pub async fn get_all_media_files(&self) -> Result<Vec<MediaFile>> {
        let rows = sqlx::query("SELECT * FROM media_files ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_into_media_file).collect()
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Insert a comment and return its row id
    pub async fn insert_comment(
        &self,
        subject: &str,
        body: &str,
        status: &CommentStatus,
        created_on: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO comments (subject, body, status, created_on) VALUES (?, ?, ?, ?)",
        )
        .bind(subject)
        .bind(body)
        .bind(status.to_string())
        .bind(created_on)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get comment by ID, trashed or not
    pub async fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_into_comment).transpose()
    }

    /// Non-trashed comments, unreviewed first, optionally filtered by a
    /// case-insensitive substring of subject or body
    pub async fn list_comments(&self, search: Option<&str>) -> Result<Vec<Comment>> {
        let mut sql = String::from(
            "SELECT * FROM comments WHERE (',' || status || ',') NOT LIKE '%,trash,%'",
        );
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));
        if pattern.is_some() {
            sql.push_str(" AND (subject LIKE ? ESCAPE '\\' OR body LIKE ? ESCAPE '\\')");
        }
        sql.push_str(" ORDER BY status DESC, created_on ASC, id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(pattern) = &pattern {
            query = query.bind(pattern).bind(pattern);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(row_into_comment).collect()
    }

    /// Every comment including trashed ones, on an open transaction
    pub async fn all_comments(conn: &mut SqliteConnection) -> Result<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments ORDER BY id")
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(row_into_comment).collect()
    }

    pub async fn update_comment_status(&self, id: i64, status: &CommentStatus) -> Result<()> {
        sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Comment {} status -> {}", id, status);
        Ok(())
    }

    pub async fn update_comment_body(&self, id: i64, body: &str) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Self::set_comment_body(&mut *conn, id, body).await
    }

    /// Overwrite a comment body on an open connection or transaction
    pub async fn set_comment_body(conn: &mut SqliteConnection, id: i64, body: &str) -> Result<()> {
        sqlx::query("UPDATE comments SET body = ? WHERE id = ?")
            .bind(body)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

/// Settings record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    pub key: String,
    pub value: String,
}

/// Escape LIKE wildcards so user searches match literally
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Convert database row to media file
fn row_into_media_file(row: SqliteRow) -> Result<MediaFile> {
    let media_type: String = row.try_get("media_type")?;
    Ok(MediaFile {
        id: Some(row.try_get("id")?),
        storage_engine: row.try_get("storage_engine")?,
        unique_id: row.try_get("unique_id")?,
        media_type: media_type.parse::<MediaType>()?,
        display_name: row.try_get("display_name")?,
        description: row.try_get("description")?,
        duration: row
            .try_get::<Option<i64>, _>("duration")?
            .and_then(|d| u32::try_from(d).ok()),
        thumbnail_url: row.try_get("thumbnail_url")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Convert database row to comment
fn row_into_comment(row: SqliteRow) -> Result<Comment> {
    let status: String = row.try_get("status")?;
    Ok(Comment {
        id: row.try_get("id")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        status: status.parse::<CommentStatus>()?,
        created_on: row.try_get("created_on")?,
    })
}
