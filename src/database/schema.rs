//! Database schema

use crate::utils::error::CastdeskError;
use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

/// `sqlite://` connection string for a database file
pub fn database_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Initialize the database
pub async fn initialize_database(db_path: &str) -> Result<Pool<Sqlite>> {
    if let Some(parent) = Path::new(db_path.trim_start_matches("sqlite://")).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(CastdeskError::Io)?;
        }
    }

    // Create database if it doesn't exist
    if !Sqlite::database_exists(db_path).await? {
        debug!("Creating database at: {}", db_path);
        Sqlite::create_database(db_path).await?;
    }

    // Connect to the database
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(db_path)
        .await?;

    // Run migrations
    info!("Running database migrations");
    create_tables(&pool).await?;

    Ok(pool)
}

/// Create database tables
async fn create_tables(pool: &Pool<Sqlite>) -> Result<()> {
    // Create settings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create media_files table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            storage_engine TEXT NOT NULL,
            unique_id TEXT NOT NULL,
            media_type TEXT NOT NULL,
            display_name TEXT,
            description TEXT,
            duration INTEGER,
            thumbnail_url TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (storage_engine, unique_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create comments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            status TEXT NOT NULL,
            created_on DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_status ON comments(status)")
        .execute(pool)
        .await?;

    debug!("Database tables created successfully");
    Ok(())
}
