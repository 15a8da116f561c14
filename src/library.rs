//! Media library: imports embedded media by URL and resolves playable URIs

use crate::database::DatabaseManager;
use crate::storage::{EngineRegistry, MediaFile, StorageUri};
use crate::utils::error::CastdeskError;
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Media library
pub struct MediaLibrary {
    registry: Arc<EngineRegistry>,
    db: DatabaseManager,
}

impl MediaLibrary {
    pub fn new(registry: Arc<EngineRegistry>, db: DatabaseManager) -> Self {
        Self { registry, db }
    }

    /// Parse `url` with the matching engine and store the result. Importing
    /// the same provider media twice returns the existing file.
    pub async fn import_url(&self, url: &str) -> Result<MediaFile> {
        let (engine_type, meta) = self.registry.parse(url).await?;

        if let Some(existing) = self.db.find_media_file(engine_type, &meta.unique_id).await? {
            debug!("{} {} already imported as {:?}", engine_type, meta.unique_id, existing.id);
            return Ok(existing);
        }

        let mut file = MediaFile::from_meta(engine_type, meta);
        match self.db.save_media_file(&file).await? {
            Some(id) => {
                file.id = Some(id);
                info!("Imported {} as media file {}", url, id);
                Ok(file)
            }
            // A concurrent import stored it first
            None => self
                .db
                .find_media_file(engine_type, &file.unique_id)
                .await?
                .ok_or_else(|| CastdeskError::NotFound(format!("{} {}", engine_type, file.unique_id)).into()),
        }
    }

    /// Import several URLs concurrently; results are in input order
    pub async fn import_many(&self, urls: &[String]) -> Vec<(String, Result<MediaFile>)> {
        let results = join_all(urls.iter().map(|url| self.import_url(url))).await;

        urls.iter()
            .cloned()
            .zip(results)
            .inspect(|(url, result)| {
                if let Err(e) = result {
                    warn!("Failed to import {}: {}", url, e);
                }
            })
            .collect()
    }

    pub async fn get(&self, id: i64) -> Result<MediaFile> {
        self.db
            .get_media_file(id)
            .await?
            .ok_or_else(|| CastdeskError::NotFound(format!("media file {}", id)).into())
    }

    /// Playable URIs for a stored file
    pub async fn uris(&self, id: i64) -> Result<Vec<StorageUri>> {
        let file = self.get(id).await?;
        self.registry.get_uris(&file)
    }

    pub async fn list(&self) -> Result<Vec<MediaFile>> {
        self.db.get_all_media_files().await
    }
}
