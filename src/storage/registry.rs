use crate::storage::models::{MediaFile, MediaMeta, StorageUri};
use crate::storage::traits::EmbedStorageEngine;
use crate::storage::{BlipTvStorage, DailyMotionStorage, GoogleVideoStorage};
use crate::utils::config::ProviderEndpoints;
use crate::utils::error::CastdeskError;
use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// The Storage Engine Registry
///
/// Holds the available engines in registration order and routes a URL to
/// the first engine whose pattern matches it.
#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Arc<dyn EmbedStorageEngine>>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider, sharing one HTTP client
    pub fn with_defaults(client: Client, endpoints: &ProviderEndpoints) -> Self {
        let engines: Vec<Arc<dyn EmbedStorageEngine>> = vec![
            Arc::new(BlipTvStorage::new(client.clone(), &endpoints.bliptv)),
            Arc::new(DailyMotionStorage::new(client.clone(), &endpoints.dailymotion)),
            Arc::new(GoogleVideoStorage::new(client, &endpoints.googlevideo)),
        ];
        Self { engines }
    }

    /// Append an engine; its `engine_type` must be unique
    pub fn register(&mut self, engine: Arc<dyn EmbedStorageEngine>) -> Result<()> {
        if self.engine(engine.engine_type()).is_some() {
            return Err(CastdeskError::DuplicateEngine(engine.engine_type().to_string()).into());
        }
        debug!("Registered storage engine: {}", engine.engine_type());
        self.engines.push(engine);
        Ok(())
    }

    /// Engines in registration order
    pub fn engines(&self) -> impl Iterator<Item = &Arc<dyn EmbedStorageEngine>> {
        self.engines.iter()
    }

    /// Look up an engine by its `engine_type`
    pub fn engine(&self, engine_type: &str) -> Option<&Arc<dyn EmbedStorageEngine>> {
        self.engines.iter().find(|e| e.engine_type() == engine_type)
    }

    /// First registered engine whose pattern matches `url`
    pub fn find_engine(&self, url: &str) -> Option<&Arc<dyn EmbedStorageEngine>> {
        let found = self.engines.iter().find(|e| e.match_url(url).is_some());
        match found {
            Some(engine) => debug!("Routing {} to engine: {}", url, engine.engine_type()),
            None => debug!("No engine matches {}", url),
        }
        found
    }

    /// Scrape metadata for `url` with the matching engine
    pub async fn parse(&self, url: &str) -> Result<(&'static str, MediaMeta)> {
        let engine = self
            .find_engine(url)
            .ok_or_else(|| CastdeskError::UnsupportedUrl(url.to_string()))?;
        let meta = engine.parse(url).await?;
        Ok((engine.engine_type(), meta))
    }

    /// URIs for a stored file, via the engine that owns it
    pub fn get_uris(&self, media_file: &MediaFile) -> Result<Vec<StorageUri>> {
        let engine = self
            .engine(&media_file.storage_engine)
            .ok_or_else(|| CastdeskError::UnknownEngine(media_file.storage_engine.clone()))?;
        engine.get_uris(media_file)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
