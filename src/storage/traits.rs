use crate::storage::models::{MediaFile, MediaMeta, StorageUri, UrlMatch};
use crate::utils::error::CastdeskError;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

/// Core trait for all embed storage engines
///
/// An engine owns a URL pattern for one video-hosting provider, knows how to
/// scrape that provider's metadata for a matching URL, and how to turn a
/// stored `unique_id` back into playable and display URLs.
#[async_trait]
pub trait EmbedStorageEngine: Send + Sync {
    /// Uniquely identifying string for this engine (e.g. "BlipTVStorage")
    fn engine_type(&self) -> &'static str;

    /// Human readable provider name
    fn default_name(&self) -> &'static str;

    /// Compiled pattern with named groups; `id` is the provider's media id
    fn url_pattern(&self) -> &Regex;

    /// Fetch and normalize remote metadata for a URL that matched `url_pattern`
    async fn parse_match(&self, url: &str, captures: &UrlMatch) -> Result<MediaMeta>;

    /// All URIs from which the stored file can be accessed.
    ///
    /// Pure: depends only on `media_file.unique_id`, never touches the network.
    fn get_uris(&self, media_file: &MediaFile) -> Result<Vec<StorageUri>>;

    /// Named captures if `url` belongs to this engine
    fn match_url(&self, url: &str) -> Option<UrlMatch> {
        let pattern = self.url_pattern();
        pattern
            .captures(url.trim())
            .map(|caps| UrlMatch::from_captures(pattern, &caps))
    }

    /// Match `url` and scrape its metadata
    async fn parse(&self, url: &str) -> Result<MediaMeta> {
        let captures = self
            .match_url(url)
            .ok_or_else(|| CastdeskError::UnsupportedUrl(url.to_string()))?;
        self.parse_match(url.trim(), &captures).await
    }
}
