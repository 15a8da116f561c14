//! DailyMotion engine: metadata from the oEmbed JSON service

use crate::storage::http::fetch_text_with_query;
use crate::storage::models::{MediaFile, MediaMeta, MediaType, StorageUri, UrlMatch};
use crate::storage::non_empty;
use crate::storage::traits::EmbedStorageEngine;
use crate::utils::error::CastdeskError;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http(s?)://)?(\w+\.)?dailymotion.com/video/(?P<id>[^_\?&#]+)_")
        .expect("valid DailyMotion pattern")
});

/// The subset of the oEmbed response we read
#[derive(Debug, Default, Deserialize)]
struct OEmbed {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

pub struct DailyMotionStorage {
    client: Client,
    api_base: String,
}

impl DailyMotionStorage {
    pub const ENGINE_TYPE: &'static str = "DailyMotionStorage";

    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_oembed(&self, url: &str) -> Result<OEmbed> {
        let endpoint = format!("{}/services/oembed", self.api_base);
        let body =
            fetch_text_with_query(&self.client, &endpoint, &[("format", "json"), ("url", url)]).await?;
        Ok(serde_json::from_str(&body).map_err(CastdeskError::Serialization)?)
    }
}

#[async_trait]
impl EmbedStorageEngine for DailyMotionStorage {
    fn engine_type(&self) -> &'static str {
        Self::ENGINE_TYPE
    }

    fn default_name(&self) -> &'static str {
        "Daily Motion"
    }

    fn url_pattern(&self) -> &Regex {
        &URL_PATTERN
    }

    async fn parse_match(&self, url: &str, captures: &UrlMatch) -> Result<MediaMeta> {
        let id = captures.require("id")?;

        // The id comes from the URL, so a failed lookup only costs the extras
        let data = match self.fetch_oembed(url).await {
            Ok(data) => data,
            Err(e) => {
                warn!("DailyMotion oEmbed lookup for {} failed: {}", id, e);
                OEmbed::default()
            }
        };

        let mut meta = MediaMeta::new(id, MediaType::Video);
        meta.display_name = non_empty(data.title);
        meta.thumbnail_url = non_empty(data.thumbnail_url);
        debug!("DailyMotion {} -> {:?}", id, meta.display_name);
        Ok(meta)
    }

    fn get_uris(&self, media_file: &MediaFile) -> Result<Vec<StorageUri>> {
        let uid = &media_file.unique_id;
        let play_url = format!("http://www.dailymotion.com/embed/video/{}", uid);
        let web_url = format!("http://www.dailymotion.com/video/{}", uid);
        Ok(vec![
            StorageUri::new(media_file, "dailymotion", play_url),
            StorageUri::new(media_file, "www", web_url),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DailyMotionStorage {
        DailyMotionStorage::new(Client::new(), "http://www.dailymotion.com")
    }

    #[test]
    fn test_pattern_captures_id_before_slug() {
        let m = engine()
            .match_url("http://www.dailymotion.com/video/x7tgad_the-sweetest-thing_music")
            .unwrap();
        assert_eq!(m.get("id"), Some("x7tgad"));
    }

    #[test]
    fn test_pattern_requires_slug_separator() {
        assert!(engine().match_url("http://www.dailymotion.com/video/x7tgad").is_none());
        assert!(engine().match_url("https://dailymotion.com/video/x7tgad_title").is_some());
    }

    #[test]
    fn test_get_uris() {
        let file = MediaFile::with_unique_id(DailyMotionStorage::ENGINE_TYPE, "x7tgad");
        let uris = engine().get_uris(&file).unwrap();
        assert_eq!(uris.len(), 2);
        assert_eq!(uris[0].scheme, "dailymotion");
        assert_eq!(uris[0].url, "http://www.dailymotion.com/embed/video/x7tgad");
        assert_eq!(uris[1].scheme, "www");
        assert_eq!(uris[1].url, "http://www.dailymotion.com/video/x7tgad");
        assert!(uris.iter().all(|u| u.file_path.is_none()));
    }

    #[test]
    fn test_oembed_ignores_unknown_fields() {
        let data: OEmbed = serde_json::from_str(
            r#"{"type":"video","version":"1.0","title":"Clip","author_name":"someone"}"#,
        )
        .unwrap();
        assert_eq!(data.title.as_deref(), Some("Clip"));
        assert_eq!(data.thumbnail_url, None);
    }
}
