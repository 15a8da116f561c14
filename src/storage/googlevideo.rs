//! Google Video engine: title from the player page, thumbnail and duration
//! from the MediaRSS feed

use crate::storage::http::fetch_text;
use crate::storage::models::{MediaFile, MediaMeta, MediaType, StorageUri, UrlMatch};
use crate::storage::{decode_entities, non_empty, parse_seconds};
use crate::storage::traits::EmbedStorageEngine;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use tracing::{debug, warn};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http(s?)://)?video.google.com/videoplay\?(.*&)?docid=(?P<id>-?\d+)")
        .expect("valid Google Video pattern")
});

static XML_THUMB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"media:thumbnail url="([^"]*)""#).expect("valid thumbnail regex"));
static XML_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"duration="([^"]*)""#).expect("valid duration regex"));
static XHTML_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]*)</title>").expect("valid title regex"));

pub struct GoogleVideoStorage {
    client: Client,
    api_base: String,
}

impl GoogleVideoStorage {
    pub const ENGINE_TYPE: &'static str = "GoogleVideoStorage";

    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn apply_player_page(meta: &mut MediaMeta, html: &str) {
        if let Some(caps) = XHTML_TITLE.captures(html) {
            meta.display_name = non_empty(Some(decode_entities(caps[1].trim())));
        }
    }

    fn apply_feed(meta: &mut MediaMeta, feed: &str) {
        if let Some(caps) = XML_THUMB.captures(feed) {
            meta.thumbnail_url = non_empty(Some(decode_entities(&caps[1])));
        }
        if let Some(caps) = XML_DURATION.captures(feed) {
            meta.duration = parse_seconds(&caps[1]);
        }
    }
}

#[async_trait]
impl EmbedStorageEngine for GoogleVideoStorage {
    fn engine_type(&self) -> &'static str {
        Self::ENGINE_TYPE
    }

    fn default_name(&self) -> &'static str {
        "Google Video"
    }

    fn url_pattern(&self) -> &Regex {
        &URL_PATTERN
    }

    async fn parse_match(&self, _url: &str, captures: &UrlMatch) -> Result<MediaMeta> {
        let id = captures.require("id")?;
        let mut meta = MediaMeta::new(id, MediaType::Video);

        let play_url = format!("{}/videoplay?docid={}", self.api_base, id);
        let feed_url = format!("{}/videofeed?docid={}", self.api_base, id);

        // Both requests are independent and each only fills optional fields
        let (page, feed) = tokio::join!(
            fetch_text(&self.client, &play_url),
            fetch_text(&self.client, &feed_url)
        );

        match page {
            Ok(html) => Self::apply_player_page(&mut meta, &html),
            Err(e) => warn!("Google Video player page for {} failed: {}", id, e),
        }
        match feed {
            Ok(xml) => Self::apply_feed(&mut meta, &xml),
            Err(e) => warn!("Google Video feed for {} failed: {}", id, e),
        }

        debug!("Google Video {} -> {:?}", id, meta.display_name);
        Ok(meta)
    }

    fn get_uris(&self, media_file: &MediaFile) -> Result<Vec<StorageUri>> {
        let uid = &media_file.unique_id;
        let play_url = format!(
            "http://video.google.com/googleplayer.swf?docid={}&hl=en&fs=true",
            uid
        );
        let web_url = format!("http://video.google.com/videoplay?docid={}", uid);
        Ok(vec![
            StorageUri::new(media_file, "googlevideo", play_url),
            StorageUri::new(media_file, "www", web_url),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_page_title() {
        let mut meta = MediaMeta::new("-123", MediaType::Video);
        GoogleVideoStorage::apply_player_page(
            &mut meta,
            "<html><head><title>Tom &amp; Jerry</title></head></html>",
        );
        assert_eq!(meta.display_name.as_deref(), Some("Tom & Jerry"));
    }

    #[test]
    fn test_feed_thumbnail_and_duration() {
        let feed = r#"<rss><item><media:group>
            <media:content url="x" duration="95" />
            <media:thumbnail url="http://img.example.com/t.jpg?a=1&amp;b=2" width="160" />
        </media:group></item></rss>"#;
        let mut meta = MediaMeta::new("-123", MediaType::Video);
        GoogleVideoStorage::apply_feed(&mut meta, feed);
        assert_eq!(meta.thumbnail_url.as_deref(), Some("http://img.example.com/t.jpg?a=1&b=2"));
        assert_eq!(meta.duration, Some(95));
    }

    #[test]
    fn test_feed_without_matches_leaves_fields_absent() {
        let mut meta = MediaMeta::new("5", MediaType::Video);
        GoogleVideoStorage::apply_feed(&mut meta, "<rss></rss>");
        assert_eq!(meta.thumbnail_url, None);
        assert_eq!(meta.duration, None);
    }

    #[test]
    fn test_empty_feed_attributes_are_absent() {
        let feed = r#"<media:content duration="" /><media:thumbnail url="" />"#;
        let mut meta = MediaMeta::new("7", MediaType::Video);
        GoogleVideoStorage::apply_feed(&mut meta, feed);
        assert_eq!(meta.thumbnail_url, None);
        assert_eq!(meta.duration, None);

        GoogleVideoStorage::apply_player_page(&mut meta, "<title>   </title>");
        assert_eq!(meta.display_name, None);
    }

    #[test]
    fn test_pattern_docid_anywhere_in_query() {
        let engine = GoogleVideoStorage::new(Client::new(), "http://video.google.com");
        let m = engine
            .match_url("http://video.google.com/videoplay?hl=en&docid=-8146284429495574012")
            .unwrap();
        assert_eq!(m.get("id"), Some("-8146284429495574012"));
        assert!(engine.match_url("http://video.google.com/videosearch?q=cats").is_none());
    }
}
