//! BlipTV engine: metadata from the `?skin=api` XML feed

use crate::storage::http::fetch_text;
use crate::storage::models::{MediaFile, MediaMeta, MediaType, StorageUri, UrlMatch};
use crate::storage::parse_seconds;
use crate::storage::traits::EmbedStorageEngine;
use crate::utils::error::CastdeskError;
use anyhow::Result;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, error};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http(s?)://)?(\w+\.)?blip.tv/file/(?P<id>\d+)").expect("valid BlipTV pattern")
});

pub struct BlipTvStorage {
    client: Client,
    api_base: String,
}

impl BlipTvStorage {
    pub const ENGINE_TYPE: &'static str = "BlipTVStorage";

    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Split `"<web id> <embed lookup>"`
    fn split_unique_id(unique_id: &str) -> Result<(&str, &str)> {
        match unique_id.split(' ').collect::<Vec<_>>().as_slice() {
            [web_id, embed_lookup] if !web_id.is_empty() && !embed_lookup.is_empty() => {
                Ok((*web_id, *embed_lookup))
            }
            _ => Err(CastdeskError::InvalidUniqueId {
                engine: Self::ENGINE_TYPE.to_string(),
                unique_id: unique_id.to_string(),
            }
            .into()),
        }
    }

    fn meta_from_xml(id: &str, xml: &str) -> Result<MediaMeta> {
        let doc = XmlIndex::parse(xml)?;
        if !doc.contains("payload/asset") {
            return Err(CastdeskError::Parse("BlipTV response has no payload/asset".to_string()).into());
        }

        let embed_lookup = doc
            .text("payload/asset/embedLookup")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CastdeskError::Parse("BlipTV asset has no embedLookup".to_string()))?;

        let mut meta = MediaMeta::new(format!("{} {}", id, embed_lookup), MediaType::Video);
        meta.display_name = doc.non_empty_text("payload/asset/title");
        meta.description = doc.non_empty_text("payload/asset/description");
        meta.duration = doc
            .text("payload/asset/mediaList/media/duration")
            .and_then(parse_seconds);
        Ok(meta)
    }
}

#[async_trait]
impl EmbedStorageEngine for BlipTvStorage {
    fn engine_type(&self) -> &'static str {
        Self::ENGINE_TYPE
    }

    fn default_name(&self) -> &'static str {
        "BlipTV"
    }

    fn url_pattern(&self) -> &Regex {
        &URL_PATTERN
    }

    async fn parse_match(&self, _url: &str, captures: &UrlMatch) -> Result<MediaMeta> {
        let id = captures.require("id")?;
        let api_url = format!("{}/file/{}?skin=api", self.api_base, id);

        // The embed lookup only exists remotely, so failures propagate
        let xml = fetch_text(&self.client, &api_url).await.map_err(|e| {
            error!("BlipTV metadata request for {} failed: {}", id, e);
            e
        })?;

        let meta = Self::meta_from_xml(id, &xml)?;
        debug!("BlipTV {} -> {}", id, meta.unique_id);
        Ok(meta)
    }

    fn get_uris(&self, media_file: &MediaFile) -> Result<Vec<StorageUri>> {
        let (web_id, embed_lookup) = Self::split_unique_id(&media_file.unique_id)?;
        let play_url = format!("http://blip.tv/play/{}", embed_lookup);
        let web_url = format!("http://blip.tv/file/{}", web_id);
        Ok(vec![
            StorageUri::new(media_file, "bliptv", play_url),
            StorageUri::new(media_file, "www", web_url),
        ])
    }
}

/// First text content of every element path below the document root
struct XmlIndex {
    texts: HashMap<String, String>,
}

impl XmlIndex {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut texts = HashMap::new();
        // (element name, accumulated text)
        let mut stack: Vec<(String, String)> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    stack.push((name, String::new()));
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if let Some(path) = Self::path_of(&stack, Some(&name)) {
                        texts.entry(path).or_insert_with(String::new);
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| CastdeskError::Parse(format!("bad XML text: {}", e)))?;
                    if let Some((_, buf)) = stack.last_mut() {
                        buf.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some((_, buf)) = stack.last_mut() {
                        buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let path = Self::path_of(&stack, None);
                    if let (Some(path), Some((_, text))) = (path, stack.pop()) {
                        texts.entry(path).or_insert(text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(CastdeskError::Parse(format!(
                        "invalid XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                    .into())
                }
            }
        }

        if !stack.is_empty() {
            return Err(CastdeskError::Parse("truncated XML document".to_string()).into());
        }

        Ok(Self { texts })
    }

    /// Path of the open element (plus `leaf`), relative to the root element
    fn path_of(stack: &[(String, String)], leaf: Option<&str>) -> Option<String> {
        let mut parts: Vec<&str> = stack.iter().skip(1).map(|(name, _)| name.as_str()).collect();
        if let Some(leaf) = leaf {
            if stack.is_empty() {
                return None;
            }
            parts.push(leaf);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    fn contains(&self, path: &str) -> bool {
        self.texts.contains_key(path)
    }

    fn text(&self, path: &str) -> Option<&str> {
        self.texts.get(path).map(String::as_str)
    }

    fn non_empty_text(&self, path: &str) -> Option<String> {
        self.text(path).filter(|s| !s.is_empty()).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <status>OK</status>
  <payload>
    <asset>
      <title>Pilot &amp; Friends</title>
      <description><![CDATA[<p>First episode</p>]]></description>
      <embedLookup>AYGHvnoC</embedLookup>
      <mediaList>
        <media><duration>312</duration></media>
        <media><duration>9</duration></media>
      </mediaList>
    </asset>
  </payload>
</response>"#;

    #[test]
    fn test_meta_from_xml() {
        let meta = BlipTvStorage::meta_from_xml("1234567", SAMPLE).unwrap();
        assert_eq!(meta.unique_id, "1234567 AYGHvnoC");
        assert_eq!(meta.display_name.as_deref(), Some("Pilot & Friends"));
        assert_eq!(meta.description.as_deref(), Some("<p>First episode</p>"));
        assert_eq!(meta.duration, Some(312));
        assert_eq!(meta.media_type, MediaType::Video);
        assert_eq!(meta.thumbnail_url, None);
    }

    #[test]
    fn test_zero_duration_is_absent() {
        let xml = "<response><payload><asset><embedLookup>abc</embedLookup>\
                   <mediaList><media><duration>0</duration></media></mediaList></asset></payload></response>";
        let meta = BlipTvStorage::meta_from_xml("1", xml).unwrap();
        assert_eq!(meta.duration, None);
        assert_eq!(meta.display_name, None);
    }

    #[test]
    fn test_missing_asset_is_parse_error() {
        let err = BlipTvStorage::meta_from_xml("1", "<response><payload/></response>").unwrap_err();
        assert!(matches!(err.downcast_ref::<CastdeskError>(), Some(CastdeskError::Parse(_))));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = BlipTvStorage::meta_from_xml("1", "<response><payload>").unwrap_err();
        assert!(matches!(err.downcast_ref::<CastdeskError>(), Some(CastdeskError::Parse(_))));
    }

    #[test]
    fn test_split_unique_id() {
        assert_eq!(BlipTvStorage::split_unique_id("123 abc").unwrap(), ("123", "abc"));
        assert!(BlipTvStorage::split_unique_id("123").is_err());
        assert!(BlipTvStorage::split_unique_id("1 2 3").is_err());
        assert!(BlipTvStorage::split_unique_id(" abc").is_err());
    }
}
