//! Data structures shared by the embed storage engines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::error::CastdeskError;

/// Kind of media a stored file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CastdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(CastdeskError::Parse(format!("unknown media type: {}", other))),
        }
    }
}

/// Normalized metadata scraped from a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaMeta {
    pub unique_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

impl MediaMeta {
    pub fn new(unique_id: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            unique_id: unique_id.into(),
            media_type,
            ..Default::default()
        }
    }
}

/// A media file backed by a storage engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Row id once persisted
    pub id: Option<i64>,
    /// `engine_type` of the owning storage engine
    pub storage_engine: String,
    /// Provider-specific identifier, sometimes composite
    pub unique_id: String,
    pub media_type: MediaType,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MediaFile {
    /// Build an unsaved media file from engine output
    pub fn from_meta(storage_engine: &str, meta: MediaMeta) -> Self {
        Self {
            id: None,
            storage_engine: storage_engine.to_string(),
            unique_id: meta.unique_id,
            media_type: meta.media_type,
            display_name: meta.display_name,
            description: meta.description,
            duration: meta.duration,
            thumbnail_url: meta.thumbnail_url,
            created_at: Utc::now(),
        }
    }

    /// Minimal file with just the fields `get_uris` reads
    pub fn with_unique_id(storage_engine: &str, unique_id: &str) -> Self {
        Self::from_meta(storage_engine, MediaMeta::new(unique_id, MediaType::Video))
    }
}

/// One way to reach a stored file's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUri {
    pub file: MediaFile,
    /// Label such as `www`, `bliptv`, `dailymotion`
    pub scheme: String,
    pub url: String,
    pub file_path: Option<PathBuf>,
}

impl StorageUri {
    pub fn new(file: &MediaFile, scheme: &str, url: String) -> Self {
        Self {
            file: file.clone(),
            scheme: scheme.to_string(),
            url,
            file_path: None,
        }
    }
}

/// Named captures from a successful `url_pattern` match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMatch {
    captures: HashMap<String, String>,
}

impl UrlMatch {
    pub fn from_captures(pattern: &regex::Regex, caps: &regex::Captures<'_>) -> Self {
        let captures = pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        Self { captures }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }

    /// Fetch a capture every engine pattern is written to produce
    pub fn require(&self, name: &str) -> Result<&str, CastdeskError> {
        self.get(name)
            .ok_or_else(|| CastdeskError::Parse(format!("URL pattern did not capture `{}`", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_round_trip() {
        assert_eq!("video".parse::<MediaType>().unwrap(), MediaType::Video);
        assert_eq!(MediaType::Audio.to_string(), "audio");
        assert!("image".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_meta_serializes_type_key() {
        let meta = MediaMeta::new("x7tgad", MediaType::Video);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["unique_id"], "x7tgad");
        assert!(json["duration"].is_null());
    }

    #[test]
    fn test_url_match_skips_unmatched_groups() {
        let pattern = regex::Regex::new(r"^(?P<scheme>https?://)?example\.com/(?P<id>\d+)").unwrap();
        let caps = pattern.captures("example.com/42").unwrap();
        let m = UrlMatch::from_captures(&pattern, &caps);
        assert_eq!(m.get("id"), Some("42"));
        assert_eq!(m.get("scheme"), None);
        assert!(m.require("scheme").is_err());
    }
}
