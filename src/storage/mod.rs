//! Embed storage engines: third-party video URLs to metadata and playable links

pub mod bliptv;
pub mod dailymotion;
pub mod googlevideo;
pub mod http;
pub mod models;
pub mod registry;
pub mod traits;

pub use bliptv::BlipTvStorage;
pub use dailymotion::DailyMotionStorage;
pub use googlevideo::GoogleVideoStorage;
pub use models::{MediaFile, MediaMeta, MediaType, StorageUri, UrlMatch};
pub use registry::EngineRegistry;
pub use traits::EmbedStorageEngine;

/// Whole seconds from a provider duration field; zero and junk are absent
pub(crate) fn parse_seconds(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let seconds = match raw.parse::<u32>() {
        Ok(s) => s,
        Err(_) => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f > 0.0 && f < u32::MAX as f64 => f.round() as u32,
            _ => return None,
        },
    };
    (seconds > 0).then_some(seconds)
}

/// Decode XML character and entity references, leaving unknown ones as-is
pub(crate) fn decode_entities(raw: &str) -> String {
    match quick_xml::escape::unescape(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("312"), Some(312));
        assert_eq!(parse_seconds(" 95 "), Some(95));
        assert_eq!(parse_seconds("12.6"), Some(13));
        assert_eq!(parse_seconds("0"), None);
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("n/a"), None);
        assert_eq!(parse_seconds("-4"), None);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a&amp;b"), "a&b");
        assert_eq!(decode_entities("&#39;quoted&#39;"), "'quoted'");
        assert_eq!(decode_entities("no entities"), "no entities");
        assert_eq!(decode_entities("&nbsp;kept"), "&nbsp;kept");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
