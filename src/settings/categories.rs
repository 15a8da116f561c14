//! The admin settings categories and the fields each one edits

use crate::utils::error::CastdeskError;
use crate::utils::validation::{parse_bool, parse_integer, validate_choice, validate_email, validate_url};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("valid color regex"));

/// How a field's submitted value is checked and normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Stored as `true` / `false`
    Bool,
    Integer { min: i64, max: i64 },
    /// Blank allowed
    Email,
    /// Blank allowed
    Url,
    /// `#rgb` or `#rrggbb`
    Color,
    Choice(&'static [&'static str]),
}

impl FieldKind {
    /// Validate `value` and return the form it is stored in
    pub fn normalize(&self, field: &str, value: &str) -> Result<String> {
        let value = value.trim();
        match self {
            FieldKind::Text => Ok(value.to_string()),
            FieldKind::Bool => Ok(parse_bool(field, value)?.to_string()),
            FieldKind::Integer { min, max } => {
                let n = parse_integer(field, value)?;
                if n < *min || n > *max {
                    return Err(CastdeskError::validation(
                        field,
                        format!("Value must be between {} and {}", min, max),
                    )
                    .into());
                }
                Ok(n.to_string())
            }
            FieldKind::Email => {
                if !value.is_empty() {
                    validate_email(field, value)?;
                }
                Ok(value.to_string())
            }
            FieldKind::Url => {
                if !value.is_empty() {
                    validate_url(field, value)?;
                }
                Ok(value.to_string())
            }
            FieldKind::Color => {
                if COLOR_PATTERN.is_match(value) {
                    Ok(value.to_ascii_lowercase())
                } else {
                    Err(CastdeskError::validation(field, "Expected a hex color like #1a2b3c").into())
                }
            }
            FieldKind::Choice(choices) => {
                validate_choice(field, value, choices)?;
                Ok(value.to_string())
            }
        }
    }
}

/// One editable setting
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
}

const fn field(key: &'static str, kind: FieldKind, default: &'static str) -> FieldSpec {
    FieldSpec { key, kind, default }
}

const NOTIFICATIONS: &[FieldSpec] = &[
    field("email_media_uploaded", FieldKind::Email, ""),
    field("email_comment_posted", FieldKind::Email, ""),
    field("email_support_requests", FieldKind::Email, ""),
    field("email_send_from", FieldKind::Email, "noreply@localhost.com"),
];

const COMMENTS: &[FieldSpec] = &[
    field("comments_engine", FieldKind::Choice(&["builtin", "disabled"]), "builtin"),
    field("req_comment_approval", FieldKind::Bool, "false"),
    field("akismet_key", FieldKind::Text, ""),
    field("akismet_url", FieldKind::Url, ""),
    field("vulgarity_filtered_words", FieldKind::Text, ""),
];

const API: &[FieldSpec] = &[
    field("api_secret_key_required", FieldKind::Bool, "true"),
    field("api_secret_key", FieldKind::Text, ""),
    field("api_media_max_results", FieldKind::Integer { min: 1, max: 500 }, "50"),
    field("api_tree_max_depth", FieldKind::Integer { min: 1, max: 50 }, "10"),
];

const POPULARITY: &[FieldSpec] = &[
    field("popularity_decay_exponent", FieldKind::Integer { min: 1, max: 20 }, "4"),
    field("popularity_decay_lifetime", FieldKind::Integer { min: 1, max: 365 }, "36"),
];

const UPLOAD: &[FieldSpec] = &[
    field("max_upload_size", FieldKind::Integer { min: 0, max: i64::MAX }, "314572800"),
    field("ftp_storage", FieldKind::Bool, "false"),
    field("ftp_server", FieldKind::Text, ""),
    field("ftp_user", FieldKind::Text, ""),
    field("ftp_password", FieldKind::Text, ""),
    field("ftp_upload_directory", FieldKind::Text, ""),
    field("ftp_download_url", FieldKind::Url, ""),
    field("ftp_upload_integrity_retries", FieldKind::Integer { min: 0, max: 100 }, "10"),
];

const ANALYTICS: &[FieldSpec] = &[field("google_analytics_uacct", FieldKind::Text, "")];

const GENERAL: &[FieldSpec] = &[
    field("general_site_name", FieldKind::Text, "castdesk"),
    field(
        "general_site_title_display_order",
        FieldKind::Choice(&["prepend", "append"]),
        "prepend",
    ),
    field("primary_language", FieldKind::Text, ""),
    field("rich_text_editor", FieldKind::Choice(&["plain", "tinymce"]), "tinymce"),
    field("wording_user_uploads", FieldKind::Text, ""),
    field("wording_additional_notes", FieldKind::Text, ""),
];

const SITEMAPS: &[FieldSpec] = &[
    field("sitemaps_display", FieldKind::Bool, "true"),
    field("rss_display", FieldKind::Bool, "true"),
];

const APPEARANCE: &[FieldSpec] = &[
    field("appearance_logo", FieldKind::Text, ""),
    field("appearance_background_image", FieldKind::Text, ""),
    field("appearance_background_color", FieldKind::Color, "#ffffff"),
    field("appearance_link_color", FieldKind::Color, "#0f7cb4"),
    field("appearance_visited_link_color", FieldKind::Color, "#0f7cb4"),
    field("appearance_text_color", FieldKind::Color, "#637084"),
    field("appearance_heading_color", FieldKind::Color, "#3f3f3f"),
    field("appearance_display_logo", FieldKind::Bool, "true"),
    field("appearance_display_background_image", FieldKind::Bool, "false"),
    field("appearance_custom_css", FieldKind::Text, ""),
];

const ADVERTISING: &[FieldSpec] = &[
    field("advertising_banner_html", FieldKind::Text, ""),
    field("advertising_sidebar_html", FieldKind::Text, ""),
];

/// A settings page in the admin area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsCategory {
    Notifications,
    Comments,
    Api,
    Popularity,
    Upload,
    Analytics,
    General,
    SiteMaps,
    Appearance,
    Advertising,
}

impl SettingsCategory {
    pub const ALL: [SettingsCategory; 10] = [
        SettingsCategory::Notifications,
        SettingsCategory::Comments,
        SettingsCategory::Api,
        SettingsCategory::Popularity,
        SettingsCategory::Upload,
        SettingsCategory::Analytics,
        SettingsCategory::General,
        SettingsCategory::SiteMaps,
        SettingsCategory::Appearance,
        SettingsCategory::Advertising,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::Notifications => "notifications",
            SettingsCategory::Comments => "comments",
            SettingsCategory::Api => "api",
            SettingsCategory::Popularity => "popularity",
            SettingsCategory::Upload => "upload",
            SettingsCategory::Analytics => "analytics",
            SettingsCategory::General => "general",
            SettingsCategory::SiteMaps => "sitemaps",
            SettingsCategory::Appearance => "appearance",
            SettingsCategory::Advertising => "advertising",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            SettingsCategory::Notifications => NOTIFICATIONS,
            SettingsCategory::Comments => COMMENTS,
            SettingsCategory::Api => API,
            SettingsCategory::Popularity => POPULARITY,
            SettingsCategory::Upload => UPLOAD,
            SettingsCategory::Analytics => ANALYTICS,
            SettingsCategory::General => GENERAL,
            SettingsCategory::SiteMaps => SITEMAPS,
            SettingsCategory::Appearance => APPEARANCE,
            SettingsCategory::Advertising => ADVERTISING,
        }
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }
}

impl fmt::Display for SettingsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsCategory {
    type Err = CastdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingsCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CastdeskError::NotFound(format!("settings category {}", s)))
    }
}

/// Every field across all categories
pub fn all_fields() -> impl Iterator<Item = &'static FieldSpec> {
    SettingsCategory::ALL.into_iter().flat_map(|c| c.fields().iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_unique_across_categories() {
        let mut seen = HashSet::new();
        for f in all_fields() {
            assert!(seen.insert(f.key), "duplicate key {}", f.key);
        }
    }

    #[test]
    fn test_defaults_pass_their_own_validation() {
        for f in all_fields() {
            let normalized = f.kind.normalize(f.key, f.default).unwrap();
            assert_eq!(normalized, f.default, "default for {} is not normalized", f.key);
        }
    }

    #[test]
    fn test_category_names_round_trip() {
        for c in SettingsCategory::ALL {
            assert_eq!(c.as_str().parse::<SettingsCategory>().unwrap(), c);
        }
        assert!("themes".parse::<SettingsCategory>().is_err());
    }

    #[test]
    fn test_normalize_kinds() {
        assert_eq!(FieldKind::Bool.normalize("f", "on").unwrap(), "true");
        assert_eq!(FieldKind::Color.normalize("f", "#ABCDEF").unwrap(), "#abcdef");
        assert!(FieldKind::Color.normalize("f", "blue").is_err());
        assert!(FieldKind::Integer { min: 1, max: 5 }.normalize("f", "9").is_err());
        assert_eq!(FieldKind::Integer { min: 1, max: 5 }.normalize("f", " 3 ").unwrap(), "3");
        assert_eq!(FieldKind::Email.normalize("f", "").unwrap(), "");
        assert!(FieldKind::Choice(&["a", "b"]).normalize("f", "c").is_err());
    }
}
