//! Field-level validation used by the settings forms

use crate::utils::error::CastdeskError;
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CastdeskError::validation(
                field_name,
                format!("Unsupported URL scheme: {}", scheme),
            )
            .into()),
        },
        Err(e) => Err(CastdeskError::validation(field_name, format!("Invalid URL format: {}", e)).into()),
    }
}

pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(CastdeskError::validation(field_name, "Not a valid email address").into())
    }
}

/// Accepts the spellings HTML forms and the CLI produce for booleans
pub fn parse_bool(field_name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(CastdeskError::validation(field_name, format!("Not a boolean: {}", other)).into()),
    }
}

pub fn parse_integer(field_name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| CastdeskError::validation(field_name, format!("Not an integer: {}", value)).into())
}

pub fn validate_choice(field_name: &str, value: &str, choices: &[&str]) -> Result<()> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(CastdeskError::validation(
            field_name,
            format!("Must be one of: {}", choices.join(", ")),
        )
        .into())
    }
}

/// The lowercased extension of `file_name` (with the dot) when it is one of `accepted`
pub fn accepted_extension(file_name: &str, accepted: &[&str]) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .filter(|ext| accepted.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("akismet_url", "https://example.com").is_ok());
        assert!(validate_url("akismet_url", "http://example.com").is_ok());
        assert!(validate_url("akismet_url", "invalid-url").is_err());
        assert!(validate_url("akismet_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email_send_from", "noreply@example.com").is_ok());
        assert!(validate_email("email_send_from", "noreply").is_err());
        assert!(validate_email("email_send_from", "a b@example.com").is_err());
    }

    #[test]
    fn test_parse_bool_spellings() {
        assert!(parse_bool("flag", "on").unwrap());
        assert!(parse_bool("flag", "True").unwrap());
        assert!(!parse_bool("flag", "").unwrap());
        assert!(!parse_bool("flag", "0").unwrap());
        assert!(parse_bool("flag", "maybe").is_err());
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = parse_integer("api_media_max_results", "ten").unwrap_err();
        match err.downcast_ref::<CastdeskError>() {
            Some(CastdeskError::Validation { field, .. }) => assert_eq!(field, "api_media_max_results"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_accepted_extension() {
        let accepted = [".png", ".jpg", ".jpeg", ".gif"];
        assert_eq!(accepted_extension("logo.PNG", &accepted).as_deref(), Some(".png"));
        assert_eq!(accepted_extension("bg.jpeg", &accepted).as_deref(), Some(".jpeg"));
        assert_eq!(accepted_extension("logo..png", &accepted).as_deref(), Some(".png"));
        assert_eq!(accepted_extension("logo.svg", &accepted), None);
        assert_eq!(accepted_extension("logo", &accepted), None);
        assert_eq!(accepted_extension("", &accepted), None);
    }
}
