//! Masking of filtered words in comment text

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compiled size cap for the word list pattern
const SIZE_LIMIT: usize = 10 * (1 << 20);

/// Compiled form of the `vulgarity_filtered_words` setting
#[derive(Debug, Clone, Default)]
pub struct VulgarityFilter {
    pattern: Option<Regex>,
}

impl VulgarityFilter {
    /// Build from the comma separated setting value; blank entries are ignored
    pub fn from_setting(words: &str) -> Self {
        Self::build(words, SIZE_LIMIT)
    }

    fn build(words: &str, size_limit: usize) -> Self {
        let alternatives: Vec<String> = words
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(|w| {
                let edge = |c: Option<char>| match c {
                    Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
                    _ => "",
                };
                format!("{}{}{}", edge(w.chars().next()), regex::escape(w), edge(w.chars().last()))
            })
            .collect();

        if alternatives.is_empty() {
            return Self::default();
        }

        // Escaped literals only fail on the compiled size limit
        match RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()
        {
            Ok(pattern) => Self { pattern: Some(pattern) },
            Err(e) => {
                warn!(
                    "Vulgarity filter with {} words could not be compiled, filtering is off: {}",
                    alternatives.len(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Replace every filtered word with asterisks of the same length
    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &regex::Captures<'_>| "*".repeat(caps[0].chars().count()))
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// One-shot helper for callers holding only the raw setting
pub fn filter_vulgarity(text: &str, filtered_words: &str) -> String {
    VulgarityFilter::from_setting(filtered_words).apply(text)
}
