//! Cached access to persisted settings and the per-category save rules

use crate::comments::vulgarity::VulgarityFilter;
use crate::database::DatabaseManager;
use crate::settings::categories::{all_fields, FieldSpec, SettingsCategory};
use crate::utils::error::CastdeskError;
use crate::utils::validation::{accepted_extension, parse_bool};
use anyhow::Result;
use serde::Serialize;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];
/// Image settings and the file name each one is stored under
const IMAGE_FIELDS: &[(&str, &str)] = &[
    ("appearance_logo", "logo"),
    ("appearance_background_image", "bg_image"),
];
const FALLBACK_LANGUAGE: &str = "en";

/// One field as shown on a settings page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedSetting {
    pub key: String,
    pub value: String,
}

/// Result of a settings form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    /// Page to show next
    pub redisplay: SettingsCategory,
    /// Keys written, in field order
    pub saved: Vec<String>,
    /// Submitted keys that were dropped by a category rule
    pub kept_existing: Vec<String>,
}

/// Settings manager
pub struct SettingsManager {
    db: DatabaseManager,
    available_languages: Vec<String>,
    cache: RwLock<HashMap<String, String>>,
}

impl SettingsManager {
    /// Seed any missing defaults and build the cache
    pub async fn load(db: DatabaseManager, available_languages: Vec<String>) -> Result<Self> {
        for field in all_fields() {
            if db.seed_setting(field.key, field.default).await? {
                debug!("Seeded default setting {}", field.key);
            }
        }

        let cache = db
            .get_all_settings()
            .await?
            .into_iter()
            .map(|record| (record.key, record.value))
            .collect::<HashMap<_, _>>();
        info!("Loaded {} settings", cache.len());

        Ok(Self {
            db,
            available_languages,
            cache: RwLock::new(cache),
        })
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.read().await.get(key).cloned()
    }

    /// Boolean setting; missing or malformed values read as false
    pub async fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .await
            .and_then(|value| parse_bool(key, &value).ok())
            .unwrap_or(false)
    }

    /// Snapshot of every cached setting
    pub async fn cache(&self) -> HashMap<String, String> {
        self.cache.read().await.clone()
    }

    /// Current values for a category's fields; `overrides` (a resubmitted
    /// form) win over stored values
    pub async fn display(
        &self,
        category: SettingsCategory,
        overrides: &HashMap<String, String>,
    ) -> Vec<DisplayedSetting> {
        let cache = self.cache.read().await;
        category
            .fields()
            .iter()
            .map(|field| {
                let mut value = cache
                    .get(field.key)
                    .cloned()
                    .unwrap_or_else(|| field.default.to_string());
                if category == SettingsCategory::General
                    && field.key == "primary_language"
                    && value.is_empty()
                {
                    value = FALLBACK_LANGUAGE.to_string();
                }
                if let Some(v) = overrides.get(field.key) {
                    value = v.clone();
                }
                DisplayedSetting {
                    key: field.key.to_string(),
                    value,
                }
            })
            .collect()
    }

    /// Validate and persist a category's submitted values
    pub async fn save(
        &self,
        category: SettingsCategory,
        values: &HashMap<String, String>,
    ) -> Result<SaveOutcome> {
        if category == SettingsCategory::Appearance {
            if let Some(reset) = values.get("reset") {
                if parse_bool("reset", reset)? {
                    return self.reset(category).await;
                }
            }
        }

        for key in values.keys() {
            if category.field(key).is_none() && !(category == SettingsCategory::Appearance && key == "reset") {
                return Err(CastdeskError::validation(
                    key.as_str(),
                    format!("Not a {} setting", category),
                )
                .into());
            }
        }

        let mut writes: Vec<(&'static FieldSpec, String)> = Vec::new();
        for field in category.fields() {
            if let Some(raw) = values.get(field.key) {
                writes.push((field, field.kind.normalize(field.key, raw)?));
            }
        }

        let current = self.cache().await;
        let mut kept_existing = Vec::new();
        writes.retain_mut(|(field, value)| {
            let keep = self.apply_rule(category, field.key, value);
            if !keep {
                kept_existing.push(field.key.to_string());
            }
            keep
        });

        let refilter = category == SettingsCategory::Comments
            && writes.iter().any(|(field, value)| {
                field.key == "vulgarity_filtered_words"
                    && current.get(field.key).map(String::as_str) != Some(value.as_str())
            });

        let mut tx = self.db.begin().await?;
        for (field, value) in &writes {
            DatabaseManager::upsert_setting(&mut *tx, field.key, value).await?;
        }
        if refilter {
            if let Some((_, words)) = writes.iter().find(|(f, _)| f.key == "vulgarity_filtered_words") {
                refilter_comments(&mut *tx, words).await?;
            }
        }
        tx.commit().await?;

        {
            let mut cache = self.cache.write().await;
            for (field, value) in &writes {
                cache.insert(field.key.to_string(), value.clone());
            }
        }

        let saved: Vec<String> = writes.iter().map(|(f, _)| f.key.to_string()).collect();
        info!("Saved {} {} settings", saved.len(), category);
        Ok(SaveOutcome {
            redisplay: category,
            saved,
            kept_existing,
        })
    }

    /// Category rule for one normalized value. Returns false when the
    /// existing setting should be kept instead.
    fn apply_rule(&self, category: SettingsCategory, key: &str, value: &mut String) -> bool {
        match (category, key) {
            (SettingsCategory::General, "primary_language") => {
                if self.available_languages.iter().any(|l| l.as_str() == value.as_str()) {
                    true
                } else {
                    warn!("Language {:?} is not available, keeping the current primary language", value);
                    false
                }
            }
            (SettingsCategory::Appearance, key) => {
                let Some((_, stored_name)) = IMAGE_FIELDS.iter().find(|(field, _)| *field == key) else {
                    return true;
                };
                match accepted_extension(value, IMAGE_EXTENSIONS) {
                    Some(extension) => {
                        *value = format!("{}{}", stored_name, extension);
                        true
                    }
                    None => {
                        if !value.is_empty() {
                            warn!("Ignoring {} {:?}: not an accepted image type", key, value);
                        }
                        false
                    }
                }
            }
            _ => true,
        }
    }

    async fn reset(&self, category: SettingsCategory) -> Result<SaveOutcome> {
        let mut tx = self.db.begin().await?;
        for field in category.fields() {
            DatabaseManager::upsert_setting(&mut *tx, field.key, field.default).await?;
        }
        tx.commit().await?;

        let mut cache = self.cache.write().await;
        for field in category.fields() {
            cache.insert(field.key.to_string(), field.default.to_string());
        }

        info!("Reset {} settings to defaults", category);
        Ok(SaveOutcome {
            redisplay: category,
            saved: category.fields().iter().map(|f| f.key.to_string()).collect(),
            kept_existing: Vec::new(),
        })
    }
}

/// Re-mask every stored comment body with a new word list
async fn refilter_comments(conn: &mut SqliteConnection, words: &str) -> Result<()> {
    let filter = VulgarityFilter::from_setting(words);
    if !filter.is_active() {
        return Ok(());
    }

    let mut changed = 0usize;
    for comment in DatabaseManager::all_comments(&mut *conn).await? {
        let filtered = filter.apply(&comment.body);
        if filtered != comment.body {
            DatabaseManager::set_comment_body(&mut *conn, comment.id, &filtered).await?;
            changed += 1;
        }
    }

    info!("Re-filtered {} comment bodies", changed);
    Ok(())
}
