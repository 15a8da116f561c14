//! Site settings grouped into admin categories

pub mod categories;
pub mod manager;

pub use categories::{FieldKind, FieldSpec, SettingsCategory};
pub use manager::{DisplayedSetting, SaveOutcome, SettingsManager};
