//! Platform-specific directories for castdesk
//!
//! - Data (database): ~/.local/share/castdesk, ~/Library/Application Support/Castdesk, %APPDATA%\Castdesk
//! - Config: ~/.config/castdesk on Linux, the data directory elsewhere

use std::path::PathBuf;

fn app_dir_name() -> &'static str {
    if cfg!(target_os = "linux") {
        "castdesk"
    } else {
        "Castdesk"
    }
}

/// Returns the application data directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_dir_name())
}

/// Returns the configuration directory
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app_dir_name())
    }

    #[cfg(not(target_os = "linux"))]
    {
        app_data_dir()
    }
}

/// Default database location: `<data dir>/castdesk.db`
pub fn database_path() -> PathBuf {
    app_data_dir().join("castdesk.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_lives_in_data_dir() {
        let db = database_path();
        assert_eq!(db.file_name().unwrap(), "castdesk.db");
        assert!(db.starts_with(app_data_dir()));
    }
}
