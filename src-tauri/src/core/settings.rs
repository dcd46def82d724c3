use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::paths::get_keyrotator_dir;

// ── Settings (~/.keyrotator/settings.json) ───────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Window length used when a key is added without an explicit duration.
    #[serde(default = "default_rate_limit_hours")]
    pub default_rate_limit_hours: u32,
    /// Cadence of the `clock:tick` event that drives the countdown labels.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Store file name, resolved against the app data directory.
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

fn default_rate_limit_hours() -> u32 {
    1
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_store_file() -> String {
    "store.json".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rate_limit_hours: default_rate_limit_hours(),
            tick_interval_ms: default_tick_interval_ms(),
            store_file: default_store_file(),
        }
    }
}

pub fn read_settings() -> Result<Settings, String> {
    read_settings_from(&get_keyrotator_dir()?.join("settings.json"))
}

pub fn write_settings(settings: &Settings) -> Result<(), String> {
    write_settings_to(&get_keyrotator_dir()?.join("settings.json"), settings)
}

pub fn read_settings_from(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<(), String> {
    if settings.default_rate_limit_hours == 0 {
        return Err("Default rate limit must be at least 1 hour".into());
    }
    if settings.tick_interval_ms == 0 {
        return Err("Tick interval must be positive".into());
    }
    if settings.store_file.trim().is_empty() {
        return Err("Store file name cannot be empty".into());
    }
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let raw = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(path, raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = read_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.store_file, "store.json");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "default_rate_limit_hours": 24 }"#).unwrap();

        let settings = read_settings_from(&path).unwrap();
        assert_eq!(settings.default_rate_limit_hours, 24);
        assert_eq!(settings.tick_interval_ms, 1000);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(read_settings_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_write_creates_dir_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            default_rate_limit_hours: 5,
            ..Settings::default()
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_write_rejects_zero_hours() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            default_rate_limit_hours: 0,
            ..Settings::default()
        };
        assert!(write_settings_to(&path, &settings).is_err());
        assert!(!path.exists());
    }
}
