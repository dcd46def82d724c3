use std::path::PathBuf;

// ── Path Helpers ─────────────────────────────────────────────────────────────

/// Bundle identifier; must match `identifier` in tauri.conf.json so the
/// headless CLI and the desktop app share one store file.
pub const APP_IDENTIFIER: &str = "com.keyrotator.app";

/// `~/.keyrotator`, home of settings.json.
pub fn get_keyrotator_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".keyrotator"))
}

/// Tauri's `app_data_dir()` equivalent, usable without an `AppHandle`.
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    let data = dirs::data_dir().ok_or("Could not find data directory")?;
    Ok(data.join(APP_IDENTIFIER))
}

pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}
