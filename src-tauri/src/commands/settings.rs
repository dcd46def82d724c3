use crate::core;

// ── Settings ─────────────────────────────────────────────────────────────────

#[tauri::command]
pub fn read_settings() -> Result<core::Settings, String> {
    core::read_settings()
}

/// Persists settings.  A new `tick_interval_ms` takes effect on next launch.
#[tauri::command]
pub fn write_settings(settings: core::Settings) -> Result<core::Settings, String> {
    core::write_settings(&settings).map_err(|e| {
        log::warn!("write settings failed: {}", e);
        e
    })?;
    log::info!(
        "settings saved (default window {}h, store {})",
        settings.default_rate_limit_hours,
        settings.store_file
    );
    Ok(settings)
}
