use tauri::AppHandle;

use super::{open_store, surface};
use crate::core::{self, rate_limit, ApiKeyRecord, KeyView};

// ── API Keys ─────────────────────────────────────────────────────────────────

fn views(records: &[ApiKeyRecord], now: i64) -> Vec<KeyView> {
    records.iter().map(|r| rate_limit::key_view(r, now)).collect()
}

/// Re-invoked by the frontend on every `clock:tick`; read-only.
#[tauri::command]
pub fn list_keys(app: AppHandle, service: &str) -> Result<Vec<KeyView>, String> {
    let store = open_store(&app)?;
    core::key_views(&store, service, core::now_ms()).map_err(|e| surface("load keys", e))
}

#[tauri::command]
pub fn add_key(
    app: AppHandle,
    service: &str,
    key: &str,
    is_rate_limited: bool,
    rate_limit_hours: Option<u32>,
) -> Result<Vec<KeyView>, String> {
    let hours = match rate_limit_hours {
        Some(h) => h,
        None => core::read_settings()?.default_rate_limit_hours,
    };
    let mut store = open_store(&app)?;
    let now = core::now_ms();
    core::add_key(&mut store, service, key, hours, is_rate_limited, now)
        .map(|records| views(&records, now))
        .map_err(|e| surface("add key", e))
}

#[tauri::command]
pub fn toggle_rate_limit(app: AppHandle, service: &str, key: &str) -> Result<Vec<KeyView>, String> {
    let mut store = open_store(&app)?;
    let now = core::now_ms();
    core::toggle_key_limit(&mut store, service, key, now)
        .map(|records| views(&records, now))
        .map_err(|e| surface("toggle rate limit", e))
}

#[tauri::command]
pub fn delete_key(app: AppHandle, service: &str, key: &str) -> Result<Vec<KeyView>, String> {
    let mut store = open_store(&app)?;
    core::delete_key(&mut store, service, key)
        .map(|records| views(&records, core::now_ms()))
        .map_err(|e| surface("delete key", e))
}

#[tauri::command]
pub fn copy_key(app: AppHandle, service: &str, key: &str) -> Result<(), String> {
    let store = open_store(&app)?;
    core::copy_key(&store, &app, service, key).map_err(|e| surface("copy key", e))
}

/// Copies a random non-limited key and starts its limit window.
#[tauri::command]
pub fn get_random_working_key(app: AppHandle, service: &str) -> Result<core::PickedKey, String> {
    let mut store = open_store(&app)?;
    core::pick_working_key(&mut store, &app, service, core::now_ms(), &mut rand::rng())
        .map_err(|e| surface("get random working key", e))
}
