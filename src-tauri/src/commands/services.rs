use tauri::AppHandle;

use super::{open_store, surface};
use crate::core;

// ── Services ─────────────────────────────────────────────────────────────────

#[tauri::command]
pub fn list_services(app: AppHandle) -> Result<Vec<core::Service>, String> {
    let store = open_store(&app)?;
    core::load_services(&store).map_err(|e| surface("load services", e))
}

#[tauri::command]
pub fn add_service(app: AppHandle, name: &str) -> Result<Vec<core::Service>, String> {
    let mut store = open_store(&app)?;
    core::add_service(&mut store, name).map_err(|e| surface("add service", e))
}

/// Deletes the service together with all of its keys.
#[tauri::command]
pub fn delete_service(app: AppHandle, name: &str) -> Result<Vec<core::Service>, String> {
    let mut store = open_store(&app)?;
    core::delete_service(&mut store, name).map_err(|e| surface("delete service", e))
}
