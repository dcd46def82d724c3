pub mod cli;
pub mod core;
pub mod ticker;

mod commands;

use std::time::Duration;

use tauri::Manager;
use tauri_plugin_log::{Target, TargetKind};

// ── App Entry ────────────────────────────────────────────────────────────────

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::*;

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .targets([
                    Target::new(TargetKind::Stdout),
                    Target::new(TargetKind::LogDir { file_name: None }),
                ])
                .level(log::LevelFilter::Info)
                .level_for("keyrotator_lib", log::LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            let settings = core::read_settings().unwrap_or_else(|e| {
                log::warn!("settings unreadable, using defaults: {}", e);
                core::Settings::default()
            });
            log::info!(
                "keyrotator v{} starting (store: {})",
                app.package_info().version,
                settings.store_file
            );
            ticker::spawn_clock(
                app.handle().clone(),
                Duration::from_millis(settings.tick_interval_ms.max(1)),
            );
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            list_services,
            add_service,
            delete_service,
            list_keys,
            add_key,
            toggle_rate_limit,
            delete_key,
            copy_key,
            get_random_working_key,
            read_settings,
            write_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
