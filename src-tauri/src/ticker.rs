use std::time::Duration;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};

use crate::core;

// ── Display Clock ────────────────────────────────────────────────────────────
//
// Drives the countdown labels.  Each tick only announces the time; the
// frontend re-reads `list_keys`, which recomputes availability from scratch.
// Nothing here ever writes to the store.

pub const TICK_EVENT: &str = "clock:tick";

#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub now_ms: i64,
}

pub fn spawn_clock<R: Runtime>(app: AppHandle<R>, interval: Duration) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = app.emit(TICK_EVENT, Tick { now_ms: core::now_ms() }) {
                log::debug!("clock tick not delivered: {}", e);
            }
        }
    });
}
