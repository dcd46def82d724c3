use tauri::{AppHandle, Runtime};
use tauri_plugin_clipboard_manager::ClipboardExt;

use super::error::KeyError;

// ── Clipboard ────────────────────────────────────────────────────────────────

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), KeyError>;
}

impl<R: Runtime> Clipboard for AppHandle<R> {
    fn write_text(&self, text: &str) -> Result<(), KeyError> {
        self.clipboard()
            .write_text(text.to_string())
            .map_err(|e| KeyError::Clipboard(e.to_string()))
    }
}
