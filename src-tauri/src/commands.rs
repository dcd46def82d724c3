mod keys;
mod services;
mod settings;

pub use keys::*;
pub use services::*;
pub use settings::*;

use tauri::{AppHandle, Wry};

use crate::core::{self, store::PluginStore, KeyError};

/// The store named in settings, re-read from disk so writes made by the
/// CLI since the last action are not overwritten.
fn open_store(app: &AppHandle) -> Result<PluginStore<Wry>, String> {
    let settings = core::read_settings()?;
    PluginStore::open(app, &settings.store_file).map_err(|e| {
        log::warn!("could not open {}: {}", settings.store_file, e);
        e.to_string()
    })
}

/// Turn a core error into the message shown in the frontend toast.
fn surface(action: &str, e: KeyError) -> String {
    match &e {
        KeyError::Persistence(_) | KeyError::Clipboard(_) => {
            log::warn!("{} failed: {}", action, e)
        }
        _ => log::debug!("{} rejected: {}", action, e),
    }
    e.to_string()
}
