pub mod clipboard;
pub mod error;
pub mod keys;
pub mod paths;
pub mod rate_limit;
pub mod services;
pub mod settings;
pub mod store;
pub mod types;

pub use clipboard::Clipboard;
pub use error::KeyError;
pub use keys::{add_key, copy_key, delete_key, key_views, load_keys, pick_working_key, toggle_key_limit};
pub use paths::{get_app_data_dir, get_keyrotator_dir, APP_IDENTIFIER};
pub use services::{add_service, delete_service, load_services};
pub use settings::{read_settings, write_settings, Settings};
pub use store::{JsonFileStore, KvStore};
pub use types::{ApiKeyRecord, KeyView, PickedKey, Service};

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
