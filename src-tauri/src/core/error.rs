use thiserror::Error;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Everything that can go wrong while managing services and their keys.
///
/// None of these are fatal: the store is never left half-written, so the
/// user can simply retry the action that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Reading, validating or flushing the store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The key already exists in this service (exact, case-sensitive match).
    #[error("This API key already exists for service '{service}'")]
    DuplicateKey { service: String },

    /// A service with this name already exists (case-insensitive match).
    #[error("A service named '{0}' already exists")]
    DuplicateService(String),

    /// Target of a toggle/copy/delete is not in the collection.
    #[error("'{0}' not found")]
    NotFound(String),

    /// Selection was attempted on an empty collection.
    #[error("No API keys: no keys available for this service")]
    NoKeys,

    /// Every key in the collection is inside an unexpired limit window.
    #[error("No working keys: all keys for this service are currently rate-limited")]
    NoAvailableKeys,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for KeyError {
    fn from(e: serde_json::Error) -> Self {
        KeyError::Persistence(e.to_string())
    }
}

impl From<std::io::Error> for KeyError {
    fn from(e: std::io::Error) -> Self {
        KeyError::Persistence(e.to_string())
    }
}
