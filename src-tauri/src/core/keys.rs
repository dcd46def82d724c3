use rand::Rng;
use serde_json::Value;

use super::clipboard::Clipboard;
use super::error::KeyError;
use super::rate_limit;
use super::store::{commit, json_kind, KvStore};
use super::types::{ApiKeyRecord, KeyView, PickedKey};

// ── Key Store Accessor ───────────────────────────────────────────────────────
//
// Each service's keys live under `api_keys_<service>` as an ordered array.
// Uniqueness is not checked here; `rate_limit::insert` owns that rule.

pub fn storage_key(service: &str) -> String {
    format!("api_keys_{}", service)
}

/// Load and validate a service's keys.  A missing entry is an empty list.
pub fn load_keys<S: KvStore + ?Sized>(
    store: &S,
    service: &str,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    let entry = storage_key(service);
    let items = match store.get(&entry) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(KeyError::Persistence(format!(
                "'{}' should be an array of keys, found {}",
                entry,
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let mut record: ApiKeyRecord = serde_json::from_value(item).map_err(|e| {
            KeyError::Persistence(format!("'{}' entry {} is malformed: {}", entry, i, e))
        })?;
        if record.key.is_empty() {
            return Err(KeyError::Persistence(format!(
                "'{}' entry {} has an empty key",
                entry, i
            )));
        }
        if record.rate_limit_hours == 0 {
            return Err(KeyError::Persistence(format!(
                "'{}' entry {} has a zero-hour rate limit",
                entry, i
            )));
        }
        if !record.is_rate_limited {
            record.limited_at = None;
        }
        records.push(record);
    }
    Ok(records)
}

/// Stage a full replacement of the service's keys without flushing.
pub fn stage_keys<S: KvStore + ?Sized>(
    store: &mut S,
    service: &str,
    records: &[ApiKeyRecord],
) -> Result<(), KeyError> {
    let value = serde_json::to_value(records)?;
    store.set(&storage_key(service), value);
    Ok(())
}

pub fn save_keys<S: KvStore + ?Sized>(
    store: &mut S,
    service: &str,
    records: &[ApiKeyRecord],
) -> Result<(), KeyError> {
    stage_keys(store, service, records)?;
    commit(store)
}

/// Stage removal of the whole collection; the caller commits.
pub fn delete_keys<S: KvStore + ?Sized>(store: &mut S, service: &str) -> bool {
    store.delete(&storage_key(service))
}

// ── Key Actions ──────────────────────────────────────────────────────────────

pub fn key_views<S: KvStore + ?Sized>(
    store: &S,
    service: &str,
    now: i64,
) -> Result<Vec<KeyView>, KeyError> {
    Ok(load_keys(&*store, service)?
        .iter()
        .map(|r| rate_limit::key_view(r, now))
        .collect())
}

pub fn add_key<S: KvStore + ?Sized>(
    store: &mut S,
    service: &str,
    key: &str,
    rate_limit_hours: u32,
    already_limited: bool,
    now: i64,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    if key.trim().is_empty() {
        return Err(KeyError::InvalidInput("API Key cannot be empty.".into()));
    }
    if rate_limit_hours == 0 {
        return Err(KeyError::InvalidInput(
            "Rate limit must be at least 1 hour.".into(),
        ));
    }

    let current = load_keys(&*store, service)?;
    let record = ApiKeyRecord::new(key, rate_limit_hours, already_limited, now);
    let updated = rate_limit::insert(&current, record, service)?;
    save_keys(store, service, &updated)?;
    log::info!(
        "added key {} to '{}' ({}h window)",
        rate_limit::mask_key(key),
        service,
        rate_limit_hours
    );
    Ok(updated)
}

/// Apply or reset a key's limit.  An unknown key is a silent no-op.
pub fn toggle_key_limit<S: KvStore + ?Sized>(
    store: &mut S,
    service: &str,
    key: &str,
    now: i64,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    let current = load_keys(&*store, service)?;
    let updated = match rate_limit::toggle(&current, key, now) {
        Ok(updated) => updated,
        Err(KeyError::NotFound(_)) => {
            log::debug!("toggle ignored: key not in '{}'", service);
            return Ok(current);
        }
        Err(e) => return Err(e),
    };
    save_keys(store, service, &updated)?;
    if let Some(r) = updated.iter().find(|r| r.key == key) {
        log::info!(
            "key {} in '{}' is now {}",
            rate_limit::mask_key(key),
            service,
            if r.is_rate_limited { "rate limited" } else { "reset" }
        );
    }
    Ok(updated)
}

pub fn delete_key<S: KvStore + ?Sized>(
    store: &mut S,
    service: &str,
    key: &str,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    let current = load_keys(&*store, service)?;
    let updated = rate_limit::remove(&current, key);
    if updated.len() == current.len() {
        log::debug!("delete ignored: key not in '{}'", service);
        return Ok(current);
    }
    save_keys(store, service, &updated)?;
    log::info!("deleted key {} from '{}'", rate_limit::mask_key(key), service);
    Ok(updated)
}

pub fn copy_key<S: KvStore + ?Sized, C: Clipboard + ?Sized>(
    store: &S,
    clipboard: &C,
    service: &str,
    key: &str,
) -> Result<(), KeyError> {
    let records = load_keys(&*store, service)?;
    if !records.iter().any(|r| r.key == key) {
        return Err(KeyError::NotFound(rate_limit::mask_key(key)));
    }
    clipboard.write_text(key)
}

/// Copy a random working key to the clipboard and start its limit window.
///
/// Nothing is persisted unless the clipboard write succeeded.
pub fn pick_working_key<S, C, R>(
    store: &mut S,
    clipboard: &C,
    service: &str,
    now: i64,
    rng: &mut R,
) -> Result<PickedKey, KeyError>
where
    S: KvStore + ?Sized,
    C: Clipboard + ?Sized,
    R: Rng,
{
    let current = load_keys(&*store, service)?;
    let (picked, updated) = rate_limit::select_random_available(&current, now, rng)?;
    clipboard.write_text(&picked.key)?;
    save_keys(store, service, &updated)?;

    let masked_key = rate_limit::mask_key(&picked.key);
    log::info!(
        "picked key {} from '{}', limited for {}h",
        masked_key,
        service,
        picked.rate_limit_hours
    );
    Ok(PickedKey {
        key: picked.key,
        masked_key,
        rate_limit_hours: picked.rate_limit_hours,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
