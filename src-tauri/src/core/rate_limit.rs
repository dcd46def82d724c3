use rand::Rng;

use super::error::KeyError;
use super::types::{ApiKeyRecord, KeyView};

// ── Rate-Limit Engine ────────────────────────────────────────────────────────
//
// Pure functions over a key collection and an explicit `now` (epoch ms).
// Expiry is always derived on demand: nothing here clears `is_rate_limited`
// just because a window ran out.  Only `toggle` and selection change state.

pub const MS_PER_HOUR: i64 = 3_600_000;

/// Visible prefix of a masked key.
const MASK_VISIBLE_CHARS: usize = 4;
/// Fixed-length placeholder so the mask does not leak the key length.
const MASK_PLACEHOLDER: &str = "********************";

/// End of the current limit window, if one is running.
pub fn window_end(record: &ApiKeyRecord) -> Option<i64> {
    let started = record.limited_at?;
    let length = i64::from(record.rate_limit_hours).saturating_mul(MS_PER_HOUR);
    Some(started.saturating_add(length))
}

/// A key is available unless it sits inside an unexpired window.  A limited
/// record without a start time has no window and counts as available.
pub fn is_available(record: &ApiKeyRecord, now: i64) -> bool {
    if !record.is_rate_limited {
        return true;
    }
    match window_end(record) {
        Some(end) => now >= end,
        None => true,
    }
}

/// Milliseconds left in the window, clamped at zero.  Display only.
pub fn remaining_ms(record: &ApiKeyRecord, now: i64) -> i64 {
    window_end(record)
        .map(|end| end.saturating_sub(now).max(0))
        .unwrap_or(0)
}

/// Flip the limit on `target`.  Clearing is an unconditional manual reset,
/// even mid-window; setting stamps the window start with `now`.
pub fn toggle(
    records: &[ApiKeyRecord],
    target: &str,
    now: i64,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    if !records.iter().any(|r| r.key == target) {
        return Err(KeyError::NotFound(target.to_string()));
    }
    Ok(records
        .iter()
        .map(|r| {
            if r.key != target {
                return r.clone();
            }
            if r.is_rate_limited {
                ApiKeyRecord {
                    is_rate_limited: false,
                    limited_at: None,
                    ..r.clone()
                }
            } else {
                start_window(r, now)
            }
        })
        .collect())
}

fn start_window(record: &ApiKeyRecord, now: i64) -> ApiKeyRecord {
    ApiKeyRecord {
        is_rate_limited: true,
        limited_at: Some(now),
        ..record.clone()
    }
}

/// Pick one available key uniformly at random and start a fresh window on it.
///
/// Returns the record as it was before the pick along with the updated
/// collection.  A key whose old window has expired but whose flag is still
/// set gets a new window, never a reset.
pub fn select_random_available<R: Rng>(
    records: &[ApiKeyRecord],
    now: i64,
    rng: &mut R,
) -> Result<(ApiKeyRecord, Vec<ApiKeyRecord>), KeyError> {
    if records.is_empty() {
        return Err(KeyError::NoKeys);
    }
    let eligible: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_available(r, now))
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return Err(KeyError::NoAvailableKeys);
    }

    let chosen = eligible[rng.random_range(0..eligible.len())];
    let picked = records[chosen].clone();
    let updated = records
        .iter()
        .enumerate()
        .map(|(i, r)| if i == chosen { start_window(r, now) } else { r.clone() })
        .collect();
    Ok((picked, updated))
}

/// Append `record`; keys are unique per service, compared case-sensitively.
pub fn insert(
    records: &[ApiKeyRecord],
    record: ApiKeyRecord,
    service: &str,
) -> Result<Vec<ApiKeyRecord>, KeyError> {
    if records.iter().any(|r| r.key == record.key) {
        return Err(KeyError::DuplicateKey {
            service: service.to_string(),
        });
    }
    let mut updated = records.to_vec();
    updated.push(record);
    Ok(updated)
}

pub fn remove(records: &[ApiKeyRecord], target: &str) -> Vec<ApiKeyRecord> {
    records.iter().filter(|r| r.key != target).cloned().collect()
}

// ── Display ──────────────────────────────────────────────────────────────────

pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{}{}", visible, MASK_PLACEHOLDER)
}

/// "Ready", or a strict relative distance such as "in 59 minutes".
///
/// The unit is picked from the unrounded distance (second, minute, hour, day,
/// month, year) and only then rounded, so 59m40s reads as "in 60 minutes".
pub fn format_remaining(ms: i64) -> String {
    if ms <= 0 {
        return "Ready".to_string();
    }
    const MINUTES_IN_DAY: f64 = 1440.0;
    const MINUTES_IN_MONTH: f64 = 43_200.0;
    const MINUTES_IN_YEAR: f64 = 525_600.0;

    let minutes = ms as f64 / 60_000.0;
    let (value, unit) = if minutes < 1.0 {
        ((ms as f64 / 1000.0).round(), "second")
    } else if minutes < 60.0 {
        (minutes.round(), "minute")
    } else if minutes < MINUTES_IN_DAY {
        ((minutes / 60.0).round(), "hour")
    } else if minutes < MINUTES_IN_MONTH {
        ((minutes / MINUTES_IN_DAY).round(), "day")
    } else if minutes < MINUTES_IN_YEAR {
        ((minutes / MINUTES_IN_MONTH).round(), "month")
    } else {
        ((minutes / MINUTES_IN_YEAR).round(), "year")
    };
    let value = value as i64;
    let plural = if value == 1 { "" } else { "s" };
    format!("in {} {}{}", value, unit, plural)
}

pub fn status_label(record: &ApiKeyRecord, now: i64) -> String {
    if !record.is_rate_limited || record.limited_at.is_none() {
        return "Not Rate Limited".to_string();
    }
    let remaining = remaining_ms(record, now);
    if remaining > 0 {
        format!("Rate Limited (Wait {})", format_remaining(remaining))
    } else {
        "Rate Limit Ended (Ready)".to_string()
    }
}

pub fn key_view(record: &ApiKeyRecord, now: i64) -> KeyView {
    KeyView {
        key: record.key.clone(),
        masked_key: mask_key(&record.key),
        is_rate_limited: record.is_rate_limited,
        rate_limit_hours: record.rate_limit_hours,
        limited_at: record.limited_at,
        remaining_ms: remaining_ms(record, now),
        available: is_available(record, now),
        status: status_label(record, now),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
