use serde::{Deserialize, Serialize};

// ── Data Structures ──────────────────────────────────────────────────────────

/// One API key and its rate-limit state.
///
/// Field names on disk follow the store layout the frontend has always
/// written (`rate_limit_time`, `rateLimitedAt`), so existing store files keep
/// loading.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub key: String,
    #[serde(default)]
    pub is_rate_limited: bool,
    /// Length of a limit window, in whole hours.
    #[serde(rename = "rate_limit_time", default = "default_rate_limit_hours")]
    pub rate_limit_hours: u32,
    /// Epoch milliseconds at which the current window started.
    #[serde(rename = "rateLimitedAt", default)]
    pub limited_at: Option<i64>,
}

fn default_rate_limit_hours() -> u32 {
    1
}

impl ApiKeyRecord {
    /// A fresh record.  `already_limited` starts a window at `now`, for keys
    /// the user knows are exhausted at the moment they add them.
    pub fn new(key: &str, rate_limit_hours: u32, already_limited: bool, now: i64) -> Self {
        Self {
            key: key.to_string(),
            is_rate_limited: already_limited,
            rate_limit_hours,
            limited_at: already_limited.then_some(now),
        }
    }
}

/// A named group of keys.  The keys themselves live under their own store
/// entry; `api_keys` is always persisted empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
}

impl Service {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            api_keys: Vec::new(),
        }
    }
}

/// Display row for the key list, derived at a point in time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KeyView {
    pub key: String,
    pub masked_key: String,
    pub is_rate_limited: bool,
    pub rate_limit_hours: u32,
    pub limited_at: Option<i64>,
    /// Zero once the window is over, even while `is_rate_limited` is still set.
    pub remaining_ms: i64,
    pub available: bool,
    pub status: String,
}

/// Result of "get a random working key".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PickedKey {
    pub key: String,
    pub masked_key: String,
    pub rate_limit_hours: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_reads_legacy_field_names() {
        let raw = json!({
            "key": "sk-abc",
            "is_rate_limited": true,
            "rate_limit_time": 24,
            "rateLimitedAt": 1_700_000_000_000i64
        });
        let record: ApiKeyRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.rate_limit_hours, 24);
        assert_eq!(record.limited_at, Some(1_700_000_000_000));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["rate_limit_time"], 24);
        assert!(back.get("rate_limit_hours").is_none());
    }

    #[test]
    fn test_new_record_only_stamps_when_limited() {
        let free = ApiKeyRecord::new("a", 1, false, 42);
        assert_eq!(free.limited_at, None);
        assert!(!free.is_rate_limited);

        let limited = ApiKeyRecord::new("b", 3, true, 42);
        assert_eq!(limited.limited_at, Some(42));
        assert!(limited.is_rate_limited);
    }

    #[test]
    fn test_service_without_keys_field() {
        let svc: Service = serde_json::from_value(json!({ "name": "OpenAI" })).unwrap();
        assert_eq!(svc, Service::new("OpenAI"));
    }
}
