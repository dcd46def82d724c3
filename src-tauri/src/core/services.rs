use serde_json::Value;

use super::error::KeyError;
use super::keys::delete_keys;
use super::paths::is_valid_name;
use super::store::{commit, json_kind, KvStore};
use super::types::Service;

// ── Service Registry ─────────────────────────────────────────────────────────
//
// The registry is the ordered `services` array.  Keys are never nested in it;
// each service's keys live under their own `api_keys_<name>` entry.

pub const SERVICES_KEY: &str = "services";

pub fn load_services<S: KvStore + ?Sized>(store: &S) -> Result<Vec<Service>, KeyError> {
    let items = match store.get(SERVICES_KEY) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(KeyError::Persistence(format!(
                "'{}' should be an array of services, found {}",
                SERVICES_KEY,
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let service: Service = serde_json::from_value(item).map_err(|e| {
                KeyError::Persistence(format!("service entry {} is malformed: {}", i, e))
            })?;
            if !is_valid_name(&service.name) {
                return Err(KeyError::Persistence(format!(
                    "service entry {} has an empty name",
                    i
                )));
            }
            Ok(Service::new(&service.name))
        })
        .collect()
}

fn stage_services<S: KvStore + ?Sized>(
    store: &mut S,
    services: &[Service],
) -> Result<(), KeyError> {
    let stripped: Vec<Service> = services.iter().map(|s| Service::new(&s.name)).collect();
    store.set(SERVICES_KEY, serde_json::to_value(stripped)?);
    Ok(())
}

pub fn save_services<S: KvStore + ?Sized>(
    store: &mut S,
    services: &[Service],
) -> Result<(), KeyError> {
    stage_services(store, services)?;
    commit(store)
}

/// Append `service`; names are unique ignoring case.
pub fn insert_service(registry: &[Service], service: Service) -> Result<Vec<Service>, KeyError> {
    let lowered = service.name.to_lowercase();
    if registry.iter().any(|s| s.name.to_lowercase() == lowered) {
        return Err(KeyError::DuplicateService(service.name));
    }
    let mut updated = registry.to_vec();
    updated.push(service);
    Ok(updated)
}

/// Drop the service whose name matches exactly.
pub fn remove_service(registry: &[Service], name: &str) -> Vec<Service> {
    registry.iter().filter(|s| s.name != name).cloned().collect()
}

pub fn add_service<S: KvStore + ?Sized>(store: &mut S, name: &str) -> Result<Vec<Service>, KeyError> {
    let name = name.trim();
    if !is_valid_name(name) {
        return Err(KeyError::InvalidInput("Service name cannot be empty.".into()));
    }
    let current = load_services(&*store)?;
    let updated = insert_service(&current, Service::new(name))?;
    save_services(store, &updated)?;
    log::info!("added service '{}'", name);
    Ok(updated)
}

/// Delete a service and, with it, its whole key collection.
///
/// The key entry is removed before the registry is rewritten and both land
/// in a single flush.  If the process dies before that flush neither change
/// is on disk; a key entry left behind without its service is picked up
/// again when a service of the same name is re-added.
pub fn delete_service<S: KvStore + ?Sized>(
    store: &mut S,
    name: &str,
) -> Result<Vec<Service>, KeyError> {
    let current = load_services(&*store)?;
    let updated = remove_service(&current, name);
    let had_keys = delete_keys(store, name);
    if updated.len() == current.len() && !had_keys {
        log::debug!("delete ignored: no service '{}'", name);
        return Ok(current);
    }
    stage_services(store, &updated)?;
    commit(store)?;
    log::info!("deleted service '{}' and its keys", name);
    Ok(updated)
}

// ── Tests ───────────────────────────────────────────────────────────────────
