use std::path::PathBuf;

use crate::core::{self, Clipboard, JsonFileStore, KeyError};

// ── Headless CLI ─────────────────────────────────────────────────────────────
//
//   keyrotator services
//   keyrotator keys <service>
//   keyrotator pick <service>          prints the key, starts its window
//   keyrotator reset <service> <key>   clears a running limit
//
// Works on the same store file as the desktop app.

#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Services,
    Keys { service: String },
    Pick { service: String },
    Reset { service: String, key: String },
}

/// `None` means "not a CLI invocation": launch the desktop app instead.
pub fn parse_args(args: &[String]) -> Option<Result<CliCommand, String>> {
    let verb = args.get(1)?;
    let rest = &args[2..];
    let command = match (verb.as_str(), rest) {
        ("services", []) => Ok(CliCommand::Services),
        ("keys", [service]) => Ok(CliCommand::Keys {
            service: service.clone(),
        }),
        ("pick", [service]) => Ok(CliCommand::Pick {
            service: service.clone(),
        }),
        ("reset", [service, key]) => Ok(CliCommand::Reset {
            service: service.clone(),
            key: key.clone(),
        }),
        ("services", _) => Err("usage: keyrotator services".to_string()),
        ("keys", _) => Err("usage: keyrotator keys <service>".to_string()),
        ("pick", _) => Err("usage: keyrotator pick <service>".to_string()),
        ("reset", _) => Err("usage: keyrotator reset <service> <key>".to_string()),
        _ => return None,
    };
    Some(command)
}

/// Writes the picked key to stdout so it can be piped into a clipboard tool.
struct Stdout;

impl Clipboard for Stdout {
    fn write_text(&self, text: &str) -> Result<(), KeyError> {
        println!("{}", text);
        Ok(())
    }
}

pub fn default_store_path() -> Result<PathBuf, String> {
    let settings = core::read_settings()?;
    Ok(core::get_app_data_dir()?.join(settings.store_file))
}

pub fn run(command: CliCommand) -> Result<(), String> {
    let path = default_store_path()?;
    let mut store = JsonFileStore::open(&path).map_err(|e| e.to_string())?;
    execute(&mut store, command, core::now_ms()).map_err(|e| e.to_string())
}

fn execute(store: &mut JsonFileStore, command: CliCommand, now: i64) -> Result<(), KeyError> {
    match command {
        CliCommand::Services => {
            for service in core::load_services(&*store)? {
                println!("{}", service.name);
            }
        }
        CliCommand::Keys { service } => {
            for view in core::key_views(&*store, &service, now)? {
                println!("{}  {}", view.masked_key, view.status);
            }
        }
        CliCommand::Pick { service } => {
            core::pick_working_key(store, &Stdout, &service, now, &mut rand::rng())?;
        }
        CliCommand::Reset { service, key } => {
            let records = core::load_keys(&*store, &service)?;
            match records.iter().find(|r| r.key == key) {
                Some(r) if r.is_rate_limited => {
                    core::toggle_key_limit(store, &service, &key, now)?;
                }
                Some(_) => eprintln!("[keyrotator] key is not rate limited"),
                None => return Err(KeyError::NotFound(core::rate_limit::mask_key(&key))),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KvStore;
    use serde_json::json;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("keyrotator")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_args_launches_gui() {
        assert_eq!(parse_args(&args(&[])), None);
        assert_eq!(parse_args(&args(&["--flag"])), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_args(&args(&["services"])), Some(Ok(CliCommand::Services)));
        assert_eq!(
            parse_args(&args(&["pick", "OpenAI"])),
            Some(Ok(CliCommand::Pick {
                service: "OpenAI".into()
            }))
        );
        assert_eq!(
            parse_args(&args(&["reset", "OpenAI", "sk-1"])),
            Some(Ok(CliCommand::Reset {
                service: "OpenAI".into(),
                key: "sk-1".into()
            }))
        );
        assert!(matches!(parse_args(&args(&["pick"])), Some(Err(_))));
    }

    #[test]
    fn test_pick_and_reset_against_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("services", json!([{ "name": "OpenAI", "api_keys": [] }]));
        store.set(
            "api_keys_OpenAI",
            json!([{ "key": "sk-1", "is_rate_limited": false, "rate_limit_time": 1, "rateLimitedAt": null }]),
        );
        store.save().unwrap();

        execute(&mut store, CliCommand::Pick { service: "OpenAI".into() }, 1_000).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(core::load_keys(&reopened, "OpenAI").unwrap()[0].is_rate_limited);

        let err = execute(&mut store, CliCommand::Pick { service: "OpenAI".into() }, 2_000);
        assert_eq!(err.unwrap_err(), KeyError::NoAvailableKeys);

        execute(
            &mut store,
            CliCommand::Reset {
                service: "OpenAI".into(),
                key: "sk-1".into(),
            },
            3_000,
        )
        .unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(!core::load_keys(&reopened, "OpenAI").unwrap()[0].is_rate_limited);
    }
}
