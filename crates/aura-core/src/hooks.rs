//! Agent hook installation.
//!
//! The host coding tool runs configured hook commands on lifecycle events;
//! aura installs entries that call `aura notify <state>` so the daemon
//! hears about transitions. The settings file is shared with the user's
//! own hooks, so install/uninstall only ever touch entries that carry the
//! aura marker.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

/// Substring identifying entries owned by aura.
const HOOK_MARKER: &str = "aura notify";

/// Timeout (seconds) the host tool applies to each hook command.
const HOOK_TIMEOUT_SECS: u64 = 3;

/// One hook registration: host event → state to notify.
struct HookDef {
    event: &'static str,
    state: &'static str,
    matcher: Option<&'static str>,
}

/// Event wiring: prompt submitted means the agent is working; the rest
/// all mean it is the user's turn.
const HOOK_DEFS: [HookDef; 4] = [
    HookDef {
        event: "UserPromptSubmit",
        state: "thinking",
        matcher: None,
    },
    HookDef {
        event: "Notification",
        state: "needs_input",
        matcher: Some("permission_prompt"),
    },
    HookDef {
        event: "Notification",
        state: "needs_input",
        matcher: Some("idle_prompt"),
    },
    HookDef {
        event: "Stop",
        state: "needs_input",
        matcher: None,
    },
];

/// Errors from settings-file editing.
#[derive(Debug, thiserror::Error)]
pub enum HooksError {
    #[error("failed to read or write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings file is malformed: {0}")]
    Malformed(String),

    #[error("could not determine home directory")]
    NoHome,
}

/// Default location of the host tool's settings file.
pub fn default_settings_path() -> Result<PathBuf, HooksError> {
    dirs::home_dir()
        .map(|home| home.join(".claude").join("settings.json"))
        .ok_or(HooksError::NoHome)
}

fn is_aura_entry(entry: &Value) -> bool {
    entry
        .pointer("/hooks")
        .and_then(Value::as_array)
        .is_some_and(|hooks| {
            hooks.iter().any(|h| {
                h.get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|cmd| cmd.contains(HOOK_MARKER))
            })
        })
}

/// Strip aura-owned entries from every event, dropping emptied events.
/// Returns how many entries were removed.
fn strip_aura_entries(hooks: &mut Map<String, Value>) -> usize {
    let mut removed = 0;
    let mut emptied = Vec::new();
    for (event, entries) in hooks.iter_mut() {
        if let Some(list) = entries.as_array_mut() {
            let before = list.len();
            list.retain(|entry| !is_aura_entry(entry));
            removed += before - list.len();
            if list.is_empty() {
                emptied.push(event.clone());
            }
        }
    }
    for event in emptied {
        hooks.remove(&event);
    }
    removed
}

fn read_settings(path: &Path) -> Result<Value, HooksError> {
    if path.exists() {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    } else {
        Ok(json!({}))
    }
}

fn write_settings(path: &Path, settings: &Value) -> Result<(), HooksError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(settings)? + "\n")?;
    Ok(())
}

/// Install aura hooks into the settings file, replacing any prior aura
/// entries and preserving everything else.
///
/// `notify_program` is the invocation prefix for the notifier, typically
/// the absolute path to the `aura` binary.
pub fn install_hooks(path: &Path, notify_program: &str) -> Result<(), HooksError> {
    let mut settings = read_settings(path)?;
    let root = settings
        .as_object_mut()
        .ok_or_else(|| HooksError::Malformed("settings root is not an object".to_string()))?;

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| HooksError::Malformed("\"hooks\" is not an object".to_string()))?;

    strip_aura_entries(hooks);

    for def in &HOOK_DEFS {
        let mut entry = json!({
            "hooks": [{
                "type": "command",
                "command": format!("{notify_program} notify {}", def.state),
                "timeout": HOOK_TIMEOUT_SECS,
            }]
        });
        if let Some(matcher) = def.matcher {
            entry["matcher"] = json!(matcher);
        }
        hooks
            .entry(def.event)
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .ok_or_else(|| {
                HooksError::Malformed(format!("hooks.{} is not an array", def.event))
            })?
            .push(entry);
    }

    write_settings(path, &settings)
}

/// Remove all aura entries. Returns how many were removed.
pub fn uninstall_hooks(path: &Path) -> Result<usize, HooksError> {
    if !path.exists() {
        return Ok(0);
    }
    let mut settings = read_settings(path)?;
    let Some(hooks) = settings
        .get_mut("hooks")
        .and_then(Value::as_object_mut)
    else {
        return Ok(0);
    };

    let removed = strip_aura_entries(hooks);
    if hooks.is_empty() {
        settings.as_object_mut().and_then(|root| root.remove("hooks"));
    }
    write_settings(path, &settings)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn settings_in(tmp: &TempDir) -> PathBuf {
        tmp.path().join("settings.json")
    }

    #[test]
    fn test_install_into_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);

        install_hooks(&path, "/usr/local/bin/aura").unwrap();

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let hooks = settings["hooks"].as_object().unwrap();
        assert!(hooks.contains_key("UserPromptSubmit"));
        assert!(hooks.contains_key("Notification"));
        assert!(hooks.contains_key("Stop"));
        assert_eq!(hooks["Notification"].as_array().unwrap().len(), 2);

        let cmd = settings
            .pointer("/hooks/UserPromptSubmit/0/hooks/0/command")
            .unwrap()
            .as_str()
            .unwrap();
        assert_eq!(cmd, "/usr/local/bin/aura notify thinking");
    }

    #[test]
    fn test_install_preserves_foreign_settings_and_hooks() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);
        std::fs::write(
            &path,
            r#"{
                "theme": "dark",
                "hooks": {
                    "Stop": [{"hooks": [{"type": "command", "command": "say done"}]}]
                }
            }"#,
        )
        .unwrap();

        install_hooks(&path, "aura").unwrap();

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(settings["theme"], "dark");
        // Foreign Stop hook kept, aura Stop hook appended.
        assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_reinstall_does_not_duplicate() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);

        install_hooks(&path, "aura").unwrap();
        install_hooks(&path, "aura").unwrap();

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 1);
        assert_eq!(
            settings["hooks"]["Notification"].as_array().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_uninstall_removes_only_aura_entries() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);
        std::fs::write(
            &path,
            r#"{
                "hooks": {
                    "Stop": [{"hooks": [{"type": "command", "command": "say done"}]}]
                }
            }"#,
        )
        .unwrap();

        install_hooks(&path, "aura").unwrap();
        let removed = uninstall_hooks(&path).unwrap();
        assert_eq!(removed, 4);

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 1);
        assert!(settings["hooks"].get("UserPromptSubmit").is_none());
    }

    #[test]
    fn test_uninstall_missing_file_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(uninstall_hooks(&settings_in(&tmp)).unwrap(), 0);
    }

    #[test]
    fn test_uninstall_drops_empty_hooks_object() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);
        install_hooks(&path, "aura").unwrap();
        uninstall_hooks(&path).unwrap();

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(settings.get("hooks").is_none());
    }

    #[test]
    fn test_matcher_entries_carry_matcher() {
        let tmp = TempDir::new().unwrap();
        let path = settings_in(&tmp);
        install_hooks(&path, "aura").unwrap();

        let settings: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let matchers: Vec<&str> = settings["hooks"]["Notification"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["matcher"].as_str().unwrap())
            .collect();
        assert_eq!(matchers, vec!["permission_prompt", "idle_prompt"]);
    }
}
