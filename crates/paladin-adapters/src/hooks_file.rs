//! Reading and writing the host's hooks file
//! (`{"version": 1, "hooks": {"<event>": [{"command": ...}]}}`).

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Hook event the guard is registered under
pub const PROMPT_EVENT: &str = "beforeSubmitPrompt";

/// What was found at the hooks file path
#[derive(Debug)]
pub enum Loaded {
    Missing,
    Corrupted(String),
    Document(Map<String, Value>),
}

/// Read and parse the hooks file. A document whose root is not an object
/// counts as corrupted.
pub fn load(path: &Path) -> Result<Loaded> {
    if !path.exists() {
        return Ok(Loaded::Missing);
    }
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read hooks file: {:?}", path))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Loaded::Document(map)),
        Ok(_) => Ok(Loaded::Corrupted("root is not a JSON object".to_string())),
        Err(e) => Ok(Loaded::Corrupted(e.to_string())),
    }
}

/// Fresh document with an empty prompt hook list
pub fn empty_document() -> Map<String, Value> {
    match json!({"version": 1, "hooks": {PROMPT_EVENT: []}}) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Take the prompt hook list out of the document. A missing or mistyped
/// list comes back empty.
pub fn take_prompt_hooks(doc: &mut Map<String, Value>) -> Vec<Value> {
    let Some(Value::Object(hooks)) = doc.get_mut("hooks") else {
        return Vec::new();
    };
    match hooks.remove(PROMPT_EVENT) {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            warn!(event = PROMPT_EVENT, value = %other, "Discarding non-array hook list");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Store the prompt hook list, creating (or replacing a mistyped) `hooks`
/// object as needed.
pub fn set_prompt_hooks(doc: &mut Map<String, Value>, entries: Vec<Value>) {
    if let Some(Value::Object(hooks)) = doc.get_mut("hooks") {
        hooks.insert(PROMPT_EVENT.to_string(), Value::Array(entries));
        return;
    }
    if doc.contains_key("hooks") {
        warn!("Replacing non-object \"hooks\" value");
    }
    doc.insert("hooks".to_string(), json!({ PROMPT_EVENT: entries }));
}

/// Entries of the prompt hook list, without modifying the document
pub fn prompt_hooks(doc: &Map<String, Value>) -> &[Value] {
    doc.get("hooks")
        .and_then(|hooks| hooks.get(PROMPT_EVENT))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True when any hook event other than the prompt one has entries registered
pub fn has_other_hook_types(doc: &Map<String, Value>) -> bool {
    doc.get("hooks")
        .and_then(Value::as_object)
        .map(|hooks| {
            hooks.iter().any(|(event, entries)| {
                event != PROMPT_EVENT && entries.as_array().map_or(true, |a| !a.is_empty())
            })
        })
        .unwrap_or(false)
}

/// An entry belongs to a project when its `command` or any of its `args`
/// mentions the project root path.
pub fn is_project_entry(entry: &Value, project_root: &str) -> bool {
    if project_root.is_empty() {
        return false;
    }
    // Commands carry the root shell-quoted
    let quoted = shell_quote(project_root);
    let mentions = |value: &Value| {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.contains(project_root) || text.contains(&quoted)
    };

    entry.get("command").is_some_and(mentions)
        || entry
            .get("args")
            .and_then(Value::as_array)
            .is_some_and(|args| args.iter().any(mentions))
}

/// Quote a path for the host's shell when it contains anything unusual
pub fn shell_quote(raw: &str) -> String {
    let plain = raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-+:=@%,".contains(c));
    if plain && !raw.is_empty() {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}

/// Two entries are equivalent when their commands match
pub fn same_command(a: &Value, b: &Value) -> bool {
    a.get("command") == b.get("command")
}

/// Pretty JSON with a trailing newline
pub fn render(doc: &Map<String, Value>) -> Result<String> {
    let mut text = serde_json::to_string_pretty(doc).context("Failed to serialize hooks file")?;
    text.push('\n');
    Ok(text)
}

/// Backup path: `hooks.json` -> `hooks.backup.YYYYMMDD_HHMMSS`
pub fn backup_path(path: &Path, timestamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hooks".to_string());
    path.with_file_name(format!("{}.backup.{}", stem, timestamp))
}

/// Copy the current file aside. Failure is logged and reported as `None`.
pub fn create_backup(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = backup_path(path, &timestamp);
    match std::fs::copy(path, &backup) {
        Ok(_) => {
            debug!(backup = ?backup, "Hooks file backed up");
            Some(backup)
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Could not create backup");
            None
        }
    }
}

/// Atomic write: temp file in the same directory, then rename over `path`
pub fn write_atomic(path: &Path, doc: &Map<String, Value>) -> Result<()> {
    let content = render(doc)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .context(format!("Failed to create directories: {:?}", parent))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .context("Failed to create temp file for atomic write")?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write to temp file")?;
    tmp.flush()?;

    tmp.persist(path)
        .context(format!("Failed to persist file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_project_entry_matching() {
        let root = "/home/dev/shop";
        let by_command = json!({"command": "/usr/bin/paladin hook --project-root /home/dev/shop"});
        assert!(is_project_entry(&by_command, root));
        let by_args = json!({"command": "paladin", "args": ["hook", "/home/dev/shop"]});
        assert!(is_project_entry(&by_args, root));
        assert!(!is_project_entry(&json!({"command": "/home/dev/other/run.sh"}), root));
        assert!(!is_project_entry(&json!({"args": 3}), root));
        assert!(!is_project_entry(&json!({"command": "anything"}), ""));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/opt/bin/paladin"), "/opt/bin/paladin");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_take_and_set_repair_shape() {
        let mut d = doc(json!({"version": 1, "hooks": {"beforeSubmitPrompt": "oops", "stop": []}}));
        let mut entries = take_prompt_hooks(&mut d);
        assert!(entries.is_empty());
        entries.push(json!({"command": "x"}));
        set_prompt_hooks(&mut d, entries);
        assert_eq!(d["hooks"]["beforeSubmitPrompt"], json!([{"command": "x"}]));
        assert_eq!(d["hooks"]["stop"], json!([]));

        let mut bare = doc(json!({"version": 1, "hooks": 7}));
        assert!(take_prompt_hooks(&mut bare).is_empty());
        set_prompt_hooks(&mut bare, Vec::new());
        assert_eq!(bare["hooks"], json!({"beforeSubmitPrompt": []}));
    }

    #[test]
    fn test_has_other_hook_types() {
        assert!(!has_other_hook_types(&empty_document()));
        let with_edit_hook = doc(json!({"hooks": {"afterFileEdit": [{"command": "fmt"}]}}));
        assert!(has_other_hook_types(&with_edit_hook));
        assert!(!has_other_hook_types(&doc(json!({"hooks": {"afterFileEdit": []}}))));
    }

    #[test]
    fn test_backup_path_format() {
        let backup = backup_path(Path::new("/tmp/cursor/hooks.json"), "20250101_093000");
        assert_eq!(backup, PathBuf::from("/tmp/cursor/hooks.backup.20250101_093000"));
    }

    #[test]
    fn test_write_atomic_pretty_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hooks.json");
        write_atomic(&path, &empty_document()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\n  \"hooks\""));
        assert!(matches!(load(&path).unwrap(), Loaded::Document(_)));
    }

    #[test]
    fn test_load_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        assert!(matches!(load(&path).unwrap(), Loaded::Missing));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path).unwrap(), Loaded::Corrupted(_)));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load(&path).unwrap(), Loaded::Corrupted(_)));
    }
}
