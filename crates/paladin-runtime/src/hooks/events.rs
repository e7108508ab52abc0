use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::judge::PromptContext;

/// One intercepted prompt, as read from the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookEvent {
    pub prompt: String,
    pub context: PromptContext,
}

impl HookEvent {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            context: PromptContext::default(),
        }
    }

    /// Parse the host's JSON event leniently. Empty or malformed input gives
    /// an empty event, which the dispatcher rejects as an empty prompt.
    ///
    /// Context fields may sit at the top level or under `context`; top-level
    /// values win. Unknown keys (`attachments`, ...) are ignored.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            debug!("Empty hook input");
            return Self::default();
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "Invalid JSON hook input");
                debug!(raw = %crate::judge::extract::truncate(raw, 200), "Raw hook input");
                return Self::default();
            }
        };

        let Value::Object(map) = value else {
            warn!("Hook input is not a JSON object");
            return Self::default();
        };
        debug!(keys = ?map.keys().collect::<Vec<_>>(), "Parsed hook event");

        let prompt = match map.get("prompt") {
            Some(Value::String(prompt)) => prompt.clone(),
            Some(other) => {
                warn!(kind = json_kind(other), "Hook prompt is not a string");
                String::new()
            }
            None => String::new(),
        };

        let top_level = context_from(Value::Object(map.clone()));
        let nested = map.get("context").cloned().map(context_from).unwrap_or_default();

        Self {
            prompt,
            context: top_level.merge_missing(nested),
        }
    }
}

fn context_from(value: Value) -> PromptContext {
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring malformed prompt context");
        PromptContext::default()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decision returned to the host, written once to stdout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HookResponse {
    #[serde(rename = "continue")]
    pub should_continue: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(rename = "userMessage", default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

impl HookResponse {
    /// Let the prompt through (possibly rewritten)
    pub fn allow(prompt: impl Into<String>) -> Self {
        Self {
            should_continue: true,
            prompt: Some(prompt.into()),
            user_message: None,
        }
    }

    pub fn allow_with_message(prompt: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_message: Some(message.into()),
            ..Self::allow(prompt)
        }
    }

    /// Stop the prompt and tell the user why
    pub fn block(message: impl Into<String>) -> Self {
        Self {
            should_continue: false,
            prompt: None,
            user_message: Some(message.into()),
        }
    }

    /// Minimal `{"continue": true}`: the host keeps the prompt it already has
    pub fn pass_through() -> Self {
        Self {
            should_continue: true,
            prompt: None,
            user_message: None,
        }
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings and a bool cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"continue":true}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::History;
    use serde_json::json;

    #[test]
    fn test_parse_cursor_event() {
        let event = HookEvent::parse(
            r#"{"prompt": "add a logout button", "attachments": [{"type": "file"}]}"#,
        );
        assert_eq!(event.prompt, "add a logout button");
        assert!(event.context.is_empty());
    }

    #[test]
    fn test_parse_context_top_level_and_nested() {
        let raw = json!({
            "prompt": "fix it",
            "active_files": ["src/lib.rs"],
            "context": {
                "conversation_history": "we were debugging the parser",
                "active_files": ["ignored.rs"],
                "selected_code": "fn parse() {}"
            }
        })
        .to_string();
        let event = HookEvent::parse(&raw);
        assert_eq!(event.context.active_files, vec!["src/lib.rs"]);
        assert_eq!(
            event.context.conversation_history,
            Some(History::Text("we were debugging the parser".into()))
        );
        assert_eq!(event.context.selected_code.as_deref(), Some("fn parse() {}"));
    }

    #[test]
    fn test_parse_degenerate_inputs() {
        assert_eq!(HookEvent::parse(""), HookEvent::default());
        assert_eq!(HookEvent::parse("   \n"), HookEvent::default());
        assert_eq!(HookEvent::parse("{not json"), HookEvent::default());
        assert_eq!(HookEvent::parse("[\"prompt\"]"), HookEvent::default());
        assert_eq!(HookEvent::parse(r#"{"prompt": 42}"#).prompt, "");
    }

    #[test]
    fn test_malformed_context_keeps_prompt() {
        let event = HookEvent::parse(r#"{"prompt": "add tests", "active_files": "not-a-list"}"#);
        assert_eq!(event.prompt, "add tests");
        assert!(event.context.active_files.is_empty());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(HookResponse::allow("go")).unwrap(),
            json!({"continue": true, "prompt": "go"})
        );
        assert_eq!(
            serde_json::to_value(HookResponse::block("stop")).unwrap(),
            json!({"continue": false, "userMessage": "stop"})
        );
        assert_eq!(HookResponse::pass_through().to_json(), r#"{"continue":true}"#);
    }
}
