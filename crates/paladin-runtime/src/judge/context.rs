use serde::{Deserialize, Serialize};

/// Optional context sent to the judge along with the prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<History>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_code: Option<String>,
}

/// Conversation history as individual turns or one pre-formatted block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum History {
    Lines(Vec<String>),
    Text(String),
}

impl History {
    /// Render for inclusion in a judge request; `None` when there is nothing to show
    pub fn render(&self) -> Option<String> {
        let rendered = match self {
            History::Lines(lines) => lines
                .iter()
                .map(|line| format!("- {}", line))
                .collect::<Vec<_>>()
                .join("\n"),
            History::Text(text) => text.clone(),
        };
        if rendered.trim().is_empty() {
            None
        } else {
            Some(rendered)
        }
    }
}

impl PromptContext {
    pub fn is_empty(&self) -> bool {
        self.conversation_history
            .as_ref()
            .and_then(History::render)
            .is_none()
            && self.active_files.is_empty()
            && self.selected_code.as_deref().map_or(true, |c| c.trim().is_empty())
    }

    /// Fill fields that are unset here from `other`
    pub fn merge_missing(mut self, other: PromptContext) -> Self {
        if self.conversation_history.is_none() {
            self.conversation_history = other.conversation_history;
        }
        if self.active_files.is_empty() {
            self.active_files = other.active_files;
        }
        if self.selected_code.is_none() {
            self.selected_code = other.selected_code;
        }
        self
    }
}
