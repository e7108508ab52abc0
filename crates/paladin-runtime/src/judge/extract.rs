//! Turning free-form judge replies into fully populated result structs.
//!
//! Replies are expected to hold one JSON object, but models wrap it in code
//! fences or surround it with prose. Missing or mistyped fields are filled
//! with the documented defaults rather than rejected.

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

use super::types::{
    DiscussResult, GuardResult, HealMode, HealResult, Suggestion, SuggestionsResult, Verdict,
};

/// Reason used when the judge omits one
pub const DEFAULT_REASON: &str = "No reason provided";
/// Confidence used when the judge omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Remove a surrounding ```lang ... ``` fence, if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line ("```json")
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Find the JSON object in a judge reply
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>> {
    let stripped = strip_code_fences(text);
    if let Some(map) = parse_object(stripped) {
        return Ok(map);
    }

    // Fenced block somewhere inside prose
    if let Some(start) = text.find("```") {
        let inner = &text[start..];
        if let Some(end) = inner[3..].find("```") {
            if let Some(map) = parse_object(strip_code_fences(&inner[..end + 6])) {
                return Ok(map);
            }
        }
    }

    // Outermost braces
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Some(map) = parse_object(&text[start..=end]) {
                return Ok(map);
            }
        }
    }

    Err(anyhow!(
        "Judge response did not contain a JSON object: {}",
        truncate(text.trim(), 120)
    ))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Fill a guard result from the judge's object.
///
/// Defaults: verdict `intervene` (a reply missing its own verdict is not
/// trusted to mean "proceed"), confidence 0.5 clamped into [0, 1], issues
/// empty, reason [`DEFAULT_REASON`], suggestions absent.
pub fn guard_result_from_map(map: &Map<String, Value>) -> GuardResult {
    let verdict = map
        .get("verdict")
        .and_then(Value::as_str)
        .map(Verdict::parse)
        .unwrap_or(Verdict::Intervene);

    let confidence = map
        .get("confidence")
        .and_then(number_like)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let suggestions = match map.get("suggestions") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let joined = string_list(items).join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    };

    GuardResult {
        verdict,
        reason: non_empty_str(map, "reason").unwrap_or_else(|| DEFAULT_REASON.to_string()),
        confidence,
        issues: list_field(map, "issues").unwrap_or_default(),
        suggestions,
        error: None,
    }
}

/// Fill a heal result. Defaults: healed prompt = `original`, no changes.
/// Tone-mode replies list their edits under `tone_changes`.
pub fn heal_result_from_map(
    map: &Map<String, Value>,
    original: &str,
    mode: HealMode,
) -> HealResult {
    HealResult {
        healed_prompt: non_empty_str(map, "healed_prompt").unwrap_or_else(|| original.to_string()),
        changes_made: list_field(map, "changes_made")
            .or_else(|| list_field(map, "tone_changes"))
            .unwrap_or_default(),
        mode,
        error: None,
    }
}

/// Fill a suggestions result. Default: no suggestions. Entries may be bare
/// strings or `{prompt, improvements}` objects; entries without a prompt are dropped.
pub fn suggestions_from_map(map: &Map<String, Value>) -> SuggestionsResult {
    let suggestions = map
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(prompt) => Some(Suggestion {
                        prompt: prompt.clone(),
                        improvements: String::new(),
                    }),
                    Value::Object(obj) => non_empty_str(obj, "prompt").map(|prompt| Suggestion {
                        prompt,
                        improvements: non_empty_str(obj, "improvements").unwrap_or_default(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    SuggestionsResult {
        suggestions,
        error: None,
    }
}

/// Fill a discuss result. Defaults: no questions, empty context.
pub fn discuss_from_map(map: &Map<String, Value>) -> DiscussResult {
    DiscussResult {
        questions: list_field(map, "questions").unwrap_or_default(),
        context: non_empty_str(map, "context").unwrap_or_default(),
        error: None,
    }
}

fn non_empty_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A list of strings; a lone string counts as a one-element list
fn list_field(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        Value::Array(items) => Some(string_list(items)),
        Value::String(s) if !s.trim().is_empty() => Some(vec![s.clone()]),
        _ => None,
    }
}

fn string_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_proceed_fills_defaults() {
        let map = extract_json_object("```json\n{\"verdict\": \"proceed\"}\n```").unwrap();
        let result = guard_result_from_map(&map);
        assert_eq!(result.verdict, Verdict::Proceed);
        assert_eq!(result.confidence, 0.5);
        assert!(result.issues.is_empty());
        assert_eq!(result.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_extract_from_surrounding_prose() {
        let reply = "Sure! Here is my evaluation:\n\
                     {\"verdict\": \"heal\", \"reason\": \"vague\"}\n\
                     Hope that helps.";
        let map = extract_json_object(reply).unwrap();
        assert_eq!(map["verdict"], "heal");

        let fenced_in_prose = "My answer:\n```json\n{\"verdict\": \"intervene\"}\n```\nThanks";
        let map = extract_json_object(fenced_in_prose).unwrap();
        assert_eq!(map["verdict"], "intervene");
    }

    #[test]
    fn test_extract_rejects_non_objects() {
        assert!(extract_json_object("I cannot evaluate this.").is_err());
        assert!(extract_json_object("[1, 2, 3]").is_err());
        assert!(extract_json_object("{not json}").is_err());
    }

    #[test]
    fn test_missing_verdict_defaults_to_intervene() {
        let result = guard_result_from_map(&obj(json!({"reason": "hmm", "verdict": 3})));
        assert_eq!(result.verdict, Verdict::Intervene);
        assert_eq!(result.reason, "hmm");
    }

    #[test]
    fn test_confidence_is_clamped_and_coerced() {
        assert_eq!(guard_result_from_map(&obj(json!({"confidence": 7}))).confidence, 1.0);
        assert_eq!(guard_result_from_map(&obj(json!({"confidence": -1.0}))).confidence, 0.0);
        assert_eq!(guard_result_from_map(&obj(json!({"confidence": "0.8"}))).confidence, 0.8);
        assert_eq!(guard_result_from_map(&obj(json!({"confidence": null}))).confidence, 0.5);
    }

    #[test]
    fn test_issues_and_suggestions_shapes() {
        let result = guard_result_from_map(&obj(json!({
            "verdict": "intervene",
            "issues": ["vague", null, "", "missing_context"],
            "suggestions": ["name the file", "describe the bug"]
        })));
        assert_eq!(result.issues, vec!["vague", "missing_context"]);
        assert_eq!(result.suggestions.as_deref(), Some("name the file; describe the bug"));

        let single = guard_result_from_map(&obj(json!({"issues": "tone", "suggestions": "  "})));
        assert_eq!(single.issues, vec!["tone"]);
        assert!(single.suggestions.is_none());
    }

    #[test]
    fn test_heal_defaults_to_original() {
        let result = heal_result_from_map(&obj(json!({})), "fix it", HealMode::Clarity);
        assert_eq!(result.healed_prompt, "fix it");
        assert!(result.changes_made.is_empty());
    }

    #[test]
    fn test_heal_accepts_tone_changes() {
        let result = heal_result_from_map(
            &obj(json!({
                "healed_prompt": "Please fix the failing login test",
                "tone_changes": ["removed hostility"]
            })),
            "fix this stupid test",
            HealMode::Anger,
        );
        assert_eq!(result.healed_prompt, "Please fix the failing login test");
        assert_eq!(result.changes_made, vec!["removed hostility"]);
        assert_eq!(result.mode, HealMode::Anger);
    }

    #[test]
    fn test_suggestions_shapes() {
        let result = suggestions_from_map(&obj(json!({
            "suggestions": [
                {
                    "prompt": "Add a submit button to the contact form",
                    "improvements": "names the form"
                },
                "Add a blue submit button",
                {"improvements": "no prompt"}
            ]
        })));
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.suggestions[1].improvements, "");
        assert!(suggestions_from_map(&obj(json!({}))).suggestions.is_empty());
    }

    #[test]
    fn test_discuss_defaults() {
        let result = discuss_from_map(&obj(json!({"questions": ["Which file?"]})));
        assert_eq!(result.questions, vec!["Which file?"]);
        assert_eq!(result.context, "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
