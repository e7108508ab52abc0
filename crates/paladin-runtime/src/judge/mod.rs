pub mod context;
pub mod extract;
pub mod prompts;
pub mod types;

pub use context::{History, PromptContext};
pub use types::{
    DiscussResult, GuardResult, HealMode, HealResult, ProceedAck, Suggestion, SuggestionsResult,
    Verdict,
};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{JudgeTool, Settings};
use crate::llm::{build_provider, GenerateConfig, LLMProvider, Message, UnavailableProvider};
use prompts::RequestFrame;

/// Words that mark a prompt as hostile for auto heal (case-insensitive substring match)
pub const NEGATIVE_WORDS: &[&str] = &[
    "stupid", "dumb", "idiotic", "garbage", "trash", "terrible", "horrible", "awful", "broken",
    "useless", "crap", "sucks", "hate", "ridiculous", "insane", "moronic",
];

/// Quick heuristic for negative tone
pub fn has_negative_tone(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    NEGATIVE_WORDS.iter().any(|word| lower.contains(word))
}

/// Knobs shared by every judge call
#[derive(Debug, Clone)]
pub struct JudgeOptions {
    /// Upper bound for one call, response parsing included
    pub call_timeout: Duration,
    pub max_tokens: u32,
    /// Allow auto heal to choose the tone-translation template
    pub anger_translator: bool,
}

impl Default for JudgeOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(12),
            max_tokens: 2048,
            anger_translator: true,
        }
    }
}

impl JudgeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            call_timeout: settings.hook.call_timeout(),
            max_tokens: settings.llm.max_tokens,
            anger_translator: settings.hook.anger_translator,
        }
    }
}

/// Front end to the external judge. Every public operation is total: failures
/// come back as result structs carrying an `error`, never as `Err`.
pub struct Judge {
    guard: Arc<dyn LLMProvider>,
    heal: Arc<dyn LLMProvider>,
    suggestions: Arc<dyn LLMProvider>,
    discuss: Arc<dyn LLMProvider>,
    options: JudgeOptions,
}

impl Judge {
    /// Use one provider for every operation
    pub fn new(provider: Arc<dyn LLMProvider>, options: JudgeOptions) -> Self {
        Self {
            guard: provider.clone(),
            heal: provider.clone(),
            suggestions: provider.clone(),
            discuss: provider,
            options,
        }
    }

    /// Route one operation to its own provider
    pub fn with_tool_provider(
        mut self,
        tool: JudgeTool,
        provider: Arc<dyn LLMProvider>,
    ) -> Self {
        *self.slot_mut(tool) = provider;
        self
    }

    /// Build per-tool providers from settings. A tool whose provider cannot
    /// be built (no key, unknown vendor) gets an [`UnavailableProvider`], so
    /// its calls take the normal failure path.
    pub fn from_settings(settings: &Settings) -> Self {
        let options = JudgeOptions::from_settings(settings);
        let call_timeout = options.call_timeout;
        let build = |tool: JudgeTool| -> Arc<dyn LLMProvider> {
            let built = settings
                .llm
                .resolve(tool, &settings.api_keys)
                .and_then(|(kind, model)| {
                    build_provider(kind, settings.api_keys.get(kind), &model, call_timeout)
                });
            match built {
                Ok(provider) => {
                    debug!(
                        tool = tool.as_str(),
                        model = provider.model_name(),
                        "Judge provider ready"
                    );
                    provider
                }
                Err(e) => {
                    warn!(tool = tool.as_str(), error = %e, "Judge provider unavailable");
                    Arc::new(UnavailableProvider::new(e.to_string()))
                }
            }
        };

        Self {
            guard: build(JudgeTool::Guard),
            heal: build(JudgeTool::Heal),
            suggestions: build(JudgeTool::Suggestions),
            discuss: build(JudgeTool::Discuss),
            options,
        }
    }

    fn slot(&self, tool: JudgeTool) -> &Arc<dyn LLMProvider> {
        match tool {
            JudgeTool::Guard => &self.guard,
            JudgeTool::Heal => &self.heal,
            JudgeTool::Suggestions => &self.suggestions,
            JudgeTool::Discuss => &self.discuss,
        }
    }

    fn slot_mut(&mut self, tool: JudgeTool) -> &mut Arc<dyn LLMProvider> {
        match tool {
            JudgeTool::Guard => &mut self.guard,
            JudgeTool::Heal => &mut self.heal,
            JudgeTool::Suggestions => &mut self.suggestions,
            JudgeTool::Discuss => &mut self.discuss,
        }
    }

    /// Evaluate prompt quality.
    ///
    /// Invocation failure (transport, vendor, timeout, unparseable reply)
    /// fails open to `proceed` with confidence 0.0. A reply that parses but
    /// lacks fields is filled with defaults, verdict `intervene` included.
    pub async fn evaluate(&self, prompt: &str, ctx: &PromptContext) -> GuardResult {
        debug!(prompt = %extract::truncate(prompt, 100), "Evaluating prompt");

        match self
            .ask(JudgeTool::Guard, prompts::GUARD_SYSTEM, &prompts::GUARD_FRAME, prompt, ctx)
            .await
        {
            Ok(map) => {
                let result = extract::guard_result_from_map(&map);
                info!(
                    verdict = %result.verdict,
                    confidence = result.confidence,
                    issues = ?result.issues,
                    "Guard verdict"
                );
                debug!(reason = %result.reason, "Guard reason");
                result
            }
            Err(e) => {
                warn!(error = %e, "Guard evaluation failed, failing open");
                GuardResult {
                    verdict: Verdict::Proceed,
                    reason: format!("Error during evaluation: {}", e),
                    confidence: 0.0,
                    issues: vec!["evaluation_error".to_string()],
                    suggestions: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Pick the concrete template: `auto` becomes `anger` only when the
    /// anger translator is enabled and the prompt reads as hostile.
    pub fn resolve_heal_mode(&self, prompt: &str, mode: HealMode) -> HealMode {
        match mode {
            HealMode::Auto if self.options.anger_translator && has_negative_tone(prompt) => {
                HealMode::Anger
            }
            HealMode::Auto => HealMode::Clarity,
            other => other,
        }
    }

    /// Rewrite a prompt. Any failure returns the original text untouched.
    pub async fn heal(&self, prompt: &str, mode: HealMode, ctx: &PromptContext) -> HealResult {
        let resolved = self.resolve_heal_mode(prompt, mode);
        let system = match resolved {
            HealMode::Anger => prompts::HEAL_ANGER_SYSTEM,
            _ => prompts::HEAL_CLARITY_SYSTEM,
        };
        debug!(requested = mode.as_str(), mode = resolved.as_str(), "Healing prompt");

        match self
            .ask(JudgeTool::Heal, system, &prompts::HEAL_FRAME, prompt, ctx)
            .await
        {
            Ok(map) => {
                let result = extract::heal_result_from_map(&map, prompt, resolved);
                info!(
                    mode = resolved.as_str(),
                    changes = result.changes_made.len(),
                    "Heal completed"
                );
                debug!(healed = %extract::truncate(&result.healed_prompt, 100), "Healed prompt");
                result
            }
            Err(e) => {
                warn!(error = %e, mode = resolved.as_str(), "Heal failed, keeping original prompt");
                HealResult {
                    healed_prompt: prompt.to_string(),
                    changes_made: Vec::new(),
                    mode: resolved,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Generate 2-3 improved alternatives. On failure the original prompt is
    /// returned as the only suggestion.
    pub async fn suggestions(&self, prompt: &str, ctx: &PromptContext) -> SuggestionsResult {
        match self
            .ask(
                JudgeTool::Suggestions,
                prompts::SUGGESTIONS_SYSTEM,
                &prompts::SUGGESTIONS_FRAME,
                prompt,
                ctx,
            )
            .await
        {
            Ok(map) => extract::suggestions_from_map(&map),
            Err(e) => {
                warn!(error = %e, "Suggestions failed");
                SuggestionsResult {
                    suggestions: vec![Suggestion {
                        prompt: prompt.to_string(),
                        improvements: "Error generating suggestions".to_string(),
                    }],
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Generate clarifying questions. On failure a fixed set of generic
    /// questions is returned.
    pub async fn discuss(&self, prompt: &str, ctx: &PromptContext) -> DiscussResult {
        match self
            .ask(JudgeTool::Discuss, prompts::DISCUSS_SYSTEM, &prompts::DISCUSS_FRAME, prompt, ctx)
            .await
        {
            Ok(map) => extract::discuss_from_map(&map),
            Err(e) => {
                warn!(error = %e, "Discuss failed, using fallback questions");
                DiscussResult {
                    questions: vec![
                        "What specific changes would you like to make?".to_string(),
                        "Which files or components need to be modified?".to_string(),
                        "What is the expected behavior or outcome?".to_string(),
                    ],
                    context: "Error generating questions - using fallback questions".to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// User override: keep the original prompt. No external call.
    pub fn proceed(prompt: &str) -> ProceedAck {
        ProceedAck {
            verdict: Verdict::Proceed,
            note: "User chose to proceed with original prompt".to_string(),
            prompt: prompt.to_string(),
        }
    }

    /// One judge round trip under the per-call timeout
    async fn ask(
        &self,
        tool: JudgeTool,
        system: &str,
        frame: &RequestFrame,
        prompt: &str,
        ctx: &PromptContext,
    ) -> Result<Map<String, Value>> {
        let provider = self.slot(tool);
        let messages = [Message::user(&prompts::format_request(frame, prompt, ctx))];
        let config = GenerateConfig {
            max_tokens: self.options.max_tokens,
            system_prompt: Some(system.to_string()),
            ..Default::default()
        };
        let timeout = self.options.call_timeout;

        let response = tokio::time::timeout(timeout, provider.generate(&messages, &config))
            .await
            .map_err(|_| {
                anyhow!(
                    "{} call timeout after {:.1}s",
                    tool.as_str(),
                    timeout.as_secs_f64()
                )
            })??;

        debug!(
            tool = tool.as_str(),
            model = %response.model,
            tokens = response.usage.total(),
            "Judge replied"
        );
        extract::extract_json_object(&response.text)
    }
}
