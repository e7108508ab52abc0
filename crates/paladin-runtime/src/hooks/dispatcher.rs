use tracing::{debug, info, warn};

use super::events::{HookEvent, HookResponse};
use crate::config::HookConfig;
use crate::judge::{GuardResult, HealMode, HealResult, Judge, PromptContext, Verdict};

pub const EMPTY_PROMPT_MESSAGE: &str = "⚠️ Empty prompt - please provide instructions";
pub const AUTO_HEAL_TIP: &str = "Tip: Enable AUTO_CAST_HEAL for automatic fixes";

/// Maps one guard verdict to the host response.
///
/// | verdict   | auto heal | response                                |
/// |-----------|-----------|-----------------------------------------|
/// | proceed   | -         | continue, original prompt               |
/// | intervene | -         | block with reason and suggestions       |
/// | heal      | on        | continue with the healed prompt         |
/// | heal      | off       | block with reason and an auto heal tip  |
/// | other     | -         | continue, original prompt               |
pub struct VerdictDispatcher {
    judge: Judge,
    config: HookConfig,
}

impl VerdictDispatcher {
    pub fn new(judge: Judge, config: HookConfig) -> Self {
        Self { judge, config }
    }

    /// Decide what happens to one prompt. Never fails: judge problems have
    /// already been turned into a fail-open verdict by [`Judge`].
    pub async fn handle(&self, event: &HookEvent) -> HookResponse {
        let prompt = event.prompt.as_str();
        if prompt.trim().is_empty() {
            info!("Empty prompt rejected");
            return HookResponse::block(EMPTY_PROMPT_MESSAGE);
        }

        let guard = self.judge.evaluate(prompt, &event.context).await;
        self.dispatch(prompt, &event.context, guard).await
    }

    async fn dispatch(
        &self,
        prompt: &str,
        ctx: &PromptContext,
        guard: GuardResult,
    ) -> HookResponse {
        match &guard.verdict {
            Verdict::Proceed => {
                debug!(confidence = guard.confidence, "Prompt approved");
                HookResponse::allow(prompt)
            }
            Verdict::Intervene => {
                info!(reason = %guard.reason, "Prompt blocked");
                HookResponse::block(with_suggestions(
                    format!("🛑 Prompt needs improvement: {}", guard.reason),
                    &guard,
                ))
            }
            Verdict::Heal if self.config.auto_cast_heal => {
                let healed = self.judge.heal(prompt, HealMode::Auto, ctx).await;
                heal_response(prompt, healed)
            }
            Verdict::Heal => {
                info!(reason = %guard.reason, "Heal suggested but auto heal disabled");
                let message = with_suggestions(
                    format!("💡 Prompt could be improved: {}", guard.reason),
                    &guard,
                );
                HookResponse::block(format!("{}\n\n{}", message, AUTO_HEAL_TIP))
            }
            Verdict::Unknown(raw) => {
                warn!(verdict = %raw, "Unknown verdict, allowing prompt");
                HookResponse::allow(prompt)
            }
        }
    }
}

fn with_suggestions(message: String, guard: &GuardResult) -> String {
    match &guard.suggestions {
        Some(suggestions) => format!("{}\n\nSuggestion: {}", message, suggestions),
        None => message,
    }
}

fn heal_response(original: &str, healed: HealResult) -> HookResponse {
    if let Some(error) = &healed.error {
        warn!(error = %error, "Auto heal failed, sending original prompt");
        return HookResponse::allow_with_message(
            original,
            "🩹 Automatic heal unavailable, sending your original prompt",
        );
    }

    let text = if healed.healed_prompt.trim().is_empty() {
        original.to_string()
    } else {
        healed.healed_prompt
    };

    let mut notice = match healed.mode {
        HealMode::Anger => "🩹 Prompt auto-healed: tone translated".to_string(),
        _ => "🩹 Prompt auto-healed for clarity".to_string(),
    };
    for change in &healed.changes_made {
        notice.push_str("\n- ");
        notice.push_str(change);
    }

    info!(mode = healed.mode.as_str(), changes = healed.changes_made.len(), "Prompt auto-healed");
    HookResponse::allow_with_message(text, notice)
}
