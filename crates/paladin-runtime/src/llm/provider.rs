use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::types::{GenerateConfig, GenerateResponse, Message};

/// LLM provider trait - abstraction over Anthropic, OpenAI, Groq
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a response from the LLM (non-streaming)
    async fn generate(
        &self,
        messages: &[Message],
        config: &GenerateConfig,
    ) -> Result<GenerateResponse>;

    /// Provider model name for logging/tracking
    fn model_name(&self) -> &str;
}

/// Stand-in used when no real provider could be built (missing key, unknown
/// vendor). Every call fails with the original reason, so callers take their
/// normal failure path.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LLMProvider for UnavailableProvider {
    async fn generate(
        &self,
        _messages: &[Message],
        _config: &GenerateConfig,
    ) -> Result<GenerateResponse> {
        Err(anyhow!("Provider unavailable: {}", self.reason))
    }

    fn model_name(&self) -> &str {
        "unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_provider_always_fails() {
        let provider = UnavailableProvider::new("ANTHROPIC_API_KEY not set");
        let err = provider
            .generate(&[Message::user("hi")], &GenerateConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        assert_eq!(provider.model_name(), "unavailable");
    }
}
