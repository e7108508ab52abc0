pub mod anthropic;
pub mod openai;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicClient;
pub use openai::OpenAIClient;
pub use provider::{LLMProvider, UnavailableProvider};
pub use types::{
    GenerateConfig, GenerateResponse, Message, ProviderKind, Role, StopReason, Usage,
};

use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;

/// Build a vendor client for `kind`. An empty `model` keeps the vendor default.
pub fn build_provider(
    kind: ProviderKind,
    api_key: Option<&str>,
    model: &str,
    request_timeout: Duration,
) -> Result<Arc<dyn LLMProvider>> {
    let api_key = api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "No API key configured for provider '{}' ({})",
                kind,
                kind.api_key_var()
            )
        })?;

    let provider: Arc<dyn LLMProvider> = match kind {
        ProviderKind::Anthropic => {
            let client = AnthropicClient::new(api_key, request_timeout)?;
            Arc::new(if model.is_empty() { client } else { client.with_model(model) })
        }
        ProviderKind::OpenAI => {
            let client = OpenAIClient::new(api_key, request_timeout)?;
            Arc::new(if model.is_empty() { client } else { client.with_model(model) })
        }
        ProviderKind::Groq => {
            let client = OpenAIClient::groq(api_key, request_timeout)?;
            Arc::new(if model.is_empty() { client } else { client.with_model(model) })
        }
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_provider_requires_key() {
        let err = build_provider(ProviderKind::Groq, None, "", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        let timeout = Duration::from_secs(1);
        assert!(build_provider(ProviderKind::OpenAI, Some(""), "", timeout).is_err());
    }

    #[test]
    fn test_build_provider_model_selection() {
        let timeout = Duration::from_secs(1);
        let p = build_provider(ProviderKind::Anthropic, Some("k"), "", timeout).unwrap();
        assert_eq!(p.model_name(), "claude-3-5-sonnet-20241022");

        let p = build_provider(ProviderKind::OpenAI, Some("k"), "gpt-4o", timeout).unwrap();
        assert_eq!(p.model_name(), "gpt-4o");
    }
}
