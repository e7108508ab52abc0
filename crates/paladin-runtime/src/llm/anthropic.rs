use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::provider::LLMProvider;
use super::types::*;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, request_timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: ProviderKind::Anthropic.default_model().to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Build Anthropic API request body from messages
    fn build_request_body(&self, messages: &[Message], config: &GenerateConfig) -> Value {
        let model = if config.model.is_empty() {
            &self.model
        } else {
            &config.model
        };

        let mut body = json!({
            "model": model,
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });

        if let Some(ref sys) = config.system_prompt {
            if !sys.is_empty() {
                body["system"] = json!(sys);
            }
        }

        // System messages travel in the top-level field, not the message list
        let api_messages: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                };
                json!({
                    "role": role,
                    "content": [{"type": "text", "text": m.content}],
                })
            })
            .collect();
        body["messages"] = json!(api_messages);

        body
    }

    /// Parse Anthropic API response into GenerateResponse
    fn parse_response(&self, body: &ApiResponse) -> Result<GenerateResponse> {
        let text = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(anyhow!("Anthropic response contained no text blocks"));
        }

        let stop_reason = match body.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };

        Ok(GenerateResponse {
            text,
            stop_reason,
            usage: Usage {
                input_tokens: body.usage.input_tokens,
                output_tokens: body.usage.output_tokens,
            },
            model: body.model.clone(),
        })
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn generate(
        &self,
        messages: &[Message],
        config: &GenerateConfig,
    ) -> Result<GenerateResponse> {
        let body = self.build_request_body(messages, config);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Anthropic API error ({}): {}",
                status,
                error_body
            ));
        }

        let api_response: ApiResponse = response.json().await?;
        self.parse_response(&api_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic API response structures
#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicClient {
        AnthropicClient::new("test-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_request_body() {
        let client = client();
        let messages = vec![Message::system("ignored"), Message::user("Hello")];
        let config = GenerateConfig {
            system_prompt: Some("You are a Prompt Paladin".into()),
            ..Default::default()
        };

        let body = client.build_request_body(&messages, &config);

        assert_eq!(body["system"], "You are a Prompt Paladin");
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Hello");
        assert_eq!(body["max_tokens"], 2048);
    }

    #[test]
    fn test_config_model_overrides_client_model() {
        let client = client().with_model("claude-3-5-haiku-20241022");
        let config = GenerateConfig {
            model: "claude-sonnet-4-20250514".into(),
            ..Default::default()
        };
        let body = client.build_request_body(&[Message::user("hi")], &config);
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_response_text() {
        let client = client();
        let api_resp: ApiResponse = serde_json::from_value(json!({
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "{\"verdict\":"},
                {"type": "text", "text": " \"proceed\"}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();

        let resp = client.parse_response(&api_resp).unwrap();
        assert_eq!(resp.text, "{\"verdict\": \"proceed\"}");
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.total(), 15);
    }

    #[test]
    fn test_parse_response_without_text_fails() {
        let client = client();
        let api_resp: ApiResponse = serde_json::from_value(json!({
            "model": "claude-3-5-sonnet-20241022",
            "content": [],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 10, "output_tokens": 0}
        }))
        .unwrap();

        assert!(client.parse_response(&api_resp).is_err());
    }
}
