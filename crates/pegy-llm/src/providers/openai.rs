//! OpenAI-compatible chat completions
//!
//! Works against api.openai.com as well as local servers exposing the same
//! `/chat/completions` route (LM Studio, llama.cpp, vLLM).
//!
//! ```no_run
//! use pegy_llm::{CompletionRequest, LLMProvider, Message};
//! use pegy_llm::providers::OpenAIProvider;
//!
//! # async fn run() -> pegy_llm::Result<()> {
//! let provider = OpenAIProvider::from_env()?;
//! let request = CompletionRequest::builder("gpt-4o-mini")
//!     .add_message(Message::user("Hello!"))
//!     .max_tokens(100)
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Bearer token
    pub api_key: String,

    /// Base URL, without the trailing `/chat/completions`
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `OPENAI_API_KEY` and, when set, `OPENAI_API_BASE`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LLMError::Configuration(
                "OPENAI_API_KEY not set in environment. Export your key and retry.".to_string(),
            )
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self::new(api_key).with_api_base(api_base))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Provider for OpenAI and compatible chat-completion APIs
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending chat completion request");

        let body = ChatRequest {
            model: request.model.clone(),
            messages: chat_messages(request.system.as_deref(), &request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(LLMError::from_status(status.as_u16(), &request.model, &error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        into_completion(chat)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// System prompt first, then the conversation
fn chat_messages<'a>(system: Option<&'a str>, messages: &'a [Message]) -> Vec<ChatMessage<'a>> {
    system
        .map(|content| ChatMessage {
            role: Role::System.as_str(),
            content,
        })
        .into_iter()
        .chain(messages.iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.content,
        }))
        .collect()
}

fn into_completion(chat: ChatResponse) -> Result<CompletionResponse> {
    let choice = chat
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::MalformedResponse("No choices in response".to_string()))?;

    let usage = chat.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });
    let finish_reason = choice.finish_reason.unwrap_or_default();

    debug!(
        "Received response - finish_reason: {}, tokens: {}/{}",
        finish_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        stop_reason: map_stop_reason(&finish_reason),
        usage,
    })
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        "stop" => StopReason::EndTurn,
        other => {
            debug!("Unknown finish reason: {}", other);
            StopReason::EndTurn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
        assert_eq!(provider.config().timeout_secs, 30);
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = OpenAIProvider::new("  ");
        assert!(matches!(result, Err(LLMError::Configuration(_))));
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let config = OpenAIConfig::new("k").with_api_base("http://localhost:1234/v1/");
        assert_eq!(config.api_base, "http://localhost:1234/v1");
    }

    #[test]
    fn test_system_prompt_goes_first() {
        let messages = vec![Message::user("Summarize AAPL")];
        let chat = chat_messages(Some("You are a concise analyst."), &messages);

        assert_eq!(chat.len(), 2);
        assert_eq!(chat[0].role, "system");
        assert_eq!(chat[0].content, "You are a concise analyst.");
        assert_eq!(chat[1].role, "user");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::user("hi")];
        let body = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: chat_messages(None, &messages),
            max_tokens: 400,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 400);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": " {\"Overview\": \"x\"} "}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 50, "completion_tokens": 20}
        }"#;
        let chat: ChatResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(chat).unwrap();

        assert_eq!(completion.message.text(), r#"{"Overview": "x"}"#);
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.total(), 70);
    }

    #[test]
    fn test_response_without_choices() {
        let chat: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(into_completion(chat), Err(LLMError::MalformedResponse(_))));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("content_filter"), StopReason::ContentFilter);
        assert_eq!(map_stop_reason(""), StopReason::EndTurn);
    }

    #[test]
    #[ignore] // Requires OPENAI_API_KEY and network access
    fn test_live_completion() {
        let provider = OpenAIProvider::from_env().unwrap();
        let request = CompletionRequest::builder("gpt-4o-mini")
            .add_message(Message::user("Reply with the single word: ok"))
            .max_tokens(5)
            .build();

        let response = tokio_test::block_on(provider.complete(request));
        let response = tokio_test::assert_ok!(response);
        assert!(!response.message.text().is_empty());
    }
}
