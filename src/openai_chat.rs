// openai_chat.rs
use crate::config::OpenAiConfig;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Shown and stored when the completion carries no content.
pub const NO_ANSWER: &str = "Žádná odpověď.";

lazy_static! {
    static ref TOKENIZER: Option<CoreBPE> = cl100k_base().ok();
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Sends `user_input` as the only user message and returns the raw response body.
    async fn complete(&self, user_input: &str) -> Result<Value>;
}

#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl ChatCompletionRequest {
    pub fn new(model: &str, user_input: &str) -> Self {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user_input.to_string(),
            }],
        }
    }
}

/// Pulls `choices[0].message.content` out of a completion, falling back to
/// [`NO_ANSWER`] when it is missing or empty.
pub fn extract_reply(response: &Value) -> String {
    response["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .filter(|content| !content.is_empty())
        .unwrap_or(NO_ANSWER)
        .to_string()
}

pub fn count_tokens(messages: &[Message]) -> Option<usize> {
    let tokenizer = TOKENIZER.as_ref()?;
    let mut num_tokens = 0;
    for message in messages {
        num_tokens += 3; // tokensPerMessage
        num_tokens += tokenizer.encode_with_special_tokens(&message.content).len();
    }
    Some(num_tokens + 3) // reply priming
}

fn log_usage(response: &Value) {
    if let Some(usage) = response["usage"].as_object() {
        let prompt_tokens = usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0);
        let completion_tokens = usage.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0);
        let total_tokens = usage.get("total_tokens").and_then(Value::as_u64).unwrap_or(0);
        info!(
            "Token usage - Prompt tokens: {}, Completion tokens: {}, Total tokens: {}",
            prompt_tokens, completion_tokens, total_tokens
        );
    }
}

/// Turns a non-2xx body into an error, preferring the `{error: {message}}` text
/// OpenAI sends along.
pub(crate) fn upstream_error(endpoint: &str, status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    error!("{} API error ({}): {}", endpoint, status, message);
    anyhow!("{} API returned {}: {}", endpoint, status, message)
}

pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(client: Client, config: &OpenAiConfig) -> Self {
        OpenAiChatClient {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.chat_model.clone(),
        }
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, user_input: &str) -> Result<Value> {
        let request = ChatCompletionRequest::new(&self.model, user_input);
        if let Some(tokens) = count_tokens(&request.messages) {
            debug!("Estimated prompt tokens: {}", tokens);
        }
        debug!("Sending chat completion request: {:?}", request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read chat completion response")?;
        debug!("Chat completion response body: {}", body);

        if !status.is_success() {
            return Err(upstream_error("Chat completion", status, &body));
        }

        let json: Value =
            serde_json::from_str(&body).context("Chat completion response is not valid JSON")?;
        log_usage(&json);
        Ok(json)
    }
}
