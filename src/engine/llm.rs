//! Client for an Ollama-compatible chat endpoint

use crate::config::EngineConfig;
use crate::engine::{EngineError, TokenUsage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider prefix accepted in model identifiers (`ollama/<model>`)
const PROVIDER_PREFIX: &str = "ollama/";

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    format: &'a serde_json::Value,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

/// One model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// Sampling parameters for a single chat call
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampling {
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Chat client for a local LLM runtime
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl OllamaClient {
    /// Creates a client for the runtime described by `config`
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EngineError::Session(format!("Failed to build LLM client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
            api_token: config.api_token.clone(),
        })
    }

    /// Sends one non-streaming chat request constrained to `schema`
    pub(crate) async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        schema: &serde_json::Value,
        sampling: Sampling,
    ) -> Result<Completion, EngineError> {
        let body = ChatRequest {
            model: model_name(model),
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            format: schema,
            options: ChatOptions {
                temperature: sampling.temperature,
                num_predict: sampling.max_tokens,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout {
                    url: self.endpoint.clone(),
                }
            } else {
                EngineError::Http {
                    url: self.endpoint.clone(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Runtime {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            EngineError::MalformedOutput(format!("Invalid response format from LLM runtime: {}", e))
        })?;

        Ok(Completion {
            content: reply.message.content,
            usage: TokenUsage {
                requests: 1,
                prompt_tokens: reply.prompt_eval_count,
                completion_tokens: reply.eval_count,
            },
        })
    }
}

/// Strips the provider prefix from a model identifier
fn model_name(model: &str) -> &str {
    model.strip_prefix(PROVIDER_PREFIX).unwrap_or(model)
}
