//! Completion API client.
//!
//! Every language-model call in SeoScribe goes through [`CompletionClient`],
//! which speaks the OpenAI-compatible `/chat/completions` protocol (OpenRouter
//! by default). The client is built once per process from [`LlmConfig`] and
//! is immutable afterwards; stages receive it by reference.

use std::fmt;
use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use seoscribe_shared::{LlmConfig, Result, SeoScribeError};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("SeoScribe/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One completion request: a system message, a user message, and sampling limits.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generated text plus accounting returned by the provider.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completions client holding the model, endpoint and credential.
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    settings: LlmConfig,
}

impl fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CompletionClient {
    /// Build a client with an explicit API key.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SeoScribeError::Completion(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            settings: config.clone(),
        })
    }

    /// Build a client reading the key from the env var named in the config.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let var_name = &config.api_key_env;
        let api_key = match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => val,
            _ => {
                return Err(SeoScribeError::config(format!(
                    "completion API key not found. Set the {var_name} environment variable."
                )));
            }
        };
        Self::new(config, api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sampling and context limits the stages build their requests from.
    pub fn settings(&self) -> &LlmConfig {
        &self.settings
    }

    /// Issue one completion request. No retry: any fault is returned to the caller.
    #[instrument(skip_all, fields(model = %self.model, max_tokens = request.max_tokens))]
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let started = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SeoScribeError::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(SeoScribeError::Completion(format!(
                "status {}: {message}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SeoScribeError::Completion(format!("invalid response body: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SeoScribeError::Completion("response contained no content".into()))?;

        let usage = parsed.usage.unwrap_or(ChatUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        let completion = Completion {
            text: text.trim().to_string(),
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            tokens_in: usage.prompt_tokens,
            tokens_out: usage.completion_tokens,
            latency_ms: started.elapsed().as_millis() as u64,
        };

        debug!(
            tokens_in = completion.tokens_in,
            tokens_out = completion.tokens_out,
            latency_ms = completion.latency_ms,
            "completion received"
        );

        Ok(completion)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
