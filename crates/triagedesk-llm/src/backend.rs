//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   YandexGptBackend       : Yandex Cloud foundation models (completion API)
//!   OpenAiCompatibleBackend: any OpenAI-compatible endpoint (Ollama, LMStudio,
//!                             vLLM, OpenRouter, …)

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Reply contains no JSON object: {0}")]
    UnparsableReply(String),
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    /// Short backend name for logs and audit entries.
    fn name(&self) -> &'static str;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .map(str::to_string)
            .unwrap_or(text);
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Client whose requests give up after `timeout`, connect included.
fn client_with_timeout(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

// ── 1. YandexGPT ──────────────────────────────────────────────────────────────

pub const YANDEX_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

pub struct YandexGptBackend {
    pub endpoint: String,
    /// Full model URI, e.g. `gpt://<folder>/yandexgpt/latest`.
    pub model_uri: String,
    folder_id: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl YandexGptBackend {
    pub fn new(api_key: SecretString, folder_id: impl Into<String>, model_uri: impl Into<String>) -> Self {
        Self {
            endpoint: YANDEX_COMPLETION_URL.to_string(),
            model_uri: model_uri.into(),
            folder_id: folder_id.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = client_with_timeout(timeout)?;
        Ok(self)
    }

    fn body(&self, req: &LlmRequest) -> serde_json::Value {
        // Yandex names the message body "text", not "content"
        let messages: Vec<serde_json::Value> = req.messages.iter()
            .map(|m| serde_json::json!({"role": m.role, "text": m.content}))
            .collect();
        serde_json::json!({
            "modelUri": req.model.as_deref().unwrap_or(&self.model_uri),
            "completionOptions": {
                "stream":      false,
                "temperature": req.temperature.unwrap_or(0.2),
                "maxTokens":   req.max_tokens.unwrap_or(800),
                "reasoningOptions": { "mode": "DISABLED" },
            },
            "messages": messages,
        })
    }
}

#[async_trait]
impl LlmBackend for YandexGptBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let resp = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key.expose_secret()))
            .header("x-folder-id", &self.folder_id)
            .header("Accept", "application/json")
            .json(&self.body(&req))
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let content = json["result"]["alternatives"][0]["message"]["text"]
            .as_str()
            .ok_or_else(|| LlmError::Unavailable("completion has no alternatives".to_string()))?
            .to_string();
        let usage = &json["result"]["usage"];
        // Yandex reports token counts as strings
        let count = |v: &serde_json::Value| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                .unwrap_or(0) as u32
        };

        Ok(LlmResponse {
            content,
            model: json["result"]["modelVersion"].as_str().unwrap_or(&self.model_uri).to_string(),
            prompt_tokens:     count(&usage["inputTextTokens"]),
            completion_tokens: count(&usage["completionTokens"]),
        })
    }

    fn model_id(&self) -> &str { &self.model_uri }
    fn name(&self) -> &'static str { "yandexgpt" }
}

// ── 2. OpenAI-Compatible (Ollama, LMStudio, vLLM, OpenRouter, …) ─────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = client_with_timeout(timeout)?;
        Ok(self)
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None    => req,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(800),
            "temperature": req.temperature.unwrap_or(0.2),
        });
        let resp = self.auth(self.client.post(&url)).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn name(&self) -> &'static str { "openai_compatible" }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
