//! Raw prompt proxy to the configured LLM backend.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use triagedesk_llm::backend::{LlmRequest, Message};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// Full conversation; when present, `system` and `user` are ignored.
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Model name or, for YandexGPT, a full `gpt://` URI.
    #[serde(alias = "model_uri")]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    #[serde(alias = "content")]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PromptReply {
    pub text: String,
    pub usage: PromptUsage,
    #[serde(rename = "modelVersion")]
    pub model_version: String,
}

#[derive(Debug, Serialize)]
pub struct PromptUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl PromptRequest {
    fn into_messages(self) -> Result<Vec<Message>, ApiError> {
        if !self.messages.is_empty() {
            return Ok(self.messages
                .into_iter()
                .map(|m| Message { role: m.role, content: m.text })
                .collect());
        }
        let user = self.user.filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("either user or messages is required".to_string()))?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system.filter(|s| !s.trim().is_empty()) {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(user));
        Ok(messages)
    }
}

/// POST /llm/prompt
pub async fn prompt(
    State(state): State<SharedState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptReply>, ApiError> {
    let Json(req) = body?;
    let backend = state
        .llm
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("no LLM backend configured".to_string()))?;

    let model = req.model.clone();
    let temperature = req.temperature;
    let max_tokens = req.max_tokens;
    let messages = req.into_messages()?;

    let reply = backend
        .complete(LlmRequest { messages, model, max_tokens, temperature })
        .await?;

    Ok(Json(PromptReply {
        text: reply.content,
        usage: PromptUsage {
            prompt_tokens: reply.prompt_tokens,
            completion_tokens: reply.completion_tokens,
        },
        model_version: reply.model,
    }))
}
