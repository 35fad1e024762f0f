//! Classification services: the remote HTTP endpoint and the in-process
//! LLM-backed equivalent. Both answer with the same reply shape.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::backend::{LlmBackend, LlmError};
use crate::prompt::{extract_json, triage_request};
use crate::wire::{ClassifyRequest, ClassifyResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("unknown priority label: {0:?}")]
    UnknownTier(String),
    #[error("LLM backend failed: {0}")]
    Llm(#[from] LlmError),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

impl ClassifyError {
    /// Short machine-readable failure kind for logs and audit entries.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::Transport(_)   => "transport",
            ClassifyError::Status { .. }  => "status",
            ClassifyError::Malformed(_)   => "malformed",
            ClassifyError::UnknownTier(_) => "unknown_tier",
            ClassifyError::Llm(_)         => "llm",
            ClassifyError::Timeout(_)     => "timeout",
        }
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn classify(&self, req: &ClassifyRequest) -> Result<ClassifyResponse, ClassifyError>;
    /// Name recorded in audit entries.
    fn name(&self) -> &str;
}

// ── 1. Remote HTTP service ────────────────────────────────────────────────────

pub struct HttpClassificationService {
    pub base_url: String,
    client: reqwest::Client,
}

impl HttpClassificationService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url: base_url.into(), client })
    }

    fn endpoint(&self) -> String {
        format!("{}/triage", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ClassificationService for HttpClassificationService {
    async fn classify(&self, req: &ClassifyRequest) -> Result<ClassifyResponse, ClassifyError> {
        let resp = self.client.post(self.endpoint()).json(req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClassifyError::Status { status: status.as_u16(), body });
        }
        serde_json::from_str(&body).map_err(|e| ClassifyError::Malformed(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

// ── 2. In-process LLM service ─────────────────────────────────────────────────

pub struct LlmClassificationService {
    backend: Arc<dyn LlmBackend>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one completion, whatever the backend's own client does.
    pub timeout: Duration,
}

impl LlmClassificationService {
    pub fn new(backend: Arc<dyn LlmBackend>, temperature: f32, max_tokens: u32) -> Self {
        Self { backend, temperature, max_tokens, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ClassificationService for LlmClassificationService {
    async fn classify(&self, req: &ClassifyRequest) -> Result<ClassifyResponse, ClassifyError> {
        let llm_req = triage_request(req, self.temperature, self.max_tokens);
        let reply = tokio::time::timeout(self.timeout, self.backend.complete(llm_req))
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))??;
        debug!(
            model = %reply.model,
            prompt_tokens = reply.prompt_tokens,
            completion_tokens = reply.completion_tokens,
            "triage completion received"
        );
        let value = extract_json(&reply.content)?;
        serde_json::from_value(value).map_err(|e| ClassifyError::Malformed(e.to_string()))
    }

    fn name(&self) -> &str {
        self.backend.name()
    }
}
