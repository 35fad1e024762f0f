//! Configuration loading for Triagedesk.
//! Reads triagedesk.toml from the current directory or the path in the
//! TRIAGEDESK_CONFIG env var. Every field has a default; a missing file is
//! not an error.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use triagedesk_engine::{EscalationPolicy, VitalThresholds};
use triagedesk_llm::UnknownTierPolicy;

pub const CONFIG_ENV: &str = "TRIAGEDESK_CONFIG";
pub const API_KEY_ENV: &str = "TRIAGEDESK_LLM_API_KEY";

/// One week. Longer limits are almost certainly a unit mistake.
pub const MAX_ESCALATION_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    /// Vital-sign cut-offs for the local rule engine.
    #[serde(default)]
    pub rules: VitalThresholds,
}

// ── [server] ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

// ── [classifier] ─────────────────────────────────────────────────────────────

/// Where triage verdicts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Rule engine only.
    #[default]
    Local,
    /// External classification service over HTTP.
    Remote,
    /// The configured LLM backend, in-process.
    Llm,
}

impl ClassifierMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierMode::Local  => "local",
            ClassifierMode::Remote => "remote",
            ClassifierMode::Llm    => "llm",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub mode: ClassifierMode,
    #[serde(default = "default_classifier_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub unknown_tier: UnknownTierPolicy,
}

fn default_classifier_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_timeout_secs()   -> u64    { 10 }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::default(),
            base_url: default_classifier_url(),
            timeout_secs: default_timeout_secs(),
            unknown_tier: UnknownTierPolicy::default(),
        }
    }
}

// ── [llm] ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackendKind {
    /// No backend; POST /triage answers 503.
    #[default]
    None,
    Yandexgpt,
    OpenaiCompatible,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: LlmBackendKind,
    /// Endpoint for `openai_compatible`; ignored by `yandexgpt`.
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// Yandex Cloud folder; required by `yandexgpt`.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Model name, or a full `gpt://` URI for `yandexgpt`.
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request limit on the backend's HTTP client.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_url()     -> String { "http://localhost:11434".to_string() }
fn default_llm_model()   -> String { "yandexgpt-lite/latest".to_string() }
fn default_temperature() -> f32    { 0.2 }
fn default_max_tokens()  -> u32    { 800 }
fn default_llm_timeout_secs() -> u64 { 60 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackendKind::default(),
            base_url: default_llm_url(),
            api_key: None,
            folder_id: None,
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Model URI for Yandex: `model` as is when already a URI, otherwise
    /// `gpt://<folder>/<model>`.
    pub fn yandex_model_uri(&self) -> Option<String> {
        if self.model.starts_with("gpt://") {
            return Some(self.model.clone());
        }
        self.folder_id
            .as_deref()
            .map(|folder| format!("gpt://{}/{}", folder, self.model))
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

// ── [queue] ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_critical_minutes")]
    pub critical_escalation_minutes: i64,
    #[serde(default = "default_urgent_minutes")]
    pub urgent_escalation_minutes: i64,
    /// Upper bound on the escalation ticker's sleep.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Broadcast buffer for queue events; slow SSE clients skip ahead.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_critical_minutes() -> i64   { 10 }
fn default_urgent_minutes()   -> i64   { 30 }
fn default_refresh_secs()     -> u64   { 60 }
fn default_event_capacity()   -> usize { 256 }

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            critical_escalation_minutes: default_critical_minutes(),
            urgent_escalation_minutes: default_urgent_minutes(),
            refresh_secs: default_refresh_secs(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl QueueConfig {
    pub fn escalation_policy(&self) -> EscalationPolicy {
        EscalationPolicy {
            critical_minutes: self.critical_escalation_minutes,
            urgent_minutes: self.urgent_escalation_minutes,
        }
    }
}


impl Config {
    /// Load configuration from triagedesk.toml.
    /// Checks TRIAGEDESK_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| "triagedesk.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)?
        } else {
            tracing::info!(path = %path, "no config file, using defaults");
            Self::default()
        };

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.is_empty())
                .map(SecretString::from);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let q = &self.queue;
        for minutes in [q.critical_escalation_minutes, q.urgent_escalation_minutes] {
            if !(1..=MAX_ESCALATION_MINUTES).contains(&minutes) {
                anyhow::bail!(
                    "queue escalation minutes must be between 1 and {MAX_ESCALATION_MINUTES}, got {minutes}"
                );
            }
        }
        if q.refresh_secs == 0 || q.event_capacity == 0 {
            anyhow::bail!("queue.refresh_secs and queue.event_capacity must be non-zero");
        }
        if self.classifier.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            anyhow::bail!("classifier.timeout_secs and llm.timeout_secs must be non-zero");
        }
        if !self.rules.validate() {
            anyhow::bail!("rules: spo2_red must not exceed spo2_urgent, nor fever_comorbid fever_urgent");
        }
        Ok(())
    }
}
