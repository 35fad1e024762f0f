//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};
use triagedesk_common::{PatientId, Profile, Tier};
use triagedesk_engine::RuleEngine;
use triagedesk_llm::{
    ClassificationService, HttpClassificationService, LlmBackend, LlmClassificationService,
    OpenAiCompatibleBackend, RemoteClassifier, YandexGptBackend,
};

use crate::config::{ClassifierMode, Config, LlmBackendKind, LlmConfig};
use crate::desk::Desk;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    PatientAdded { id: PatientId, tier: Tier, profile: Profile },
    Retriaged { id: PatientId, tier: Tier },
    MarkedSeen { id: PatientId },
    ProfileChanged { id: PatientId, profile: Profile },
    /// Wait time crossed the tier's escalation threshold.
    Escalated { id: PatientId, tier: Tier, wait_minutes: i64 },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub desk: Arc<Desk>,
    /// Raw backend behind POST /llm/prompt; `None` when none is configured.
    pub llm: Option<Arc<dyn LlmBackend>>,
    /// Backs POST /triage; present whenever `llm` is.
    pub triage_service: Option<Arc<dyn ClassificationService>>,
    pub classifier_mode: ClassifierMode,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<QueueEvent>,
}

impl AppState {
    pub fn new(
        classifier: RemoteClassifier,
        classifier_mode: ClassifierMode,
        llm: Option<Arc<dyn LlmBackend>>,
        triage_service: Option<Arc<dyn ClassificationService>>,
        config: &Config,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.queue.event_capacity);
        let desk = Desk::new(classifier, config.queue.escalation_policy(), event_tx.clone());
        Self { desk: Arc::new(desk), llm, triage_service, classifier_mode, event_tx }
    }

    /// Wire backends and the classifier from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = build_llm_backend(&config.llm)?;
        let llm_service = |timeout: Duration, backend: &Arc<dyn LlmBackend>| {
            LlmClassificationService::new(backend.clone(), config.llm.temperature, config.llm.max_tokens)
                .with_timeout(timeout)
        };
        let triage_service: Option<Arc<dyn ClassificationService>> = llm.as_ref().map(|backend| {
            Arc::new(llm_service(Duration::from_secs(config.llm.timeout_secs), backend))
                as Arc<dyn ClassificationService>
        });

        let c = &config.classifier;
        let classify_timeout = Duration::from_secs(c.timeout_secs);
        let classifier = match c.mode {
            ClassifierMode::Local => RemoteClassifier::local(),
            ClassifierMode::Remote => {
                let svc = HttpClassificationService::new(&c.base_url, classify_timeout)?;
                info!(url = %c.base_url, "using remote classification service");
                RemoteClassifier::new(Arc::new(svc), c.unknown_tier)
            }
            ClassifierMode::Llm => {
                let backend = llm.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("classifier.mode = \"llm\" needs an [llm] backend")
                })?;
                // intake waits at most classifier.timeout_secs, not the backend's own limit
                RemoteClassifier::new(Arc::new(llm_service(classify_timeout, backend)), c.unknown_tier)
            }
        };
        let classifier = classifier.with_engine(RuleEngine::with_thresholds(config.rules.clone()));

        Ok(Self::new(classifier, c.mode, llm, triage_service, config))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }
}

pub type SharedState = Arc<AppState>;

fn build_llm_backend(llm: &LlmConfig) -> anyhow::Result<Option<Arc<dyn LlmBackend>>> {
    // SecretString is not Clone; re-wrap the exposed value
    let key = || llm.api_key.as_ref().map(|k| SecretString::from(k.expose_secret().to_string()));
    let timeout = Duration::from_secs(llm.timeout_secs);

    match llm.backend {
        LlmBackendKind::None => {
            warn!("No LLM backend configured; POST /triage will answer 503");
            Ok(None)
        }
        LlmBackendKind::Yandexgpt => {
            let api_key = key().ok_or_else(|| {
                anyhow::anyhow!("yandexgpt needs llm.api_key or TRIAGEDESK_LLM_API_KEY")
            })?;
            let folder = llm.folder_id.clone()
                .ok_or_else(|| anyhow::anyhow!("yandexgpt needs llm.folder_id"))?;
            let model_uri = llm.yandex_model_uri()
                .ok_or_else(|| anyhow::anyhow!("could not build a Yandex model URI"))?;
            info!(model = %model_uri, "YandexGPT backend ready");
            let backend = YandexGptBackend::new(api_key, folder, model_uri).with_timeout(timeout)?;
            Ok(Some(Arc::new(backend)))
        }
        LlmBackendKind::OpenaiCompatible => {
            info!(url = %llm.base_url, model = %llm.model, "OpenAI-compatible backend ready");
            let backend = OpenAiCompatibleBackend::new(&llm.base_url, &llm.model, key())
                .with_timeout(timeout)?;
            Ok(Some(Arc::new(backend)))
        }
    }
}
