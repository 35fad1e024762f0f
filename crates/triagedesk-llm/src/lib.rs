//! triagedesk-llm: Remote classification for Triagedesk.
//!
//! LLM backends, the triage prompt, the classification service wire format,
//! and the adapter that falls back to the local rule engine on any failure.

pub mod backend;
pub mod prompt;
pub mod wire;
pub mod service;
pub mod adapter;
pub mod audit;

pub use adapter::{Classification, RemoteClassifier};
pub use backend::{LlmBackend, LlmError, OpenAiCompatibleBackend, YandexGptBackend};
pub use service::{ClassificationService, ClassifyError, HttpClassificationService, LlmClassificationService};
pub use wire::{ClassifyRequest, ClassifyResponse, UnknownTierPolicy};
