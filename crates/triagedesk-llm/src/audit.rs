//! Audit records for classification attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationAuditEntry {
    pub id: Uuid,
    /// Service that was asked, or `"rules"` when the network was bypassed.
    pub service: String,
    /// Whether the returned verdict came from the remote service.
    pub remote: bool,
    /// Failure kind when the remote attempt was abandoned.
    pub failure: Option<String>,
    /// SHA-256 of the returned reason text.
    pub reason_hash: String,
    pub latency_ms: u64,
    pub called_at: DateTime<Utc>,
}

impl ClassificationAuditEntry {
    pub fn new(
        service: impl Into<String>,
        remote: bool,
        failure: Option<String>,
        reason: &str,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(reason.as_bytes());

        Self {
            id: Uuid::new_v4(),
            service: service.into(),
            remote,
            failure,
            reason_hash: format!("{:x}", hasher.finalize()),
            latency_ms,
            called_at: Utc::now(),
        }
    }
}
