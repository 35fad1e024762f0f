//! The triage desk: intake, re-triage, mark-as-seen and profile changes.
//!
//! Each operation classifies first and touches the store only once the
//! verdict is ready, so a record is never visible without its triage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};
use triagedesk_common::{
    IntakeRequest, PatientId, PatientRecord, Profile, Result, TriageError,
};
use triagedesk_engine::{build_queue, EscalationPolicy, PatientStore, PreparedIntake, QueueEntry, Reassessment};
use triagedesk_llm::{Classification, RemoteClassifier};

use crate::state::QueueEvent;

/// Attempts at drawing a fresh id before giving up.
const ID_ATTEMPTS: usize = 5;

pub struct Desk {
    store: Arc<PatientStore>,
    classifier: RemoteClassifier,
    policy: EscalationPolicy,
    events: broadcast::Sender<QueueEvent>,
}

impl Desk {
    pub fn new(
        classifier: RemoteClassifier,
        policy: EscalationPolicy,
        events: broadcast::Sender<QueueEvent>,
    ) -> Self {
        Self { store: Arc::new(PatientStore::new()), classifier, policy, events }
    }

    pub fn store(&self) -> &Arc<PatientStore> {
        &self.store
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn publish(&self, event: QueueEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn intake(&self, req: IntakeRequest) -> Result<PatientRecord> {
        let prepared = PreparedIntake::from_request(req)?;
        // arrival is when the form came in, not when the verdict did
        let created_at = Utc::now();
        let Classification { verdict, profile, audit } = self.classifier.classify(&prepared).await;
        log_audit(&audit);

        for _ in 0..ID_ATTEMPTS {
            let record = PatientRecord {
                id: PatientId::generate(),
                created_at,
                complaint: prepared.complaint.clone(),
                history: prepared.history.clone(),
                raw_vitals: prepared.raw_vitals.clone(),
                vitals: prepared.vitals,
                age: prepared.age,
                pregnancy: prepared.pregnancy,
                profile,
                triage: verdict.clone(),
            };
            match self.store.insert(record.clone()).await {
                Ok(()) => {
                    info!(id = %record.id, tier = %record.triage.tier, profile = %record.profile, "patient added");
                    self.publish(QueueEvent::PatientAdded {
                        id: record.id.clone(),
                        tier: record.triage.tier,
                        profile: record.profile,
                    });
                    return Ok(record);
                }
                Err(TriageError::DuplicatePatient(id)) => {
                    warn!(id = %id, "generated id already taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(TriageError::Other(anyhow::anyhow!("could not allocate a patient id")))
    }

    /// Replace a record's inputs and verdict with a fresh classification.
    pub async fn retriage(&self, id: &PatientId, req: IntakeRequest) -> Result<PatientRecord> {
        if !self.store.contains(id).await {
            return Err(TriageError::PatientNotFound(id.clone()));
        }
        let prepared = PreparedIntake::from_request(req)?;
        let Classification { verdict, profile, audit } = self.classifier.classify(&prepared).await;
        log_audit(&audit);

        let record = self.store.reassess(id, Reassessment {
            complaint: prepared.complaint,
            history: prepared.history,
            raw_vitals: prepared.raw_vitals,
            vitals: prepared.vitals,
            age: prepared.age,
            pregnancy: prepared.pregnancy,
            profile,
            triage: verdict,
        }).await?;

        info!(id = %record.id, tier = %record.triage.tier, "patient re-triaged");
        self.publish(QueueEvent::Retriaged { id: record.id.clone(), tier: record.triage.tier });
        Ok(record)
    }

    pub async fn mark_seen(&self, id: &PatientId) -> Result<PatientRecord> {
        let record = self.store.mark_seen(id).await?;
        info!(id = %record.id, "patient marked as seen");
        self.publish(QueueEvent::MarkedSeen { id: record.id.clone() });
        Ok(record)
    }

    pub async fn reassign_profile(&self, id: &PatientId, profile: Profile) -> Result<PatientRecord> {
        let record = self.store.set_profile(id, profile).await?;
        info!(id = %record.id, profile = %profile, "profile reassigned");
        self.publish(QueueEvent::ProfileChanged { id: record.id.clone(), profile });
        Ok(record)
    }

    pub async fn get(&self, id: &PatientId) -> Result<PatientRecord> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| TriageError::PatientNotFound(id.clone()))
    }

    /// Ordered queue as of `now`, optionally limited to one profile.
    pub async fn queue(&self, filter: Option<Profile>, now: DateTime<Utc>) -> Vec<QueueEntry> {
        let records = self.store.snapshot().await;
        build_queue(&records, filter, &self.policy, now)
    }
}

fn log_audit(audit: &triagedesk_llm::audit::ClassificationAuditEntry) {
    info!(
        target: "triagedesk::audit",
        audit_id = %audit.id,
        service = %audit.service,
        remote = audit.remote,
        failure = audit.failure.as_deref().unwrap_or("-"),
        latency_ms = audit.latency_ms,
        reason_sha256 = %audit.reason_hash,
        "classification"
    );
}
