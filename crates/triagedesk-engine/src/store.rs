//! In-memory patient record store.
//!
//! Every mutation takes the write lock for its whole duration, so readers
//! see a record either before or after a change, never halfway. Records are
//! never deleted: "seen" patients stay in the store as PLANNED.

use std::sync::Arc;

use tokio::sync::{Notify, RwLock};
use tracing::debug;
use triagedesk_common::{
    PatientId, PatientRecord, Profile, RawVitals, Result, TriageError, TriageVerdict, Vitals,
};

/// Replacement inputs and verdict for a re-triaged record.
#[derive(Debug, Clone)]
pub struct Reassessment {
    pub complaint: String,
    pub history: String,
    pub raw_vitals: RawVitals,
    pub vitals: Vitals,
    pub age: Option<u32>,
    pub pregnancy: bool,
    pub profile: Profile,
    pub triage: TriageVerdict,
}

#[derive(Debug, Default)]
pub struct PatientStore {
    records: RwLock<Vec<PatientRecord>>,
    changed: Arc<Notify>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully triaged record. Ids must be unique.
    pub async fn insert(&self, record: PatientRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(TriageError::DuplicatePatient(record.id));
        }
        debug!(id = %record.id, tier = %record.triage.tier, "patient inserted");
        records.push(record);
        drop(records);
        self.changed.notify_one();
        Ok(())
    }

    pub async fn get(&self, id: &PatientId) -> Option<PatientRecord> {
        self.records.read().await.iter().find(|r| &r.id == id).cloned()
    }

    pub async fn contains(&self, id: &PatientId) -> bool {
        self.records.read().await.iter().any(|r| &r.id == id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Consistent copy of every record, taken under a single read lock.
    pub async fn snapshot(&self) -> Vec<PatientRecord> {
        self.records.read().await.clone()
    }

    /// Apply `f` to one record under the write lock and return the updated copy.
    pub async fn update<F>(&self, id: &PatientId, f: F) -> Result<PatientRecord>
    where
        F: FnOnce(&mut PatientRecord),
    {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| TriageError::PatientNotFound(id.clone()))?;
        f(record);
        let updated = record.clone();
        drop(records);
        self.changed.notify_one();
        Ok(updated)
    }

    /// Replace inputs, profile and verdict wholesale.
    pub async fn reassess(&self, id: &PatientId, next: Reassessment) -> Result<PatientRecord> {
        self.update(id, move |r| {
            r.complaint = next.complaint;
            r.history = next.history;
            r.raw_vitals = next.raw_vitals;
            r.vitals = next.vitals;
            r.age = next.age;
            r.pregnancy = next.pregnancy;
            r.profile = next.profile;
            r.triage = next.triage;
        })
        .await
    }

    pub async fn mark_seen(&self, id: &PatientId) -> Result<PatientRecord> {
        self.update(id, |r| r.triage.mark_seen()).await
    }

    pub async fn set_profile(&self, id: &PatientId, profile: Profile) -> Result<PatientRecord> {
        self.update(id, |r| r.profile = profile).await
    }

    /// Resolves after the next successful mutation. A mutation that happened
    /// while nobody was waiting is remembered, so it is never missed.
    pub async fn changed(&self) {
        self.changed.notified().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::record_at;
    use chrono::Utc;
    use triagedesk_common::Tier;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = PatientStore::new();
        store.insert(record_at("ID-1", Tier::Urgent, Utc::now())).await.unwrap();
        assert_eq!(store.len().await, 1);
        let r = store.get(&PatientId::from("ID-1")).await.unwrap();
        assert_eq!(r.triage.tier, Tier::Urgent);
        assert!(store.get(&PatientId::from("ID-2")).await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = PatientStore::new();
        store.insert(record_at("ID-1", Tier::Urgent, Utc::now())).await.unwrap();
        let err = store.insert(record_at("ID-1", Tier::Planned, Utc::now())).await.unwrap_err();
        assert!(matches!(err, TriageError::DuplicatePatient(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_mark_seen_keeps_record() {
        let store = PatientStore::new();
        store.insert(record_at("ID-1", Tier::Critical, Utc::now())).await.unwrap();
        let r = store.mark_seen(&PatientId::from("ID-1")).await.unwrap();
        assert_eq!(r.triage.tier, Tier::Planned);
        assert!(r.triage.is_seen());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = PatientStore::new();
        let err = store.set_profile(&PatientId::from("nope"), Profile::Neuro).await.unwrap_err();
        assert!(matches!(err, TriageError::PatientNotFound(_)));
    }

    #[tokio::test]
    async fn test_set_profile_only_touches_profile() {
        let store = PatientStore::new();
        let original = record_at("ID-1", Tier::Urgent, Utc::now());
        store.insert(original.clone()).await.unwrap();
        let r = store.set_profile(&original.id, Profile::Neuro).await.unwrap();
        assert_eq!(r.profile, Profile::Neuro);
        assert_eq!(r.triage, original.triage);
        assert_eq!(r.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_changed_fires_after_mutation() {
        let store = PatientStore::new();
        store.insert(record_at("ID-1", Tier::Urgent, Utc::now())).await.unwrap();
        // permit stored by notify_one before anyone waited
        tokio::time::timeout(std::time::Duration::from_secs(1), store.changed())
            .await
            .expect("change notification");
    }
}
