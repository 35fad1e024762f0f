//! triagedesk-engine: Local triage core.
//!
//! Vital parsing, profile inference, the rule engine, queue ordering with
//! wait-time escalation, and the in-memory patient store. Everything except
//! the store is synchronous and free of I/O.

pub mod intake;
pub mod vitals;
pub mod profile;
pub mod thresholds;
pub mod rules;
pub mod queue;
pub mod scheduler;
pub mod store;

pub use intake::PreparedIntake;
pub use queue::{build_queue, EscalationPolicy, QueueEntry};
pub use rules::{evaluate, RuleEngine};
pub use scheduler::EscalationScheduler;
pub use thresholds::VitalThresholds;
pub use store::{PatientStore, Reassessment};

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, Utc};
    use triagedesk_common::{
        PatientId, PatientRecord, Profile, RawVitals, Tier, TriageVerdict, VerdictSource, Vitals,
    };

    /// Minimal record with a rule-style verdict for `tier`.
    pub fn record_at(id: &str, tier: Tier, created_at: DateTime<Utc>) -> PatientRecord {
        PatientRecord {
            id: PatientId::from(id),
            created_at,
            complaint: "test".to_string(),
            history: String::new(),
            raw_vitals: RawVitals::default(),
            vitals: Vitals::default(),
            age: None,
            pregnancy: false,
            profile: Profile::Therapy,
            triage: TriageVerdict {
                tier,
                red_flags: Vec::new(),
                urgent_signals: Vec::new(),
                confidence: tier.rule_confidence(),
                reason: tier.summary().to_string(),
                hint_for_doctor: tier.default_hint().to_string(),
                source: VerdictSource::Rules,
            },
        }
    }
}
