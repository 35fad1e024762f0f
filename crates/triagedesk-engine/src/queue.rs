//! Queue ordering and wait-time escalation.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use triagedesk_common::{PatientRecord, Profile, Tier};

/// Order records by tier rank, then arrival. Stable, so records with equal
/// keys keep their input order.
pub fn order(records: &[PatientRecord]) -> Vec<&PatientRecord> {
    let mut sorted: Vec<&PatientRecord> = records.iter().collect();
    sorted.sort_by_key(|r| (r.triage.tier.rank(), r.created_at));
    sorted
}

/// Whole minutes since arrival. Never negative.
pub fn wait_minutes(record: &PatientRecord, now: DateTime<Utc>) -> i64 {
    (now - record.created_at).num_minutes().max(0)
}

/// Per-tier wait limits after which a patient is flagged for escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub critical_minutes: i64,
    pub urgent_minutes: i64,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self { critical_minutes: 10, urgent_minutes: 30 }
    }
}

impl EscalationPolicy {
    /// Wait limit for a tier; PLANNED never escalates.
    pub fn threshold_minutes(&self, tier: Tier) -> Option<i64> {
        match tier {
            Tier::Critical => Some(self.critical_minutes),
            Tier::Urgent   => Some(self.urgent_minutes),
            Tier::Planned  => None,
        }
    }

    pub fn should_escalate(&self, record: &PatientRecord, now: DateTime<Utc>) -> bool {
        self.threshold_minutes(record.triage.tier)
            .is_some_and(|limit| wait_minutes(record, now) >= limit)
    }

    /// Time left until the threshold is crossed. `Some(ZERO)` once crossed,
    /// `None` for tiers that never escalate or a deadline past the calendar's end.
    pub fn time_to_next_escalation(&self, record: &PatientRecord, now: DateTime<Utc>) -> Option<Duration> {
        let limit = self.threshold_minutes(record.triage.tier)?;
        let due = record
            .created_at
            .checked_add_signed(TimeDelta::try_minutes(limit)?)?;
        Some((due - now).to_std().unwrap_or(Duration::ZERO))
    }
}

/// One row of the queue as the presentation layer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub record: PatientRecord,
    /// Human-readable department name for display.
    pub profile_label: &'static str,
    pub escalated: bool,
    pub wait_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_escalation_in_secs: Option<u64>,
}

/// Ordered, optionally profile-filtered view with escalation state.
pub fn build_queue(
    records: &[PatientRecord],
    filter: Option<Profile>,
    policy: &EscalationPolicy,
    now: DateTime<Utc>,
) -> Vec<QueueEntry> {
    order(records)
        .into_iter()
        .filter(|r| filter.map_or(true, |p| r.profile == p))
        .map(|r| QueueEntry {
            profile_label: r.profile.label(),
            escalated: policy.should_escalate(r, now),
            wait_minutes: wait_minutes(r, now),
            next_escalation_in_secs: policy.time_to_next_escalation(r, now).map(|d| d.as_secs()),
            record: r.clone(),
        })
        .collect()
}
