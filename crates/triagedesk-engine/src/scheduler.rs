//! Deadline tracking for escalation recomputation.
//!
//! Instead of polling, the caller sleeps until the earlier of a coarse
//! periodic refresh and the nearest upcoming threshold crossing, so a newly
//! escalated patient shows up within one tick of crossing.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use triagedesk_common::{PatientId, PatientRecord, Tier};
use tracing::debug;

use crate::queue::EscalationPolicy;

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct EscalationScheduler {
    policy: EscalationPolicy,
    refresh: Duration,
    /// (id, tier) pairs already reported as escalated.
    announced: HashSet<(PatientId, Tier)>,
}

impl EscalationScheduler {
    pub fn new(policy: EscalationPolicy, refresh: Duration) -> Self {
        Self { policy, refresh, announced: HashSet::new() }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// How long to sleep before the next recomputation.
    pub fn next_wake(&self, records: &[PatientRecord], now: DateTime<Utc>) -> Duration {
        records
            .iter()
            .filter_map(|r| self.policy.time_to_next_escalation(r, now))
            .filter(|d| !d.is_zero())
            .min()
            .map_or(self.refresh, |nearest| nearest.min(self.refresh))
    }

    /// Records that crossed their threshold since the previous call.
    ///
    /// A record is reported once per tier; re-triage into another tier, or
    /// dropping out of escalation, makes it eligible again.
    pub fn poll(&mut self, records: &[PatientRecord], now: DateTime<Utc>) -> Vec<PatientId> {
        let escalated: HashSet<(PatientId, Tier)> = records
            .iter()
            .filter(|r| self.policy.should_escalate(r, now))
            .map(|r| (r.id.clone(), r.triage.tier))
            .collect();

        let mut fresh: Vec<&PatientRecord> = records
            .iter()
            .filter(|r| {
                let key = (r.id.clone(), r.triage.tier);
                escalated.contains(&key) && !self.announced.contains(&key)
            })
            .collect();
        fresh.sort_by_key(|r| (r.triage.tier.rank(), r.created_at));

        self.announced = escalated;
        if !fresh.is_empty() {
            debug!(count = fresh.len(), "patients crossed their escalation threshold");
        }
        fresh.into_iter().map(|r| r.id.clone()).collect()
    }
}

impl Default for EscalationScheduler {
    fn default() -> Self {
        Self::new(EscalationPolicy::default(), DEFAULT_REFRESH)
    }
}
