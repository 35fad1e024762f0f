//! Priority tiers and the triage verdict attached to every patient record.

use serde::{Deserialize, Serialize};

use crate::confidence;

/// Suffix appended to the rationale when the desk marks a patient as seen.
pub const SEEN_ANNOTATION: &str = " (marked as seen)";

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Priority class. Variant order is queue order: CRITICAL < URGENT < PLANNED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Critical,
    Urgent,
    Planned,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Critical, Tier::Urgent, Tier::Planned];

    /// Sort rank used by the queue (0 = seen first).
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Critical => 0,
            Tier::Urgent   => 1,
            Tier::Planned  => 2,
        }
    }

    /// Fixed confidence reported by the local rule engine for this tier.
    pub fn rule_confidence(&self) -> f64 {
        match self {
            Tier::Critical => confidence::CRITICAL_CONFIDENCE,
            Tier::Urgent   => confidence::URGENT_CONFIDENCE,
            Tier::Planned  => confidence::PLANNED_CONFIDENCE,
        }
    }

    /// Opening sentence of the rationale.
    pub fn summary(&self) -> &'static str {
        match self {
            Tier::Critical => "Critical risk signs detected.",
            Tier::Urgent   => "Signs of a potential threat; examination required soon.",
            Tier::Planned  => "No acute signs; condition stable.",
        }
    }

    /// Advisory text used when no hint was supplied by a remote classifier.
    pub fn default_hint(&self) -> &'static str {
        match self {
            Tier::Critical => "Immediate examination. Record an ECG, keep SpO₂ ≥ 94%, call the relevant specialist.",
            Tier::Urgent   => "Examination soon. Repeat vitals, baseline diagnostics, escalate on deterioration.",
            Tier::Planned  => "Routine examination. Monitor vitals and run baseline tests as indicated.",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Critical => write!(f, "CRITICAL"),
            Tier::Urgent   => write!(f, "URGENT"),
            Tier::Planned  => write!(f, "PLANNED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Local rule engine (either by configuration or as a fallback).
    Rules,
    /// External classification service.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageVerdict {
    pub tier: Tier,
    pub red_flags: Vec<String>,
    pub urgent_signals: Vec<String>,
    /// Always within [0, 1].
    pub confidence: f64,
    pub reason: String,
    pub hint_for_doctor: String,
    pub source: VerdictSource,
}

impl TriageVerdict {
    /// Force the verdict to PLANNED after the patient has been seen.
    /// Flags, signals and confidence are left as they were.
    pub fn mark_seen(&mut self) {
        self.tier = Tier::Planned;
        if !self.reason.ends_with(SEEN_ANNOTATION) {
            self.reason.push_str(SEEN_ANNOTATION);
        }
        self.hint_for_doctor = Tier::Planned.default_hint().to_string();
    }

    pub fn is_seen(&self) -> bool {
        self.reason.ends_with(SEEN_ANNOTATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critical_verdict() -> TriageVerdict {
        TriageVerdict {
            tier: Tier::Critical,
            red_flags: vec!["chest pain".to_string()],
            urgent_signals: vec![],
            confidence: 0.93,
            reason: "Critical risk signs detected.".to_string(),
            hint_for_doctor: Tier::Critical.default_hint().to_string(),
            source: VerdictSource::Rules,
        }
    }

    #[test]
    fn test_tier_ordering_matches_rank() {
        assert!(Tier::Critical < Tier::Urgent);
        assert!(Tier::Urgent < Tier::Planned);
        let ranks: Vec<u8> = Tier::ALL.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_mark_seen_forces_planned() {
        let mut v = critical_verdict();
        v.mark_seen();
        assert_eq!(v.tier, Tier::Planned);
        assert!(v.reason.ends_with(SEEN_ANNOTATION));
        assert_eq!(v.red_flags, vec!["chest pain".to_string()]);
        assert_eq!(v.confidence, 0.93);
    }

    #[test]
    fn test_mark_seen_annotates_once() {
        let mut v = critical_verdict();
        v.mark_seen();
        v.mark_seen();
        assert_eq!(v.reason.matches(SEEN_ANNOTATION).count(), 1);
    }

    #[test]
    fn test_tier_serializes_snake_case() {
        let json = serde_json::to_string(&Tier::Urgent).unwrap();
        assert_eq!(json, "\"urgent\"");
    }
}
