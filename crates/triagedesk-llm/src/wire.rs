//! Request and response shapes of the classification service, and the
//! mapping from its vocabulary onto internal tiers and profiles.

use serde::{Deserialize, Serialize};
use triagedesk_common::confidence::confidence_from_json;
use triagedesk_common::{Profile, RawVitals, Tier, TriageVerdict, VerdictSource};

use crate::service::ClassifyError;

// ── Outbound ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub complaint: String,
    #[serde(default)]
    pub history: String,
    /// Omitted entirely when no vital was entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<RawVitals>,
}

impl ClassifyRequest {
    pub fn new(complaint: impl Into<String>, history: impl Into<String>, vitals: &RawVitals) -> Self {
        Self {
            complaint: complaint.into(),
            history: history.into(),
            vitals: (!vitals.is_empty()).then(|| vitals.clone()),
        }
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
}

/// Reply body. `priority` and `reason` are required; everything else is
/// tolerated when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub priority: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_for_doctor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Kept raw: numbers, numeric strings or garbage all arrive here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<serde_json::Value>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRef>>,
}

// ── Vocabulary ────────────────────────────────────────────────────────────────

/// Map a remote priority label. Case-insensitive, surrounding space ignored.
pub fn parse_tier(label: &str) -> Option<Tier> {
    match label.trim().to_lowercase().as_str() {
        "критично срочно" | "critical" => Some(Tier::Critical),
        "срочно" | "urgent"            => Some(Tier::Urgent),
        "планово" | "planned"          => Some(Tier::Planned),
        _                              => None,
    }
}

/// What to do with a priority label outside the known vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTierPolicy {
    /// Treat the label as PLANNED.
    Planned,
    /// Treat the label as URGENT.
    Urgent,
    /// Reject the reply and use the local verdict.
    #[default]
    LocalFallback,
}

/// A remote reply mapped onto internal types.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVerdict {
    pub verdict: TriageVerdict,
    pub profile: Profile,
}

impl ClassifyResponse {
    /// Map onto a verdict. `inferred` is used when the remote profile has no
    /// internal counterpart.
    pub fn into_verdict(
        self,
        inferred: Profile,
        policy: UnknownTierPolicy,
    ) -> Result<RemoteVerdict, ClassifyError> {
        let tier = match (parse_tier(&self.priority), policy) {
            (Some(tier), _)                            => tier,
            (None, UnknownTierPolicy::Planned)         => Tier::Planned,
            (None, UnknownTierPolicy::Urgent)          => Tier::Urgent,
            (None, UnknownTierPolicy::LocalFallback)   => {
                return Err(ClassifyError::UnknownTier(self.priority));
            }
        };

        let hint_for_doctor = self
            .hint_for_doctor
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| tier.default_hint().to_string());
        let reason = if self.reason.trim().is_empty() {
            tier.summary().to_string()
        } else {
            self.reason
        };
        let profile = self
            .profile
            .as_deref()
            .and_then(Profile::from_remote_label)
            .unwrap_or(inferred);

        Ok(RemoteVerdict {
            verdict: TriageVerdict {
                tier,
                red_flags: self.red_flags,
                urgent_signals: Vec::new(),
                confidence: confidence_from_json(self.confidence.as_ref()),
                reason,
                hint_for_doctor,
                source: VerdictSource::Remote,
            },
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> ClassifyResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_vitals_omitted_from_payload() {
        let req = ClassifyRequest::new("cough", "", &RawVitals::default());
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("vitals").is_none());

        let vitals = RawVitals { spo2: Some("95".to_string()), ..Default::default() };
        let body = serde_json::to_value(ClassifyRequest::new("cough", "", &vitals)).unwrap();
        assert_eq!(body["vitals"], json!({"spo2": "95"}));
    }

    #[test]
    fn test_tier_vocabulary() {
        assert_eq!(parse_tier("критично срочно"), Some(Tier::Critical));
        assert_eq!(parse_tier(" Срочно "), Some(Tier::Urgent));
        assert_eq!(parse_tier("планово"), Some(Tier::Planned));
        assert_eq!(parse_tier("CRITICAL"), Some(Tier::Critical));
        assert_eq!(parse_tier("asap"), None);
    }

    #[test]
    fn test_unknown_tier_policies() {
        let r = || response(json!({"priority": "asap", "reason": "r"}));
        assert_eq!(
            r().into_verdict(Profile::Therapy, UnknownTierPolicy::Planned).unwrap().verdict.tier,
            Tier::Planned
        );
        assert_eq!(
            r().into_verdict(Profile::Therapy, UnknownTierPolicy::Urgent).unwrap().verdict.tier,
            Tier::Urgent
        );
        assert!(matches!(
            r().into_verdict(Profile::Therapy, UnknownTierPolicy::LocalFallback),
            Err(ClassifyError::UnknownTier(label)) if label == "asap"
        ));
    }

    #[test]
    fn test_remote_verdict_mapping() {
        let mapped = response(json!({
            "priority": "срочно",
            "reason": "fever with COPD",
            "hint_for_doctor": "  ",
            "profile": "surgery",
            "confidence": "0,9",
            "red_flags": ["fever"],
            "sources": [{"id": "doc_cardio_01", "section": "1"}]
        }))
        .into_verdict(Profile::Therapy, UnknownTierPolicy::default())
        .unwrap();

        assert_eq!(mapped.profile, Profile::Trauma);
        let v = mapped.verdict;
        assert_eq!(v.tier, Tier::Urgent);
        assert_eq!(v.confidence, 0.9);
        assert_eq!(v.hint_for_doctor, Tier::Urgent.default_hint());
        assert_eq!(v.red_flags, vec!["fever".to_string()]);
        assert!(v.urgent_signals.is_empty());
        assert_eq!(v.source, VerdictSource::Remote);
    }

    #[test]
    fn test_other_profile_uses_inference_and_confidence_defaults() {
        let mapped = response(json!({"priority": "планово", "reason": "ok", "profile": "other", "confidence": "high"}))
            .into_verdict(Profile::Neuro, UnknownTierPolicy::default())
            .unwrap();
        assert_eq!(mapped.profile, Profile::Neuro);
        assert_eq!(mapped.verdict.confidence, 0.7);
    }

    #[test]
    fn test_out_of_range_confidence_clamped() {
        let mapped = response(json!({"priority": "critical", "reason": "x", "confidence": 3.5}))
            .into_verdict(Profile::Therapy, UnknownTierPolicy::default())
            .unwrap();
        assert_eq!(mapped.verdict.confidence, 1.0);
    }

    #[test]
    fn test_missing_priority_is_rejected() {
        let parsed: Result<ClassifyResponse, _> = serde_json::from_value(json!({"reason": "x"}));
        assert!(parsed.is_err());
    }
}
