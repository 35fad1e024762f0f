//! Intake normalisation shared by first triage and re-triage.

use triagedesk_common::{IntakeRequest, Profile, RawVitals, Result, TriageError, Vitals};

use crate::profile::classify_profile;
use crate::vitals::{parse_age, parse_vitals};

/// Validated, trimmed and parsed intake form.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedIntake {
    pub complaint: String,
    pub history: String,
    pub raw_vitals: RawVitals,
    pub vitals: Vitals,
    pub age: Option<u32>,
    pub pregnancy: bool,
    /// Profile inferred from the complaint and age.
    pub inferred_profile: Profile,
}

impl PreparedIntake {
    /// Reject a blank complaint, trim text and parse numbers.
    pub fn from_request(req: IntakeRequest) -> Result<Self> {
        let complaint = req.complaint.trim().to_string();
        if complaint.is_empty() {
            return Err(TriageError::Validation("complaint must not be empty".to_string()));
        }
        let history = req.history.trim().to_string();
        let vitals = parse_vitals(&req.vitals);
        let age = parse_age(req.age.as_deref());
        let inferred_profile = classify_profile(&complaint, age);

        Ok(Self {
            complaint,
            history,
            raw_vitals: req.vitals,
            vitals,
            age,
            pregnancy: req.pregnancy,
            inferred_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_complaint_rejected() {
        let req = IntakeRequest { complaint: "   \n".to_string(), ..Default::default() };
        let err = PreparedIntake::from_request(req).unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
    }

    #[test]
    fn test_fields_trimmed_and_parsed() {
        let req = IntakeRequest {
            complaint: "  headache after a fall ".to_string(),
            history: " none ".to_string(),
            vitals: RawVitals { bp: Some("130/85".to_string()), ..Default::default() },
            age: Some("34,9".to_string()),
            pregnancy: true,
        };
        let p = PreparedIntake::from_request(req).unwrap();
        assert_eq!(p.complaint, "headache after a fall");
        assert_eq!(p.history, "none");
        assert_eq!(p.vitals.systolic, Some(130.0));
        assert_eq!(p.age, Some(34));
        assert!(p.pregnancy);
        assert_eq!(p.raw_vitals.bp.as_deref(), Some("130/85"));
    }

    #[test]
    fn test_child_routed_to_peds() {
        let req = IntakeRequest {
            complaint: "fever".to_string(),
            age: Some("7".to_string()),
            ..Default::default()
        };
        assert_eq!(PreparedIntake::from_request(req).unwrap().inferred_profile, Profile::Peds);
    }
}
