//! Patient-side types: identifiers, raw and parsed vitals, intake requests
//! and the stored patient record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::profile::Profile;
use crate::verdict::TriageVerdict;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Opaque patient identifier, e.g. `ID-4F2A9C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    /// Fresh id: `ID-` plus six upper-case hex characters of a v4 UUID.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(format!("ID-{}", simple[..6].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PatientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// Vital signs as typed by the operator. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVitals {
    /// Blood pressure, `SYS/DIA` or `SYS-DIA`.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub hr: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub spo2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub temp: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub rr: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub gcs: Option<String>,
}

impl RawVitals {
    /// True when no field carries any non-blank text.
    pub fn is_empty(&self) -> bool {
        [&self.bp, &self.hr, &self.spo2, &self.temp, &self.rr, &self.gcs]
            .iter()
            .all(|f| f.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

/// Parsed vital signs. `None` means unknown, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    /// Heart rate, beats per minute.
    pub hr: Option<f64>,
    /// Oxygen saturation, percent.
    pub spo2: Option<f64>,
    /// Temperature, °C.
    pub temp: Option<f64>,
    /// Respiratory rate, breaths per minute.
    pub rr: Option<f64>,
    /// Glasgow Coma Scale.
    pub gcs: Option<f64>,
}

/// Accept a JSON string, number, or null for a free-text field.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// What the desk submits for a new patient or a re-triage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeRequest {
    pub complaint: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub vitals: RawVitals,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default)]
    pub pregnancy: bool,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    /// Arrival time; queue tie-breaker and escalation clock origin.
    pub created_at: DateTime<Utc>,
    pub complaint: String,
    pub history: String,
    pub raw_vitals: RawVitals,
    pub vitals: Vitals,
    pub age: Option<u32>,
    pub pregnancy: bool,
    pub profile: Profile,
    pub triage: TriageVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = PatientId::generate();
        assert!(id.as_str().starts_with("ID-"));
        assert_eq!(id.as_str().len(), 9);
        assert!(id.as_str()[3..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_raw_vitals_accept_numbers_and_strings() {
        let raw: RawVitals = serde_json::from_str(
            r#"{"bp": "180/110", "spo2": 92, "temp": null}"#,
        ).unwrap();
        assert_eq!(raw.bp.as_deref(), Some("180/110"));
        assert_eq!(raw.spo2.as_deref(), Some("92"));
        assert_eq!(raw.temp, None);
        assert!(!raw.is_empty());
    }

    #[test]
    fn test_blank_raw_vitals_are_empty() {
        let raw = RawVitals { bp: Some("  ".to_string()), ..Default::default() };
        assert!(raw.is_empty());
        assert!(RawVitals::default().is_empty());
    }

    #[test]
    fn test_intake_defaults() {
        let req: IntakeRequest = serde_json::from_str(r#"{"complaint": "cough"}"#).unwrap();
        assert_eq!(req.history, "");
        assert!(req.vitals.is_empty());
        assert_eq!(req.age, None);
        assert!(!req.pregnancy);
    }
}
