//! Numeric cut-offs used by the rule engine.

use serde::{Deserialize, Serialize};

/// Vital-sign thresholds. Red-flag limits force CRITICAL (RR and GCS only
/// add a label), urgency limits force URGENT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalThresholds {
    /// Systolic at or above this is a red flag.
    pub systolic_crisis: f64,
    /// Diastolic at or above this is a red flag.
    pub diastolic_crisis: f64,
    /// SpO₂ strictly below this is a red flag.
    pub spo2_red: f64,
    /// SpO₂ in [spo2_red, spo2_urgent) is an urgency signal; chest pain below it is critical.
    pub spo2_urgent: f64,
    /// Respiratory rate strictly above this is a red flag.
    pub rr_red: f64,
    /// GCS strictly below this is a red flag.
    pub gcs_red: f64,
    /// Temperature at or above this is an urgency signal on its own.
    pub fever_urgent: f64,
    /// Temperature at or above this is an urgency signal when a comorbidity is on record.
    pub fever_comorbid: f64,
    /// Heart rate at or above this is an urgency signal.
    pub hr_urgent: f64,
}

impl Default for VitalThresholds {
    fn default() -> Self {
        Self {
            systolic_crisis:  220.0,
            diastolic_crisis: 120.0,
            spo2_red:         92.0,
            spo2_urgent:      94.0,
            rr_red:           30.0,
            gcs_red:          13.0,
            fever_urgent:     38.5,
            fever_comorbid:   38.0,
            hr_urgent:        110.0,
        }
    }
}

impl VitalThresholds {
    /// Check that paired limits are ordered the way the rules assume.
    pub fn validate(&self) -> bool {
        self.spo2_red <= self.spo2_urgent && self.fever_comorbid <= self.fever_urgent
    }
}
