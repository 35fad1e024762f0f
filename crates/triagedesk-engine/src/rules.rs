//! Local triage rule engine.
//!
//! Scans the complaint for red-flag phrases, the vitals for red-flag and
//! urgency thresholds, and the history for comorbidities, then picks a tier:
//!
//! 1. CRITICAL: bleeding, seizure/LOC or neurological deficit in the text;
//!    SpO₂ below the red limit; hypertensive crisis; or chest pain with a
//!    known SpO₂ below the urgency limit.
//! 2. URGENT: any urgency signal, or dyspnea in the text.
//! 3. PLANNED otherwise.
//!
//! Total and deterministic: missing vitals simply fail their checks.

use std::sync::LazyLock;

use regex::Regex;
use triagedesk_common::{Tier, TriageVerdict, VerdictSource, Vitals};

use crate::thresholds::VitalThresholds;

// ── Text patterns ────────────────────────────────────────────────────────────

static BLEEDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bleed|hemorrhag|haemorrhag|кровотеч|обильн").expect("bleeding pattern")
});

static SEIZURE_OR_LOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)seizure|convuls|loss of consciousness|lost consciousness|unconscious|passed out|fainted|судорог|потеря созн",
    )
    .expect("seizure pattern")
});

static CHEST_PAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)chest (pain|pressure|tightness)|pain.*(chest|sternum)|pressing pain|crushing pain|боль.*грудин|боль в груди|давящая боль",
    )
    .expect("chest pain pattern")
});

static DYSPNEA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)dyspn|short(ness)? of breath|breathless|difficulty breathing|hard to breathe|can'?t breathe|одышк|задых|тяжело дышать",
    )
    .expect("dyspnea pattern")
});

static NEURO_DEFICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)numbness|asymmetr|facial droop|slurred speech|speech (disturb|impair)|aphasia|онемени|асимметри|речь наруш",
    )
    .expect("neuro deficit pattern")
});

static COMORBIDITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)copd|diabet|immunosupp|immunocomprom|хобл|диабет|иммуносуп")
        .expect("comorbidity pattern")
});

// ── Findings ─────────────────────────────────────────────────────────────────

/// A condition that on its own may force CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedFlag {
    MassiveBleeding,
    SeizureOrLoc,
    ChestPain,
    Dyspnea,
    NeuroDeficit,
    HypertensiveCrisis,
    LowSpo2,
    Tachypnea,
    LowGcs,
}

impl RedFlag {
    /// Forces CRITICAL by itself. Dyspnea, RR and GCS do not.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            RedFlag::MassiveBleeding
                | RedFlag::SeizureOrLoc
                | RedFlag::NeuroDeficit
                | RedFlag::HypertensiveCrisis
                | RedFlag::LowSpo2
        )
    }

    pub fn label(&self, t: &VitalThresholds) -> String {
        match self {
            RedFlag::MassiveBleeding    => "massive bleeding".to_string(),
            RedFlag::SeizureOrLoc       => "seizure/loss of consciousness".to_string(),
            RedFlag::ChestPain          => "chest pain".to_string(),
            RedFlag::Dyspnea            => "dyspnea".to_string(),
            RedFlag::NeuroDeficit       => "neurological deficit".to_string(),
            RedFlag::HypertensiveCrisis => format!("BP ≥ {}/{}", t.systolic_crisis, t.diastolic_crisis),
            RedFlag::LowSpo2            => format!("SpO₂ < {}%", t.spo2_red),
            RedFlag::Tachypnea          => format!("RR > {}", t.rr_red),
            RedFlag::LowGcs             => format!("GCS < {}", t.gcs_red),
        }
    }
}

/// A condition that may force URGENT but never CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrgentSignal {
    BorderlineSpo2,
    Fever,
    Tachycardia,
    ComorbidFever,
}

impl UrgentSignal {
    pub fn label(&self, t: &VitalThresholds) -> String {
        match self {
            UrgentSignal::BorderlineSpo2 => format!("SpO₂ {}–{}%", t.spo2_red, t.spo2_urgent),
            UrgentSignal::Fever          => format!("t° ≥ {}", t.fever_urgent),
            UrgentSignal::Tachycardia    => format!("HR ≥ {}", t.hr_urgent),
            UrgentSignal::ComorbidFever  => "comorbidity + fever".to_string(),
        }
    }
}

/// Everything the scan found, in detection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub red_flags: Vec<RedFlag>,
    pub urgent_signals: Vec<UrgentSignal>,
    /// Chest pain mentioned in the complaint.
    pub chest_pain: bool,
    /// Known SpO₂, kept for the chest-pain rule.
    pub spo2: Option<f64>,
}

impl Findings {
    pub fn has(&self, flag: RedFlag) -> bool {
        self.red_flags.contains(&flag)
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    thresholds: VitalThresholds,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: VitalThresholds) -> Self {
        Self { thresholds }
    }

    /// Run the full rule set and build a verdict.
    pub fn evaluate(&self, complaint: &str, history: &str, vitals: &Vitals) -> TriageVerdict {
        let findings = self.scan(complaint, history, vitals);
        let tier = self.decide_tier(&findings);
        self.build_verdict(tier, &findings)
    }

    /// Collect red flags and urgency signals without deciding a tier.
    pub fn scan(&self, complaint: &str, history: &str, vitals: &Vitals) -> Findings {
        let t = &self.thresholds;

        // Text red flags, one label per category
        let chest_pain = CHEST_PAIN.is_match(complaint);
        let text_flags = [
            (BLEEDING.is_match(complaint), RedFlag::MassiveBleeding),
            (SEIZURE_OR_LOC.is_match(complaint), RedFlag::SeizureOrLoc),
            (chest_pain, RedFlag::ChestPain),
            (DYSPNEA.is_match(complaint), RedFlag::Dyspnea),
            (NEURO_DEFICIT.is_match(complaint), RedFlag::NeuroDeficit),
        ];

        // Numeric red flags
        let crisis = vitals.systolic.is_some_and(|s| s >= t.systolic_crisis)
            || vitals.diastolic.is_some_and(|d| d >= t.diastolic_crisis);
        let vital_flags = [
            (crisis, RedFlag::HypertensiveCrisis),
            (vitals.spo2.is_some_and(|s| s < t.spo2_red), RedFlag::LowSpo2),
            (vitals.rr.is_some_and(|r| r > t.rr_red), RedFlag::Tachypnea),
            (vitals.gcs.is_some_and(|g| g < t.gcs_red), RedFlag::LowGcs),
        ];
        let red_flags: Vec<RedFlag> = text_flags
            .into_iter()
            .chain(vital_flags)
            .filter_map(|(hit, flag)| hit.then_some(flag))
            .collect();

        // Urgency signals
        let mut urgent_signals = Vec::new();
        if vitals.spo2.is_some_and(|s| s >= t.spo2_red && s < t.spo2_urgent) {
            urgent_signals.push(UrgentSignal::BorderlineSpo2);
        }
        if vitals.temp.is_some_and(|x| x >= t.fever_urgent) {
            urgent_signals.push(UrgentSignal::Fever);
        }
        if vitals.hr.is_some_and(|h| h >= t.hr_urgent) {
            urgent_signals.push(UrgentSignal::Tachycardia);
        }
        if COMORBIDITY.is_match(history) && vitals.temp.is_some_and(|x| x >= t.fever_comorbid) {
            urgent_signals.push(UrgentSignal::ComorbidFever);
        }

        Findings { red_flags, urgent_signals, chest_pain, spo2: vitals.spo2 }
    }

    /// First matching rule wins.
    pub fn decide_tier(&self, findings: &Findings) -> Tier {
        let chest_pain_hypoxic = findings.chest_pain
            && findings.spo2.is_some_and(|s| s < self.thresholds.spo2_urgent);

        if findings.red_flags.iter().any(RedFlag::is_critical) || chest_pain_hypoxic {
            Tier::Critical
        } else if !findings.urgent_signals.is_empty() || findings.has(RedFlag::Dyspnea) {
            Tier::Urgent
        } else {
            Tier::Planned
        }
    }

    fn build_verdict(&self, tier: Tier, findings: &Findings) -> TriageVerdict {
        let t = &self.thresholds;
        let red_flags: Vec<String> = findings.red_flags.iter().map(|f| f.label(t)).collect();
        let urgent_signals: Vec<String> =
            findings.urgent_signals.iter().map(|s| s.label(t)).collect();

        TriageVerdict {
            tier,
            reason: compose_reason(tier, &red_flags, &urgent_signals),
            red_flags,
            urgent_signals,
            confidence: tier.rule_confidence(),
            hint_for_doctor: tier.default_hint().to_string(),
            source: VerdictSource::Rules,
        }
    }
}

/// Tier sentence, then red flags, then urgency factors.
pub fn compose_reason(tier: Tier, red_flags: &[String], urgent_signals: &[String]) -> String {
    let mut parts = vec![tier.summary().to_string()];
    if !red_flags.is_empty() {
        parts.push(format!("Red flags: {}.", red_flags.join(", ")));
    }
    if !urgent_signals.is_empty() {
        parts.push(format!("Urgency factors: {}.", urgent_signals.join(", ")));
    }
    parts.join(" ")
}

/// Evaluate with the default thresholds.
pub fn evaluate(complaint: &str, history: &str, vitals: &Vitals) -> TriageVerdict {
    RuleEngine::new().evaluate(complaint, history, vitals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals() -> Vitals {
        Vitals::default()
    }

    #[test]
    fn test_empty_input_is_planned() {
        let v = evaluate("", "", &vitals());
        assert_eq!(v.tier, Tier::Planned);
        assert!(v.red_flags.is_empty());
        assert!(v.urgent_signals.is_empty());
        assert_eq!(v.confidence, 0.72);
        assert_eq!(v.reason, "No acute signs; condition stable.");
    }

    #[test]
    fn test_one_label_per_text_category() {
        let v = evaluate("bleeding from the nose, heavy bleeding, hemorrhage", "", &vitals());
        assert_eq!(v.red_flags, vec!["massive bleeding".to_string()]);
        assert_eq!(v.tier, Tier::Critical);
    }

    #[test]
    fn test_dyspnea_alone_is_urgent() {
        let v = evaluate("shortness of breath on stairs", "", &vitals());
        assert_eq!(v.tier, Tier::Urgent);
        assert_eq!(v.red_flags, vec!["dyspnea".to_string()]);
        assert_eq!(v.confidence, 0.82);
    }

    #[test]
    fn test_chest_pain_without_spo2_is_not_critical() {
        let v = evaluate("chest pain after exercise", "", &vitals());
        assert_eq!(v.tier, Tier::Planned);
        assert_eq!(v.red_flags, vec!["chest pain".to_string()]);
    }

    #[test]
    fn test_chest_pain_with_normal_spo2() {
        let v = evaluate("chest pain", "", &Vitals { spo2: Some(97.0), ..vitals() });
        assert_eq!(v.tier, Tier::Planned);
    }

    #[test]
    fn test_rr_and_gcs_label_without_forcing_critical() {
        let v = evaluate("", "", &Vitals { rr: Some(32.0), gcs: Some(11.0), ..vitals() });
        assert_eq!(v.red_flags, vec!["RR > 30".to_string(), "GCS < 13".to_string()]);
        assert_eq!(v.tier, Tier::Planned);
    }

    #[test]
    fn test_diastolic_alone_triggers_crisis() {
        let v = evaluate("", "", &Vitals { systolic: Some(170.0), diastolic: Some(125.0), ..vitals() });
        assert_eq!(v.tier, Tier::Critical);
        assert_eq!(v.red_flags, vec!["BP ≥ 220/120".to_string()]);
    }

    #[test]
    fn test_comorbid_fever_needs_both() {
        let febrile = Vitals { temp: Some(38.2), ..vitals() };
        assert_eq!(evaluate("cough", "", &febrile).tier, Tier::Planned);
        let v = evaluate("cough", "type 2 diabetes", &febrile);
        assert_eq!(v.tier, Tier::Urgent);
        assert_eq!(v.urgent_signals, vec!["comorbidity + fever".to_string()]);
    }

    #[test]
    fn test_spo2_band_edges() {
        let at_92 = evaluate("", "", &Vitals { spo2: Some(92.0), ..vitals() });
        assert_eq!(at_92.tier, Tier::Urgent);
        let at_94 = evaluate("", "", &Vitals { spo2: Some(94.0), ..vitals() });
        assert_eq!(at_94.tier, Tier::Planned);
    }

    #[test]
    fn test_reason_order() {
        let v = evaluate(
            "chest pressure",
            "",
            &Vitals { spo2: Some(93.0), hr: Some(120.0), ..vitals() },
        );
        assert_eq!(
            v.reason,
            "Critical risk signs detected. Red flags: chest pain. Urgency factors: SpO₂ 92–94%, HR ≥ 110."
        );
    }

    #[test]
    fn test_russian_complaint() {
        let v = evaluate("Сильная давящая боль за грудиной 20 минут", "", &Vitals { spo2: Some(92.0), ..vitals() });
        assert_eq!(v.tier, Tier::Critical);
        assert!(v.red_flags.contains(&"chest pain".to_string()));
    }

    #[test]
    fn test_custom_thresholds_relabel() {
        let engine = RuleEngine::with_thresholds(VitalThresholds { spo2_red: 90.0, ..Default::default() });
        let v = engine.evaluate("", "", &Vitals { spo2: Some(89.0), ..vitals() });
        assert_eq!(v.red_flags, vec!["SpO₂ < 90%".to_string()]);
    }
}
