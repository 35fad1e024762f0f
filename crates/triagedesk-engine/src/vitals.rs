//! Vital-sign parsing.
//!
//! Turns operator-entered text into typed values. Anything that does not
//! parse becomes `None`; nothing here returns an error or a sentinel.

use std::sync::LazyLock;

use regex::Regex;
use triagedesk_common::{RawVitals, Vitals};

/// `SYS/DIA` or `SYS-DIA`, two or three digits each.
static BP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{2,3})\s*[/-]\s*(\d{2,3})\s*$").expect("blood pressure pattern")
});

/// Parse a blood-pressure string into (systolic, diastolic).
/// Both components are `None` unless the whole string matches.
pub fn parse_bp(text: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(caps) = text.and_then(|t| BP_PATTERN.captures(t)) else {
        return (None, None);
    };
    let sys = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
    let dia = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
    match (sys, dia) {
        (Some(s), Some(d)) => (Some(s), Some(d)),
        _ => (None, None),
    }
}

/// Parse a decimal number, accepting either comma or dot as separator.
/// Blank, malformed and non-finite input yields `None`.
pub fn parse_number(text: Option<&str>) -> Option<f64> {
    let trimmed = text?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse an age in whole years. Fractions are truncated, negatives rejected.
pub fn parse_age(text: Option<&str>) -> Option<u32> {
    parse_number(text)
        .filter(|v| *v >= 0.0 && *v < u32::MAX as f64)
        .map(|v| v.trunc() as u32)
}

/// Parse every raw vital field. Pure and idempotent.
pub fn parse_vitals(raw: &RawVitals) -> Vitals {
    let (systolic, diastolic) = parse_bp(raw.bp.as_deref());
    Vitals {
        systolic,
        diastolic,
        hr:   parse_number(raw.hr.as_deref()),
        spo2: parse_number(raw.spo2.as_deref()),
        temp: parse_number(raw.temp.as_deref()),
        rr:   parse_number(raw.rr.as_deref()),
        gcs:  parse_number(raw.gcs.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bp_slash_and_dash() {
        assert_eq!(parse_bp(Some("180/110")), (Some(180.0), Some(110.0)));
        assert_eq!(parse_bp(Some(" 120 - 80 ")), (Some(120.0), Some(80.0)));
    }

    #[test]
    fn test_bp_rejects_other_shapes() {
        assert_eq!(parse_bp(Some("120")), (None, None));
        assert_eq!(parse_bp(Some("1200/80")), (None, None));
        assert_eq!(parse_bp(Some("120/8")), (None, None));
        assert_eq!(parse_bp(Some("high")), (None, None));
        assert_eq!(parse_bp(Some("120/80 mmHg")), (None, None));
        assert_eq!(parse_bp(None), (None, None));
    }

    #[test]
    fn test_number_accepts_comma_decimal() {
        assert_eq!(parse_number(Some("38,6")), Some(38.6));
        assert_eq!(parse_number(Some(" 36.6 ")), Some(36.6));
        assert_eq!(parse_number(Some("98")), Some(98.0));
    }

    #[test]
    fn test_number_rejects_garbage() {
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_age() {
        assert_eq!(parse_age(Some("58")), Some(58));
        assert_eq!(parse_age(Some("7,5")), Some(7));
        assert_eq!(parse_age(Some("-3")), None);
    }

    #[test]
    fn test_parse_vitals_is_idempotent() {
        let raw = RawVitals {
            bp: Some("130/85".to_string()),
            spo2: Some("94".to_string()),
            temp: Some("abc".to_string()),
            ..Default::default()
        };
        let first = parse_vitals(&raw);
        assert_eq!(first, parse_vitals(&raw));
        assert_eq!(first.systolic, Some(130.0));
        assert_eq!(first.spo2, Some(94.0));
        assert_eq!(first.temp, None);
        assert_eq!(first.hr, None);
    }
}
