//! Confidence values reported alongside a verdict.
//!
//! The rule engine does not model probability: each tier carries a fixed
//! constant. Remote verdicts bring their own number, which is clamped.

pub const CRITICAL_CONFIDENCE: f64 = 0.93;
pub const URGENT_CONFIDENCE: f64   = 0.82;
pub const PLANNED_CONFIDENCE: f64  = 0.72;

/// Used when a remote reply omits confidence or sends something non-numeric.
pub const REMOTE_DEFAULT_CONFIDENCE: f64 = 0.7;

/// Clamp to [0.0, 1.0]; NaN becomes the remote default.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return REMOTE_DEFAULT_CONFIDENCE;
    }
    value.clamp(0.0, 1.0)
}

/// Read a confidence from an arbitrary JSON value.
/// Numbers and numeric strings are accepted; anything else falls back to 0.7.
pub fn confidence_from_json(value: Option<&serde_json::Value>) -> f64 {
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
        .map(clamp_confidence)
        .unwrap_or(REMOTE_DEFAULT_CONFIDENCE)
}
