//! Triage prompt construction and JSON extraction from model replies.

use std::sync::LazyLock;

use regex::Regex;

use crate::backend::{LlmError, LlmRequest, Message};
use crate::wire::ClassifyRequest;

const SYSTEM_PROMPT: &str = "\
You are a medical TRIAGE assistant. From the complaint, history and vital signs \
produce STRICTLY valid JSON with the keys: priority, reason, hint_for_doctor, profile, \
confidence, red_flags, sources. Give only the priority and its reasons, no diagnoses.\n\
Priority rules:\n\
- \"критично срочно\": threat to life or severe red flags (respiratory distress, SpO2 < 94%, \
chest pain lasting > 10 min, neurological deficit, hypotension < 90, reduced consciousness, etc.).\n\
- \"срочно\": potentially dangerous but without immediate red flags.\n\
- \"планово\": stable condition, no red flags.\n\
Choose \"profile\" from: therapy, surgery, pediatrics, trauma, neuro, other.";

const REPLY_TEMPLATE: &str = r#"Answer with JSON only, no extra text. Example structure:
{
  "priority": "критично срочно",
  "reason": "…",
  "hint_for_doctor": "…",
  "profile": "therapy",
  "confidence": 0.85,
  "red_flags": ["…", "…"],
  "sources": [ { "id": "doc_cardio_01", "section": "1", "version_date": "2025-05-12" } ]
}
If unsure, lower the confidence but keep the JSON schema."#;

/// First `{` to last `}`, across newlines.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json block pattern"));

/// Build the two-message completion request for one patient.
pub fn triage_request(input: &ClassifyRequest, temperature: f32, max_tokens: u32) -> LlmRequest {
    let vitals = match &input.vitals {
        Some(v) => serde_json::to_string(v).unwrap_or_else(|_| "null".to_string()),
        None    => "null".to_string(),
    };
    let user = format!(
        "INPUT:\ncomplaint: {}\nhistory: {}\nvitals: {}\n\n{}",
        input.complaint, input.history, vitals, REPLY_TEMPLATE
    );

    LlmRequest {
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
        model: None,
        max_tokens: Some(max_tokens),
        temperature: Some(temperature),
    }
}

/// Parse the reply as JSON, or failing that the outermost `{…}` block in it.
pub fn extract_json(text: &str) -> Result<serde_json::Value, LlmError> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }
    let block = JSON_BLOCK
        .find(text)
        .ok_or_else(|| LlmError::UnparsableReply(text.to_string()))?;
    Ok(serde_json::from_str(block.as_str())?)
}
