//! Diagnosis record and normalization of the model's reply.
//!
//! The hosted model is asked for a bare JSON object but frequently wraps it
//! in markdown code fences or stray whitespace. Fence stripping is a small
//! pre-parse step kept separate from JSON parsing so it stays independently
//! testable; parsing itself is strict — a reply that does not carry exactly
//! the three expected string fields is surfaced as an error, never silently
//! defaulted.

use serde::{Deserialize, Serialize};

/// Wire keys kept short for client compatibility (`v`/`d`/`t`); both the
/// analysis prompt and the report endpoint use the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Name of the plant or vegetable identified.
    #[serde(rename = "v")]
    pub subject: String,
    /// Disease name, or a healthy/none sentinel.
    #[serde(rename = "d")]
    pub condition: String,
    /// Free-form treatment/advice text.
    #[serde(rename = "t")]
    pub advice: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("model reply is not valid JSON: {0}")]
    JsonParsing(String),
    #[error("model reply is malformed: {0}")]
    MalformedReply(String),
}

/// Strip surrounding markdown code fences from a model reply.
///
/// Removes a leading ``` fence (with or without a language tag) and a
/// trailing ``` fence, plus surrounding whitespace. Text without fences
/// passes through trimmed, so the function is idempotent.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // The fence line may carry a language tag (```json).
        text = rest
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim_start();
    }
    if let Some(body) = text.strip_suffix("```") {
        text = body.trim_end();
    }
    text
}

/// Parse a raw model reply into a [`Diagnosis`].
///
/// The cleaned text must be a JSON object with exactly the keys `v`, `d`
/// and `t`, all strings. Anything else — prose, missing keys, extra keys,
/// non-string values — is an error the caller surfaces upstream.
pub fn parse_diagnosis(raw: &str) -> Result<Diagnosis, DiagnosisError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| DiagnosisError::JsonParsing(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| DiagnosisError::MalformedReply("reply is not a JSON object".into()))?;

    for key in object.keys() {
        if key != "v" && key != "d" && key != "t" {
            return Err(DiagnosisError::MalformedReply(format!(
                "unexpected key '{key}'"
            )));
        }
    }

    let field = |key: &str| -> Result<String, DiagnosisError> {
        object
            .get(key)
            .ok_or_else(|| DiagnosisError::MalformedReply(format!("missing key '{key}'")))?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DiagnosisError::MalformedReply(format!("key '{key}' is not a string")))
    };

    Ok(Diagnosis {
        subject: field("v")?,
        condition: field("d")?,
        advice: field("t")?,
    })
}
