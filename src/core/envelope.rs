//! Decoding of the tool's JSON response envelope.
//!
//! With `--output-format json` the tool prints exactly one object:
//!
//! ```json
//! {"type":"result","subtype":"success","cost_usd":0.01,"is_error":false,
//!  "duration_ms":4210,"result":"...","session_id":"..."}
//! ```
//!
//! Exit code 0 only means the process ran; `is_error` is the tool's own
//! verdict. Cost, duration and session id are diagnostics: missing or
//! malformed values become `None` and never fail a call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::core::error::BridgeError;
use crate::core::text::truncate_preview;

/// Maximum characters of raw output kept in an envelope error.
pub const MAX_RAW_PREVIEW: usize = 500;

/// The single JSON object the tool prints on stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Envelope kind; `result` for final answers.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Outcome tag such as `success` or `error_max_turns`.
    #[serde(default, deserialize_with = "lenient")]
    pub subtype: Option<String>,
    /// Reported cost of the call in US dollars.
    #[serde(default, alias = "total_cost_usd", deserialize_with = "lenient")]
    pub cost_usd: Option<f64>,
    /// Tool-level failure flag.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_error: bool,
    /// Tool-reported wall time in milliseconds.
    #[serde(default, deserialize_with = "lenient")]
    pub duration_ms: Option<f64>,
    /// The model's answer, or a failure description when `is_error` is set.
    #[serde(default, deserialize_with = "lenient")]
    pub result: Option<String>,
    /// Session identifier assigned by the tool.
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: Option<String>,
}

impl ResponseEnvelope {
    /// Returns the result text, or an empty string when absent.
    #[must_use]
    pub fn result_text(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }
}

/// Accepts any JSON value and keeps it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, bool>(deserializer)?.unwrap_or(false))
}

/// Decodes `raw` into an envelope that carries usable result text.
///
/// # Errors
///
/// - [`BridgeError::Envelope`] if `raw` is not a JSON object, or the result is missing or empty.
/// - [`BridgeError::Tool`] if the envelope's `is_error` flag is set.
pub fn parse_envelope(raw: &str) -> Result<ResponseEnvelope, BridgeError> {
    let trimmed = raw.trim();
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| BridgeError::Envelope {
            reason: format!("output is not valid JSON ({e})"),
            raw: truncate_preview(trimmed, MAX_RAW_PREVIEW),
        })?;

    if !value.is_object() {
        return Err(BridgeError::Envelope {
            reason: "output is not a JSON object".to_string(),
            raw: truncate_preview(trimmed, MAX_RAW_PREVIEW),
        });
    }

    let envelope: ResponseEnvelope =
        serde_json::from_value(value).map_err(|e| BridgeError::Envelope {
            reason: e.to_string(),
            raw: truncate_preview(trimmed, MAX_RAW_PREVIEW),
        })?;

    debug!(
        subtype = envelope.subtype.as_deref(),
        is_error = envelope.is_error,
        cost_usd = envelope.cost_usd,
        duration_ms = envelope.duration_ms,
        session_id = envelope.session_id.as_deref(),
        "decoded response envelope"
    );

    if envelope.is_error {
        let message = match envelope.result.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => "the tool reported an error without a description".to_string(),
        };
        return Err(BridgeError::Tool { message });
    }

    if envelope.result_text().is_empty() {
        return Err(BridgeError::Envelope {
            reason: "no result content".to_string(),
            raw: truncate_preview(trimmed, MAX_RAW_PREVIEW),
        });
    }

    Ok(envelope)
}

/// Decodes `raw` and returns only the result text.
///
/// # Errors
///
/// Same as [`parse_envelope`].
pub fn parse_result_text(raw: &str) -> Result<String, BridgeError> {
    parse_envelope(raw).map(|envelope| envelope.result.unwrap_or_default())
}
