//! Error taxonomy for the CLI bridge.
//!
//! Every failure a bridge call can end with is one [`BridgeError`] variant.
//! Variants carry enough context to diagnose the failure without re-running
//! the call: exit codes, captured stderr, truncated raw output, or the path of
//! the offending field.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::core::phase::CallPhase;

/// Why the availability probe decided the executable cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The executable does not exist at the resolved location.
    NotFound,
    /// The executable exists but could not be executed.
    PermissionDenied,
    /// The version query did not answer within the probe deadline.
    TimedOut,
    /// The version query ran but exited unsuccessfully.
    ExitedWith(Option<i32>),
    /// Any other failure to start the version query.
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("executable not found"),
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::TimedOut => f.write_str("version check timed out"),
            Self::ExitedWith(Some(code)) => write!(f, "version check exited with code {code}"),
            Self::ExitedWith(None) => f.write_str("version check was terminated by a signal"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// A document failed the schema of the requested operation.
///
/// `field` is a path into the document such as `tasks[2].priority`; an empty
/// path refers to the document root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {constraint}", field_label(.field))]
pub struct ValidationError {
    /// Path of the first offending field.
    pub field: String,
    /// The constraint the field violated.
    pub constraint: String,
}

impl ValidationError {
    /// Creates a validation error for the given field path.
    #[must_use]
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

/// Every way a bridge call can fail.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The executable is missing or unresponsive.
    #[error("{executable} is not available: {cause}")]
    Unavailable {
        executable: String,
        cause: ProbeFailure,
    },

    /// The process could not be started.
    #[error("failed to start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    /// The process did not exit before the deadline and was killed.
    #[error("{executable} did not finish within {deadline_ms}ms and was killed")]
    Timeout { executable: String, deadline_ms: u128 },

    /// The process exited unsuccessfully.
    #[error("{executable} exited with {}: {}", exit_label(.code.as_ref()), stderr_label(.stderr))]
    Process {
        executable: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The output was not a usable response envelope.
    #[error("invalid response envelope: {reason} (raw output: {raw})")]
    Envelope { reason: String, raw: String },

    /// The envelope reported a tool-level failure.
    #[error("tool reported an error: {message}")]
    Tool { message: String },

    /// No extraction strategy recovered a JSON document.
    #[error("no JSON document found in response (preview: {preview})")]
    Extraction { preview: String },

    /// The recovered document failed the operation's schema.
    #[error("response failed validation: {0}")]
    Validation(#[from] ValidationError),
}

fn field_label(field: &str) -> &str {
    if field.is_empty() { "document" } else { field }
}

fn exit_label(code: Option<&i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
}

fn stderr_label(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.is_empty() { "<no stderr>" } else { trimmed }
}

impl BridgeError {
    /// Returns the terminal phase a call ends in when it fails with this error.
    #[must_use]
    pub const fn terminal_phase(&self) -> CallPhase {
        match self {
            Self::Unavailable { .. } => CallPhase::Unavailable,
            Self::Spawn { .. } => CallPhase::SpawnFailed,
            Self::Timeout { .. } => CallPhase::TimedOut,
            Self::Process { .. } => CallPhase::ProcessFailed,
            Self::Envelope { .. } => CallPhase::EnvelopeInvalid,
            Self::Tool { .. } => CallPhase::ToolReportedError,
            Self::Extraction { .. } => CallPhase::ExtractionFailed,
            Self::Validation(_) => CallPhase::ValidationFailed,
        }
    }
}
