//! Per-call state machine of the bridge.
//!
//! ```text
//! Idle -> Probing -> {Unavailable | Available} -> Executing
//!      -> {TimedOut | ProcessFailed | SpawnFailed} -> Parsing
//!      -> {EnvelopeInvalid | ToolReportedError} -> Extracting
//!      -> {ExtractionFailed} -> Validating -> {ValidationFailed | Done}
//! ```

use std::fmt;

/// Phases a single bridge call moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Call constructed, nothing done yet.
    Idle,
    /// Confirming the executable is installed and responsive.
    Probing,
    /// The probe failed.
    Unavailable,
    /// The probe succeeded (or a cached success was reused).
    Available,
    /// The executable is running.
    Executing,
    /// The deadline expired and the process was killed.
    TimedOut,
    /// The process exited unsuccessfully.
    ProcessFailed,
    /// The process could not be started.
    SpawnFailed,
    /// Decoding the response envelope.
    Parsing,
    /// The output was not a usable envelope.
    EnvelopeInvalid,
    /// The envelope carried a tool-level error.
    ToolReportedError,
    /// Recovering a JSON document from the result text.
    Extracting,
    /// No extraction strategy succeeded.
    ExtractionFailed,
    /// Checking the document against the operation schema.
    Validating,
    /// The document failed the schema.
    ValidationFailed,
    /// A validated result is ready.
    Done,
}

impl CallPhase {
    /// Returns a human-readable description of the phase.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Probing => "Checking executable availability",
            Self::Unavailable => "Executable unavailable",
            Self::Available => "Executable available",
            Self::Executing => "Running executable",
            Self::TimedOut => "Timed out",
            Self::ProcessFailed => "Process failed",
            Self::SpawnFailed => "Could not start process",
            Self::Parsing => "Parsing response envelope",
            Self::EnvelopeInvalid => "Invalid response envelope",
            Self::ToolReportedError => "Tool reported an error",
            Self::Extracting => "Extracting JSON content",
            Self::ExtractionFailed => "No JSON content found",
            Self::Validating => "Validating against schema",
            Self::ValidationFailed => "Schema validation failed",
            Self::Done => "Done",
        }
    }

    /// Returns true if no further transition can happen.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.is_failure() || matches!(self, Self::Done)
    }

    /// Returns true if the phase is a terminal failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable
                | Self::TimedOut
                | Self::ProcessFailed
                | Self::SpawnFailed
                | Self::EnvelopeInvalid
                | Self::ToolReportedError
                | Self::ExtractionFailed
                | Self::ValidationFailed
        )
    }

    /// Returns true if `next` is a legal successor of this phase.
    #[must_use]
    pub const fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Probing)
                | (Self::Probing, Self::Unavailable | Self::Available)
                | (Self::Available, Self::Executing)
                | (
                    Self::Executing,
                    Self::TimedOut | Self::ProcessFailed | Self::SpawnFailed | Self::Parsing
                )
                | (
                    Self::Parsing,
                    Self::EnvelopeInvalid | Self::ToolReportedError | Self::Extracting | Self::Done
                )
                | (Self::Extracting, Self::ExtractionFailed | Self::Validating)
                | (Self::Validating, Self::ValidationFailed | Self::Done)
        )
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Ordered record of the phases one call went through.
///
/// Illegal transitions are ignored and logged; the trace only ever holds a
/// valid path through the state machine.
#[derive(Debug, Clone)]
pub struct CallTrace {
    operation: &'static str,
    phases: Vec<CallPhase>,
}

impl CallTrace {
    /// Starts a trace in [`CallPhase::Idle`].
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            phases: vec![CallPhase::Idle],
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn current(&self) -> CallPhase {
        self.phases.last().copied().unwrap_or(CallPhase::Idle)
    }

    /// Returns all phases visited so far, oldest first.
    #[must_use]
    pub fn phases(&self) -> &[CallPhase] {
        &self.phases
    }

    /// Moves to `next` if the transition is legal.
    pub fn advance(&mut self, next: CallPhase) {
        let current = self.current();
        if current.can_advance_to(next) {
            tracing::debug!(operation = self.operation, from = %current, to = %next, "phase transition");
            self.phases.push(next);
        } else {
            tracing::warn!(operation = self.operation, from = %current, to = %next, "ignored illegal phase transition");
        }
    }
}
