//! Core bridge logic: process execution, response parsing and validation.

pub mod bridge;
pub mod cli_check;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod extract;
pub mod phase;
pub mod prompts;
pub mod requests;
pub mod schema;
pub mod text;

#[cfg(test)]
mod test_support;

pub use bridge::{BridgeSettings, OperationResponse, OperationTimeouts, TaskBridge, Telemetry};
pub use cli_check::{AvailabilityProbe, CommandResolution, is_safe_command_name, resolve_cli_command};
pub use envelope::{ResponseEnvelope, parse_envelope, parse_result_text};
pub use error::{BridgeError, ProbeFailure, ValidationError};
pub use executor::{CliProcessExecutor, Invocation, Launcher, ProcessRunner};
pub use extract::{ExtractedDocument, ExtractionStrategy, extract};
pub use phase::{CallPhase, CallTrace};
pub use prompts::{DefaultPrompts, PromptPair, PromptSource};
pub use requests::{
    AddTaskRequest, AnalyzeComplexityRequest, ExpandTaskRequest, GenerateTasksRequest,
    UpdateSubtaskRequest,
};
pub use schema::{
    ComplexityEntry, ComplexityReport, GenerationMetadata, Subtask, SubtaskSet, Task,
    TaskPriority, TaskSet, TaskStatus, ValidatedResult, validate,
};

/// Operations the bridge can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Break a PRD into a task set.
    GenerateTasks,
    /// Break a task into subtasks.
    ExpandTask,
    /// Create one task from a description.
    AddTask,
    /// Score task complexity.
    AnalyzeComplexity,
    /// Produce text appended to a subtask.
    UpdateSubtask,
}

impl Operation {
    /// Returns the name used in logs and traces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GenerateTasks => "generate-tasks",
            Self::ExpandTask => "expand-task",
            Self::AddTask => "add-task",
            Self::AnalyzeComplexity => "analyze-complexity",
            Self::UpdateSubtask => "update-subtask",
        }
    }

    /// Returns a short description of the operation.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::GenerateTasks => "Generate tasks from a PRD",
            Self::ExpandTask => "Expand a task into subtasks",
            Self::AddTask => "Add a single task",
            Self::AnalyzeComplexity => "Analyze task complexity",
            Self::UpdateSubtask => "Update subtask details",
        }
    }

    /// Returns all operations.
    #[must_use]
    pub const fn all() -> &'static [Operation] {
        &[
            Operation::GenerateTasks,
            Operation::ExpandTask,
            Operation::AddTask,
            Operation::AnalyzeComplexity,
            Operation::UpdateSubtask,
        ]
    }
}
