//! The operation facade.
//!
//! [`TaskBridge`] turns an operation request into a validated result:
//!
//! ```text
//! probe ─▶ prompts ─▶ execute ─▶ envelope ─▶ extract ─▶ validate
//! ```
//!
//! Every stage can end the call with a [`BridgeError`]; errors are returned
//! unchanged and never retried here. A bridge is `Send + Sync` and its
//! operations take `&self`, so independent calls may run concurrently. The
//! availability outcome is the only state shared between calls.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::core::Operation;
use crate::core::cli_check::AvailabilityProbe;
use crate::core::envelope::{ResponseEnvelope, parse_envelope};
use crate::core::error::{BridgeError, ValidationError};
use crate::core::executor::{Invocation, ProcessRunner};
use crate::core::extract::{ExtractionStrategy, extract};
use crate::core::phase::{CallPhase, CallTrace};
use crate::core::prompts::{DefaultPrompts, PromptPair, PromptSource};
use crate::core::requests::{
    AddTaskRequest, AnalyzeComplexityRequest, ExpandTaskRequest, GenerateTasksRequest,
    UpdateSubtaskRequest,
};
use crate::core::schema::{
    ComplexityReport, SubtaskSet, Task, TaskSet, validate_complexity_report, validate_subtask_set,
    validate_task, validate_task_set,
};

/// Per-operation deadlines in milliseconds. Non-positive values mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationTimeouts {
    pub generate_tasks_ms: i64,
    pub expand_task_ms: i64,
    pub add_task_ms: i64,
    pub analyze_complexity_ms: i64,
    pub update_subtask_ms: i64,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            generate_tasks_ms: 300_000,
            expand_task_ms: 180_000,
            add_task_ms: 120_000,
            analyze_complexity_ms: 300_000,
            update_subtask_ms: 120_000,
        }
    }
}

impl OperationTimeouts {
    /// Uses the same deadline for every operation.
    #[must_use]
    pub const fn uniform(ms: i64) -> Self {
        Self {
            generate_tasks_ms: ms,
            expand_task_ms: ms,
            add_task_ms: ms,
            analyze_complexity_ms: ms,
            update_subtask_ms: ms,
        }
    }

    /// Returns the deadline of `operation`.
    #[must_use]
    pub const fn for_operation(&self, operation: Operation) -> i64 {
        match operation {
            Operation::GenerateTasks => self.generate_tasks_ms,
            Operation::ExpandTask => self.expand_task_ms,
            Operation::AddTask => self.add_task_ms,
            Operation::AnalyzeComplexity => self.analyze_complexity_ms,
            Operation::UpdateSubtask => self.update_subtask_ms,
        }
    }
}

/// Invocation settings applied to every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Passed as `--model` when set and non-empty.
    pub model: Option<String>,
    /// Arguments inserted before the system prompt.
    pub extra_args: Vec<String>,
    pub timeouts: OperationTimeouts,
}

/// Diagnostics of one successful call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    /// Cost reported by the tool, in US dollars.
    pub cost_usd: Option<f64>,
    /// Duration reported by the tool.
    pub duration_ms: Option<f64>,
    pub session_id: Option<String>,
    /// Wall time measured by the bridge, probe included.
    pub elapsed_ms: u64,
    /// Extraction strategy that recovered the document; `None` for text results.
    pub strategy: Option<ExtractionStrategy>,
}

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResponse<T> {
    pub success: bool,
    pub data: T,
    pub telemetry: Telemetry,
}

/// Drives the AI CLI for the task operations.
pub struct TaskBridge {
    runner: Box<dyn ProcessRunner>,
    prompts: Box<dyn PromptSource>,
    probe: AvailabilityProbe,
    settings: BridgeSettings,
}

impl TaskBridge {
    /// Creates a bridge with the default prompts and settings.
    #[must_use]
    pub fn new(runner: impl ProcessRunner + 'static) -> Self {
        Self {
            runner: Box::new(runner),
            prompts: Box::new(DefaultPrompts::new()),
            probe: AvailabilityProbe::default(),
            settings: BridgeSettings::default(),
        }
    }

    /// Replaces the prompt source.
    #[must_use]
    pub fn with_prompts(mut self, prompts: impl PromptSource + 'static) -> Self {
        self.prompts = Box::new(prompts);
        self
    }

    /// Replaces the invocation settings.
    #[must_use]
    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Returns the availability probe, e.g. to reset its cached outcome.
    #[must_use]
    pub const fn probe(&self) -> &AvailabilityProbe {
        &self.probe
    }

    /// Returns the printable name of the executable.
    #[must_use]
    pub fn executable(&self) -> String {
        self.runner.executable()
    }

    /// Checks that the executable is installed and responsive.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unavailable`] when it is not.
    pub async fn check_availability(&self) -> Result<(), BridgeError> {
        self.probe.check(self.runner.as_ref()).await
    }

    /// Breaks a PRD into a task set.
    ///
    /// # Errors
    ///
    /// Returns the first [`BridgeError`] of the pipeline.
    pub async fn generate_tasks(
        &self,
        request: &GenerateTasksRequest,
    ) -> Result<OperationResponse<TaskSet>, BridgeError> {
        let prompt = self.prompts.generate_tasks(request);
        self.call_json(Operation::GenerateTasks, &prompt, validate_task_set)
            .await
    }

    /// Breaks a task into subtasks.
    ///
    /// # Errors
    ///
    /// Returns the first [`BridgeError`] of the pipeline.
    pub async fn expand_task(
        &self,
        request: &ExpandTaskRequest,
    ) -> Result<OperationResponse<SubtaskSet>, BridgeError> {
        let prompt = self.prompts.expand_task(request);
        self.call_json(Operation::ExpandTask, &prompt, validate_subtask_set)
            .await
    }

    /// Creates a single task.
    ///
    /// # Errors
    ///
    /// Returns the first [`BridgeError`] of the pipeline.
    pub async fn add_task(
        &self,
        request: &AddTaskRequest,
    ) -> Result<OperationResponse<Task>, BridgeError> {
        let prompt = self.prompts.add_task(request);
        self.call_json(Operation::AddTask, &prompt, validate_task).await
    }

    /// Scores the complexity of tasks.
    ///
    /// # Errors
    ///
    /// Returns the first [`BridgeError`] of the pipeline.
    pub async fn analyze_complexity(
        &self,
        request: &AnalyzeComplexityRequest,
    ) -> Result<OperationResponse<ComplexityReport>, BridgeError> {
        let prompt = self.prompts.analyze_complexity(request);
        self.call_json(
            Operation::AnalyzeComplexity,
            &prompt,
            validate_complexity_report,
        )
        .await
    }

    /// Produces text to append to a subtask. The answer is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`BridgeError`] up to envelope parsing.
    pub async fn update_subtask(
        &self,
        request: &UpdateSubtaskRequest,
    ) -> Result<OperationResponse<String>, BridgeError> {
        let operation = Operation::UpdateSubtask;
        let prompt = self.prompts.update_subtask(request);
        let started = Instant::now();
        let mut trace = CallTrace::new(operation.name());

        let outcome = match self.invoke(operation, &prompt, &mut trace).await {
            Ok(envelope) => {
                trace.advance(CallPhase::Done);
                let text = envelope.result_text().to_string();
                Ok((envelope, text, None))
            }
            Err(err) => Err(err),
        };
        conclude(operation, trace, started, outcome)
    }

    /// Builds the invocation of `operation` for `prompt`.
    #[must_use]
    pub fn invocation(&self, operation: Operation, prompt: &PromptPair) -> Invocation {
        let mut args: Vec<String> = ["-p", "--output-format", "json"]
            .into_iter()
            .map(String::from)
            .collect();
        if let Some(model) = self.settings.model.as_deref().filter(|m| !m.is_empty()) {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        args.extend(self.settings.extra_args.iter().cloned());
        args.push(prompt.system.clone());

        Invocation::new(args)
            .with_input(prompt.user.clone())
            .with_deadline_ms(self.settings.timeouts.for_operation(operation))
    }

    async fn call_json<T>(
        &self,
        operation: Operation,
        prompt: &PromptPair,
        validate: fn(&Value) -> Result<T, ValidationError>,
    ) -> Result<OperationResponse<T>, BridgeError> {
        let started = Instant::now();
        let mut trace = CallTrace::new(operation.name());

        let outcome = async {
            let envelope = self.invoke(operation, prompt, &mut trace).await?;
            trace.advance(CallPhase::Extracting);
            let document = extract(envelope.result_text())?;
            trace.advance(CallPhase::Validating);
            let data = validate(&document.value)?;
            trace.advance(CallPhase::Done);
            Ok::<_, BridgeError>((envelope, data, Some(document.strategy)))
        }
        .await;

        conclude(operation, trace, started, outcome)
    }

    /// Runs the stages shared by every operation: probe, execute, parse.
    async fn invoke(
        &self,
        operation: Operation,
        prompt: &PromptPair,
        trace: &mut CallTrace,
    ) -> Result<ResponseEnvelope, BridgeError> {
        trace.advance(CallPhase::Probing);
        self.check_availability().await?;
        trace.advance(CallPhase::Available);

        let invocation = self.invocation(operation, prompt);
        info!(
            operation = operation.name(),
            executable = %self.runner.executable(),
            deadline_ms = invocation.deadline.map(millis),
            "invoking AI CLI"
        );
        trace.advance(CallPhase::Executing);
        let raw = self.runner.execute(&invocation).await?;

        trace.advance(CallPhase::Parsing);
        parse_envelope(&raw)
    }
}

type Outcome<T> = Result<(ResponseEnvelope, T, Option<ExtractionStrategy>), BridgeError>;

fn conclude<T>(
    operation: Operation,
    mut trace: CallTrace,
    started: Instant,
    outcome: Outcome<T>,
) -> Result<OperationResponse<T>, BridgeError> {
    let elapsed_ms = millis(started.elapsed());
    match outcome {
        Ok((envelope, data, strategy)) => {
            info!(
                operation = operation.name(),
                elapsed_ms,
                cost_usd = envelope.cost_usd,
                strategy = strategy.map(|s| s.name()),
                "operation completed"
            );
            Ok(OperationResponse {
                success: true,
                data,
                telemetry: Telemetry {
                    cost_usd: envelope.cost_usd,
                    duration_ms: envelope.duration_ms,
                    session_id: envelope.session_id,
                    elapsed_ms,
                    strategy,
                },
            })
        }
        Err(err) => {
            trace.advance(err.terminal_phase());
            warn!(
                operation = operation.name(),
                phase = %trace.current(),
                elapsed_ms,
                error = %err,
                "operation failed"
            );
            Err(err)
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
