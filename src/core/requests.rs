//! Inputs of the five bridge operations.
//!
//! Each request is constructed with `new` from its required inputs; the
//! remaining public fields start at their documented defaults and can be
//! overridden with struct update syntax.

use crate::core::schema::{Subtask, Task, TaskPriority};

/// Default number of tasks requested from a PRD.
pub const DEFAULT_NUM_TASKS: u32 = 10;
/// Default number of subtasks requested per expansion.
pub const DEFAULT_NUM_SUBTASKS: u32 = 3;
/// Default complexity score at which expansion is recommended.
pub const DEFAULT_COMPLEXITY_THRESHOLD: u8 = 5;

/// Break a product requirements document into tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateTasksRequest {
    /// Full PRD text.
    pub prd_content: String,
    /// Where the PRD came from; echoed into the result metadata.
    pub source_file: String,
    /// Approximate number of top-level tasks. Zero lets the model decide.
    pub num_tasks: u32,
    /// Id of the first generated task.
    pub next_id: u32,
    pub research: bool,
    pub project_name: Option<String>,
}

impl GenerateTasksRequest {
    #[must_use]
    pub fn new(prd_content: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            prd_content: prd_content.into(),
            source_file: source_file.into(),
            num_tasks: DEFAULT_NUM_TASKS,
            next_id: 1,
            research: false,
            project_name: None,
        }
    }
}

/// Break one task into subtasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandTaskRequest {
    pub task: Task,
    pub num_subtasks: u32,
    /// Id of the first generated subtask.
    pub next_subtask_id: u32,
    /// Free-form guidance appended to the prompt; empty for none.
    pub additional_context: String,
    pub research: bool,
}

impl ExpandTaskRequest {
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self {
            task,
            num_subtasks: DEFAULT_NUM_SUBTASKS,
            next_subtask_id: 1,
            additional_context: String::new(),
            research: false,
        }
    }
}

/// Create a single task from a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskRequest {
    pub prompt: String,
    /// Id the new task must carry.
    pub new_task_id: u32,
    /// Tasks that already exist, shown to the model as context.
    pub existing_tasks: Vec<Task>,
    /// Dependencies the caller wants on the new task.
    pub dependencies: Vec<u32>,
    pub priority: TaskPriority,
    pub research: bool,
}

impl AddTaskRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, new_task_id: u32) -> Self {
        Self {
            prompt: prompt.into(),
            new_task_id,
            existing_tasks: Vec::new(),
            dependencies: Vec::new(),
            priority: TaskPriority::Medium,
            research: false,
        }
    }
}

/// Score the complexity of a set of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeComplexityRequest {
    pub tasks: Vec<Task>,
    /// Score at or above which a task should be expanded.
    pub threshold: u8,
    pub research: bool,
}

impl AnalyzeComplexityRequest {
    #[must_use]
    pub const fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            threshold: DEFAULT_COMPLEXITY_THRESHOLD,
            research: false,
        }
    }
}

/// Produce text to append to a subtask's details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubtaskRequest {
    pub parent_task: Option<Task>,
    pub subtask: Subtask,
    pub update_prompt: String,
    pub research: bool,
}

impl UpdateSubtaskRequest {
    #[must_use]
    pub fn new(subtask: Subtask, update_prompt: impl Into<String>) -> Self {
        Self {
            parent_task: None,
            subtask,
            update_prompt: update_prompt.into(),
            research: false,
        }
    }
}
