//! Typed task data and the per-operation schemas.
//!
//! Validation walks the extracted JSON document field by field and stops at
//! the first violation, reporting its path (`tasks[3].priority`) and the
//! constraint. Optional fields receive their documented defaults; present
//! fields are never coerced. An explicit `null` counts as absent for optional
//! fields and as missing for required ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::Operation;
use crate::core::error::ValidationError;

/// Minimum characters of a subtask title.
pub const SUBTASK_TITLE_MIN: usize = 5;
/// Minimum characters of a subtask description.
pub const SUBTASK_DESCRIPTION_MIN: usize = 10;
/// Minimum characters of subtask implementation details.
pub const SUBTASK_DETAILS_MIN: usize = 20;
/// Inclusive bounds of a complexity score.
pub const COMPLEXITY_RANGE: (u64, u64) = (1, 10);

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// Task or subtask status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Review,
    Done,
    Deferred,
    Cancelled,
}

impl TaskStatus {
    const ALL: [Self; 6] = [
        Self::Pending,
        Self::InProgress,
        Self::Review,
        Self::Done,
        Self::Deferred,
        Self::Cancelled,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
            Self::Deferred => "deferred",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

/// A development task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub test_strategy: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Subtasks already attached to the task (task files only; never produced by validation).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
}

/// A subtask produced by task expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub details: String,
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub test_strategy: String,
}

/// Metadata the model attaches to a generated task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub project_name: String,
    pub total_tasks: u32,
    pub source_file: String,
    pub generated_at: String,
}

/// Result of task-set generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub metadata: GenerationMetadata,
}

/// Result of task expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskSet {
    pub subtasks: Vec<Subtask>,
}

/// Complexity assessment of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityEntry {
    pub task_id: u32,
    pub task_title: String,
    pub complexity_score: u8,
    pub recommended_subtasks: u32,
    pub expansion_prompt: String,
    pub reasoning: String,
}

/// Result of complexity analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplexityReport {
    pub entries: Vec<ComplexityEntry>,
}

/// A document that passed its operation's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedResult {
    TaskSet(TaskSet),
    SubtaskSet(SubtaskSet),
    SingleTask(Task),
    ComplexityReport(ComplexityReport),
    UpdateText(String),
}

/// Validates `document` against the schema of `operation`.
///
/// Subtask updates expect the raw answer text as a JSON string value.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(operation: Operation, document: &Value) -> Result<ValidatedResult, ValidationError> {
    match operation {
        Operation::GenerateTasks => validate_task_set(document).map(ValidatedResult::TaskSet),
        Operation::ExpandTask => validate_subtask_set(document).map(ValidatedResult::SubtaskSet),
        Operation::AddTask => validate_task(document).map(ValidatedResult::SingleTask),
        Operation::AnalyzeComplexity => {
            validate_complexity_report(document).map(ValidatedResult::ComplexityReport)
        }
        Operation::UpdateSubtask => document
            .as_str()
            .map(|text| ValidatedResult::UpdateText(text.to_string()))
            .ok_or_else(|| ValidationError::new("", "must be text")),
    }
}

/// Validates a generated task set.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_task_set(document: &Value) -> Result<TaskSet, ValidationError> {
    let root = Fields::object(document, String::new())?;
    let tasks = root
        .array("tasks")?
        .iter()
        .enumerate()
        .map(|(i, task)| task_at(task, format!("tasks[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let meta = Fields::object(root.required("metadata")?, root.path_of("metadata"))?;
    let metadata = GenerationMetadata {
        project_name: meta.string("projectName", 1)?,
        total_tasks: meta.count("totalTasks")?,
        source_file: meta.string("sourceFile", 1)?,
        generated_at: meta.string("generatedAt", 1)?,
    };

    Ok(TaskSet { tasks, metadata })
}

/// Validates a single task object.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_task(document: &Value) -> Result<Task, ValidationError> {
    task_at(document, String::new())
}

/// Validates the subtasks of a task expansion.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_subtask_set(document: &Value) -> Result<SubtaskSet, ValidationError> {
    let root = Fields::object(document, String::new())?;
    let subtasks = root
        .array("subtasks")?
        .iter()
        .enumerate()
        .map(|(i, subtask)| subtask_at(subtask, format!("subtasks[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SubtaskSet { subtasks })
}

/// Validates a complexity analysis array.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_complexity_report(document: &Value) -> Result<ComplexityReport, ValidationError> {
    let entries = document
        .as_array()
        .ok_or_else(|| ValidationError::new("", "must be an array"))?;

    let entries = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<ComplexityEntry, ValidationError> {
            let f = Fields::object(entry, format!("[{i}]"))?;
            let (low, high) = COMPLEXITY_RANGE;
            let score = f.integer_in("complexityScore", low, high)?;
            Ok(ComplexityEntry {
                task_id: f.positive_id("taskId")?,
                task_title: f.string("taskTitle", 1)?,
                complexity_score: u8::try_from(score)
                    .map_err(|_| f.error("complexityScore", "must fit in 0-255"))?,
                recommended_subtasks: f.positive_id("recommendedSubtasks")?,
                expansion_prompt: f.string("expansionPrompt", 1)?,
                reasoning: f.string("reasoning", 1)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ComplexityReport { entries })
}

fn task_at(value: &Value, path: String) -> Result<Task, ValidationError> {
    let f = Fields::object(value, path)?;
    Ok(Task {
        id: f.positive_id("id")?,
        title: f.string("title", 1)?,
        description: f.string("description", 1)?,
        details: f.optional_string("details")?,
        test_strategy: f.optional_string("testStrategy")?,
        priority: f.priority("priority")?,
        dependencies: f.ids("dependencies")?,
        status: f.status("status")?,
        subtasks: Vec::new(),
    })
}

fn subtask_at(value: &Value, path: String) -> Result<Subtask, ValidationError> {
    let f = Fields::object(value, path)?;
    Ok(Subtask {
        id: f.positive_id("id")?,
        title: f.string("title", SUBTASK_TITLE_MIN)?,
        description: f.string("description", SUBTASK_DESCRIPTION_MIN)?,
        details: f.string("details", SUBTASK_DETAILS_MIN)?,
        dependencies: f.ids("dependencies")?,
        status: f.status("status")?,
        test_strategy: f.optional_string("testStrategy")?,
    })
}

/// Field access on one JSON object with path-aware errors.
struct Fields<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn object(value: &'a Value, path: String) -> Result<Self, ValidationError> {
        match value.as_object() {
            Some(map) => Ok(Self { path, map }),
            None => Err(ValidationError::new(path, "must be an object")),
        }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn error(&self, key: &str, constraint: impl Into<String>) -> ValidationError {
        ValidationError::new(self.path_of(key), constraint)
    }

    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required(&self, key: &str) -> Result<&'a Value, ValidationError> {
        self.optional(key).ok_or_else(|| self.error(key, "is required"))
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>, ValidationError> {
        self.required(key)?
            .as_array()
            .ok_or_else(|| self.error(key, "must be an array"))
    }

    fn string(&self, key: &str, min_chars: usize) -> Result<String, ValidationError> {
        let text = self
            .required(key)?
            .as_str()
            .ok_or_else(|| self.error(key, "must be a string"))?;
        check_length(text, min_chars).map_err(|constraint| self.error(key, constraint))?;
        Ok(text.to_string())
    }

    fn optional_string(&self, key: &str) -> Result<String, ValidationError> {
        match self.optional(key) {
            None => Ok(String::new()),
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| self.error(key, "must be a string")),
        }
    }

    fn positive_id(&self, key: &str) -> Result<u32, ValidationError> {
        positive_u32(self.required(key)?).ok_or_else(|| self.error(key, "must be a positive integer"))
    }

    fn count(&self, key: &str) -> Result<u32, ValidationError> {
        self.required(key)?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.error(key, "must be a non-negative integer"))
    }

    fn integer_in(&self, key: &str, low: u64, high: u64) -> Result<u64, ValidationError> {
        self.required(key)?
            .as_u64()
            .filter(|n| (low..=high).contains(n))
            .ok_or_else(|| self.error(key, format!("must be an integer between {low} and {high}")))
    }

    fn ids(&self, key: &str) -> Result<Vec<u32>, ValidationError> {
        let Some(value) = self.optional(key) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.error(key, "must be an array of positive integers"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                positive_u32(item).ok_or_else(|| {
                    ValidationError::new(
                        format!("{}[{i}]", self.path_of(key)),
                        "must be a positive integer",
                    )
                })
            })
            .collect()
    }

    fn priority(&self, key: &str) -> Result<TaskPriority, ValidationError> {
        self.enumerated(key, TaskPriority::parse, &TaskPriority::ALL.map(|p| p.as_str()))
            .map(Option::unwrap_or_default)
    }

    fn status(&self, key: &str) -> Result<TaskStatus, ValidationError> {
        self.enumerated(key, TaskStatus::parse, &TaskStatus::ALL.map(|s| s.as_str()))
            .map(Option::unwrap_or_default)
    }

    fn enumerated<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Result<Option<T>, ValidationError> {
        let Some(value) = self.optional(key) else {
            return Ok(None);
        };
        value
            .as_str()
            .and_then(parse)
            .map(Some)
            .ok_or_else(|| self.error(key, format!("must be one of {}", allowed.join(", "))))
    }
}

fn positive_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn check_length(text: &str, min_chars: usize) -> Result<(), String> {
    if text.chars().count() >= min_chars {
        Ok(())
    } else if min_chars <= 1 {
        Err("must not be empty".to_string())
    } else {
        Err(format!("must be at least {min_chars} characters"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> Value {
        json!({
            "projectName": "Todo App",
            "totalTasks": 1,
            "sourceFile": "prd.txt",
            "generatedAt": "2026-10-19T12:00:00Z"
        })
    }

    fn subtask(title: &str) -> Value {
        json!({
            "id": 1,
            "title": title,
            "description": "Create the storage layer",
            "details": "Use SQLite with a single todos table."
        })
    }

    // =========================================================================
    // Task set
    // =========================================================================

    mod task_set {
        use super::*;

        /// Tests that omitted optional fields receive defaults.
        #[test]
        fn applies_defaults() -> anyhow::Result<()> {
            let doc = json!({
                "tasks": [{"id": 1, "title": "Setup", "description": "Init repo"}],
                "metadata": metadata()
            });
            let set = validate_task_set(&doc)?;
            let task = &set.tasks[0];
            assert!(task.dependencies.is_empty());
            assert_eq!(task.status, TaskStatus::Pending);
            assert_eq!(task.priority, TaskPriority::Medium);
            assert_eq!(task.details, "");
            assert_eq!(task.test_strategy, "");
            assert_eq!(set.metadata.project_name, "Todo App");
            Ok(())
        }

        /// Tests that explicit values are kept.
        #[test]
        fn keeps_explicit_values() -> anyhow::Result<()> {
            let doc = json!({
                "tasks": [{
                    "id": 2, "title": "API", "description": "Build API",
                    "details": "REST", "testStrategy": "Integration tests",
                    "priority": "high", "dependencies": [1], "status": "in-progress"
                }],
                "metadata": metadata()
            });
            let task = &validate_task_set(&doc)?.tasks[0];
            assert_eq!(task.priority, TaskPriority::High);
            assert_eq!(task.status, TaskStatus::InProgress);
            assert_eq!(task.dependencies, vec![1]);
            assert_eq!(task.test_strategy, "Integration tests");
            Ok(())
        }

        /// Tests that null optional fields count as absent.
        #[test]
        fn null_optional_fields_default() -> anyhow::Result<()> {
            let doc = json!({
                "tasks": [{"id": 1, "title": "Setup", "description": "Init", "details": null, "dependencies": null}],
                "metadata": metadata()
            });
            let task = &validate_task_set(&doc)?.tasks[0];
            assert_eq!(task.details, "");
            assert!(task.dependencies.is_empty());
            Ok(())
        }

        /// Tests the first offending field is reported with its path.
        #[test]
        fn reports_path_of_first_error() {
            let doc = json!({
                "tasks": [
                    {"id": 1, "title": "Setup", "description": "Init"},
                    {"id": 0, "title": "", "description": "Bad"}
                ],
                "metadata": metadata()
            });
            let err = validate_task_set(&doc).err();
            assert_eq!(
                err,
                Some(ValidationError::new("tasks[1].id", "must be a positive integer"))
            );
        }

        /// Tests that out-of-set priorities are rejected, not coerced.
        #[test]
        fn rejects_unknown_priority() {
            let doc = json!({
                "tasks": [{"id": 1, "title": "Setup", "description": "Init", "priority": "urgent"}],
                "metadata": metadata()
            });
            let err = validate_task_set(&doc).err();
            assert_eq!(
                err,
                Some(ValidationError::new("tasks[0].priority", "must be one of high, medium, low"))
            );
        }

        /// Tests that non-integer dependency entries are rejected with their index.
        #[test]
        fn rejects_bad_dependency() {
            let doc = json!({
                "tasks": [{"id": 3, "title": "T", "description": "D", "dependencies": [1, "2"]}],
                "metadata": metadata()
            });
            let err = validate_task_set(&doc).err();
            assert_eq!(
                err.map(|e| e.field),
                Some("tasks[0].dependencies[1]".to_string())
            );
        }

        /// Tests that fractional ids are rejected.
        #[test]
        fn rejects_fractional_id() {
            let doc = json!({
                "tasks": [{"id": 1.5, "title": "T", "description": "D"}],
                "metadata": metadata()
            });
            assert!(validate_task_set(&doc).is_err());
        }

        /// Tests that metadata is required.
        #[test]
        fn requires_metadata() {
            let doc = json!({"tasks": []});
            assert_eq!(
                validate_task_set(&doc).err(),
                Some(ValidationError::new("metadata", "is required"))
            );
        }

        /// Tests metadata field validation.
        #[test]
        fn validates_metadata_fields() {
            let doc = json!({
                "tasks": [],
                "metadata": {"projectName": "X", "totalTasks": -1, "sourceFile": "p", "generatedAt": "now"}
            });
            assert_eq!(
                validate_task_set(&doc).err().map(|e| e.field),
                Some("metadata.totalTasks".to_string())
            );
        }

        /// Tests that an empty title is rejected.
        #[test]
        fn rejects_empty_title() {
            let doc = json!({
                "tasks": [{"id": 1, "title": "", "description": "D"}],
                "metadata": metadata()
            });
            assert_eq!(
                validate_task_set(&doc).err(),
                Some(ValidationError::new("tasks[0].title", "must not be empty"))
            );
        }

        /// Tests that the root must be an object.
        #[test]
        fn rejects_array_root() {
            assert_eq!(
                validate_task_set(&json!([])).err(),
                Some(ValidationError::new("", "must be an object"))
            );
        }
    }

    // =========================================================================
    // Subtasks
    // =========================================================================

    mod subtasks {
        use super::*;

        /// Tests that a three-character title fails on the minimum length.
        #[test]
        fn short_title_rejected() {
            let doc = json!({"subtasks": [subtask("Fix")]});
            let err = validate_subtask_set(&doc).err();
            assert_eq!(
                err,
                Some(ValidationError::new("subtasks[0].title", "must be at least 5 characters"))
            );
            let message = err.map(|e| e.to_string()).unwrap_or_default();
            assert!(message.contains("title"));
            assert!(message.contains("at least 5"));
        }

        /// Tests that status defaults to pending.
        #[test]
        fn status_defaults_to_pending() -> anyhow::Result<()> {
            let set = validate_subtask_set(&json!({"subtasks": [subtask("Create schema")]}))?;
            assert_eq!(set.subtasks[0].status, TaskStatus::Pending);
            assert!(set.subtasks[0].dependencies.is_empty());
            Ok(())
        }

        /// Tests the description and details minimums.
        #[test]
        fn description_and_details_minimums() {
            let short_description = json!({"subtasks": [{
                "id": 1, "title": "Create schema", "description": "Short",
                "details": "Use SQLite with a single todos table."
            }]});
            assert_eq!(
                validate_subtask_set(&short_description).err(),
                Some(ValidationError::new(
                    "subtasks[0].description",
                    "must be at least 10 characters"
                ))
            );

            let short_details = json!({"subtasks": [{
                "id": 1, "title": "Create schema", "description": "Create the storage layer",
                "details": "Use SQLite"
            }]});
            assert_eq!(
                validate_subtask_set(&short_details).err(),
                Some(ValidationError::new(
                    "subtasks[0].details",
                    "must be at least 20 characters"
                ))
            );
        }

        /// Tests that length counts characters, not bytes.
        #[test]
        fn length_counts_characters() {
            // Four characters, twelve bytes.
            let doc = json!({"subtasks": [{
                "id": 1, "title": "日本語版", "description": "Create the storage layer",
                "details": "Use SQLite with a single todos table."
            }]});
            assert!(validate_subtask_set(&doc).is_err());
        }
    }

    // =========================================================================
    // Complexity
    // =========================================================================

    mod complexity {
        use super::*;

        fn entry(score: Value) -> Value {
            json!({
                "taskId": 4,
                "taskTitle": "Auth",
                "complexityScore": score,
                "recommendedSubtasks": 5,
                "expansionPrompt": "Break down auth flows",
                "reasoning": "Touches many modules"
            })
        }

        /// Tests a valid report.
        #[test]
        fn accepts_valid_report() -> anyhow::Result<()> {
            let report = validate_complexity_report(&json!([entry(json!(7))]))?;
            assert_eq!(report.entries[0].complexity_score, 7);
            assert_eq!(report.entries[0].task_id, 4);
            Ok(())
        }

        /// Tests that out-of-range scores are rejected.
        #[test]
        fn rejects_out_of_range_scores() {
            for score in [json!(0), json!(11), json!(7.5), json!("7")] {
                let err = validate_complexity_report(&json!([entry(score)])).err();
                assert_eq!(
                    err,
                    Some(ValidationError::new(
                        "[0].complexityScore",
                        "must be an integer between 1 and 10"
                    ))
                );
            }
        }

        /// Tests that the root must be an array.
        #[test]
        fn rejects_object_root() {
            assert_eq!(
                validate_complexity_report(&json!({"analysis": []})).err(),
                Some(ValidationError::new("", "must be an array"))
            );
        }

        /// Tests the report serializes as a plain array.
        #[test]
        fn serializes_transparently() -> anyhow::Result<()> {
            let report = validate_complexity_report(&json!([entry(json!(3))]))?;
            let value = serde_json::to_value(&report)?;
            assert!(value.is_array());
            assert_eq!(value[0]["complexityScore"], json!(3));
            Ok(())
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    mod dispatch {
        use super::*;

        /// Tests that each operation selects its schema.
        #[test]
        fn validate_dispatches_by_operation() -> anyhow::Result<()> {
            let task = json!({"id": 5, "title": "Docs", "description": "Write docs"});
            assert!(matches!(
                validate(Operation::AddTask, &task)?,
                ValidatedResult::SingleTask(Task { id: 5, .. })
            ));
            assert!(matches!(
                validate(Operation::UpdateSubtask, &json!("new notes"))?,
                ValidatedResult::UpdateText(text) if text == "new notes"
            ));
            assert!(validate(Operation::ExpandTask, &task).is_err());
            Ok(())
        }

        /// Tests that validated tasks serialize with camelCase wire names.
        #[test]
        fn task_serializes_camel_case() -> anyhow::Result<()> {
            let task = validate_task(&json!({"id": 1, "title": "T", "description": "D"}))?;
            let value = serde_json::to_value(&task)?;
            assert_eq!(value["testStrategy"], json!(""));
            assert_eq!(value["priority"], json!("medium"));
            assert_eq!(value["status"], json!("pending"));
            assert!(value.get("subtasks").is_none());
            Ok(())
        }

        /// Tests wire names of statuses.
        #[test]
        fn status_wire_names() {
            assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
            assert_eq!(TaskStatus::parse("completed"), None);
            assert_eq!(TaskPriority::parse("low"), Some(TaskPriority::Low));
        }
    }
}
