//! Prompt templates for the bridge operations.
//!
//! Each operation produces a [`PromptPair`]: the system prompt is passed as
//! the final argument of the tool invocation and the user prompt is streamed
//! on stdin. Templates carry `{{PLACEHOLDER}}` markers that are substituted
//! per request.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::requests::{
    AddTaskRequest, AnalyzeComplexityRequest, ExpandTaskRequest, GenerateTasksRequest,
    UpdateSubtaskRequest,
};
use crate::core::schema::{SUBTASK_DESCRIPTION_MIN, SUBTASK_DETAILS_MIN, SUBTASK_TITLE_MIN, Subtask, Task};

/// The two prompts of one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPair {
    /// Instructions and output contract.
    pub system: String,
    /// Request-specific content.
    pub user: String,
}

/// Builds the prompts for every operation.
///
/// Implementations must be pure: the same request yields the same prompts.
pub trait PromptSource: Send + Sync {
    fn generate_tasks(&self, request: &GenerateTasksRequest) -> PromptPair;
    fn expand_task(&self, request: &ExpandTaskRequest) -> PromptPair;
    fn add_task(&self, request: &AddTaskRequest) -> PromptPair;
    fn analyze_complexity(&self, request: &AnalyzeComplexityRequest) -> PromptPair;
    fn update_subtask(&self, request: &UpdateSubtaskRequest) -> PromptPair;
}

const JSON_ONLY_RULE: &str = "Respond with ONLY the JSON described above. Do not wrap it in markdown, do not add explanations before or after it.";

const RESEARCH_NOTE: &str = r"
# Research Mode

Before answering, consider current best practices, widely used libraries and recent changes in the relevant ecosystems. Prefer concrete, up-to-date recommendations (library names, versions, APIs) over generic advice, and reflect them in the details you write.
";

const GENERATE_SYSTEM_TEMPLATE: &str = r#"# Role

You are a senior technical lead who turns product requirements documents (PRDs) into an ordered list of development tasks.

# Instructions

- Produce {{TASK_COUNT}} top-level tasks.
- Number tasks sequentially starting at id {{NEXT_ID}}.
- Order tasks so that each task only depends on tasks with lower ids.
- Every task needs a concise `title`, a one-sentence `description`, implementation `details` and a `testStrategy`.
- `priority` is one of "high", "medium", "low".
- `status` is always "pending".
- `dependencies` lists ids of tasks that must be finished first; use an empty array when there are none.
- Cover every requirement in the PRD; do not invent features the PRD does not ask for.
{{RESEARCH}}
# Output Format

{
  "tasks": [
    {
      "id": {{NEXT_ID}},
      "title": "string",
      "description": "string",
      "details": "string",
      "testStrategy": "string",
      "priority": "high" | "medium" | "low",
      "dependencies": [number],
      "status": "pending"
    }
  ],
  "metadata": {
    "projectName": "{{PROJECT_NAME}}",
    "totalTasks": number,
    "sourceFile": "{{SOURCE_FILE}}",
    "generatedAt": "{{GENERATED_AT}}"
  }
}

{{JSON_ONLY}}
"#;

const EXPAND_SYSTEM_TEMPLATE: &str = r#"# Role

You are a senior engineer who breaks a development task into small, concrete subtasks.

# Instructions

- Produce exactly {{SUBTASK_COUNT}} subtasks.
- Number subtasks sequentially starting at id {{NEXT_ID}}.
- `title` has at least {{TITLE_MIN}} characters, `description` at least {{DESCRIPTION_MIN}}, `details` at least {{DETAILS_MIN}}.
- `dependencies` lists ids of sibling subtasks only, all lower than the subtask's own id.
- `status` is always "pending".
- Together the subtasks must fully implement the parent task.
{{RESEARCH}}
# Output Format

{
  "subtasks": [
    {
      "id": {{NEXT_ID}},
      "title": "string",
      "description": "string",
      "details": "string",
      "dependencies": [number],
      "status": "pending",
      "testStrategy": "string"
    }
  ]
}

{{JSON_ONLY}}
"#;

const ADD_SYSTEM_TEMPLATE: &str = r#"# Role

You are a senior technical lead who writes a single, well-scoped development task that fits into an existing plan.

# Instructions

- The new task has id {{TASK_ID}}.
- Use priority "{{PRIORITY}}" unless the request makes it clearly wrong.
- Only depend on ids of tasks that already exist.
- Do not duplicate work covered by existing tasks.
- `status` is always "pending".
{{RESEARCH}}
# Output Format

{
  "id": {{TASK_ID}},
  "title": "string",
  "description": "string",
  "details": "string",
  "testStrategy": "string",
  "priority": "high" | "medium" | "low",
  "dependencies": [number],
  "status": "pending"
}

{{JSON_ONLY}}
"#;

const ANALYZE_SYSTEM_TEMPLATE: &str = r#"# Role

You are a senior engineer who estimates implementation complexity.

# Instructions

- Assess every task you are given, one entry per task, in the given order.
- `complexityScore` is an integer from 1 (trivial) to 10 (very complex).
- `recommendedSubtasks` is a positive integer; tasks scoring {{THRESHOLD}} or higher should be broken down further than simpler ones.
- `expansionPrompt` is an instruction that would guide breaking the task into subtasks.
- `reasoning` briefly justifies the score.
{{RESEARCH}}
# Output Format

[
  {
    "taskId": number,
    "taskTitle": "string",
    "complexityScore": number,
    "recommendedSubtasks": number,
    "expansionPrompt": "string",
    "reasoning": "string"
  }
]

{{JSON_ONLY}}
"#;

const UPDATE_SYSTEM_TEMPLATE: &str = r"# Role

You are a senior engineer keeping implementation notes for a subtask up to date.

# Instructions

- Write only the new information requested by the update, as plain text.
- The text is appended to the subtask's existing details; do not repeat them.
- Do not output JSON, markdown headings or a preamble.
{{RESEARCH}}";

/// Prompts shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrompts {
    /// Fixed generation timestamp; the current time when unset.
    now: Option<DateTime<Utc>>,
}

impl DefaultPrompts {
    /// Creates prompts that use the current time for generation metadata.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: None }
    }

    /// Creates prompts with a fixed generation timestamp.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn timestamp(&self) -> String {
        self.now
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl PromptSource for DefaultPrompts {
    fn generate_tasks(&self, request: &GenerateTasksRequest) -> PromptPair {
        let task_count = if request.num_tasks == 0 {
            "as many tasks as the PRD requires (typically between 5 and 20)".to_string()
        } else {
            format!("approximately {}", request.num_tasks)
        };
        let project_name = request
            .project_name
            .clone()
            .unwrap_or_else(|| "<name inferred from the PRD>".to_string());

        let system = GENERATE_SYSTEM_TEMPLATE
            .replace("{{TASK_COUNT}}", &task_count)
            .replace("{{NEXT_ID}}", &request.next_id.to_string())
            .replace("{{PROJECT_NAME}}", &project_name)
            .replace("{{SOURCE_FILE}}", &request.source_file)
            .replace("{{GENERATED_AT}}", &self.timestamp());
        let system = finish_system(system, request.research);

        let user = format!(
            "Generate the tasks for the following PRD (source: {source}).\n\n<PRD>\n{prd}\n</PRD>\n",
            source = request.source_file,
            prd = embed_document(&request.prd_content, "</PRD>"),
        );

        PromptPair { system, user }
    }

    fn expand_task(&self, request: &ExpandTaskRequest) -> PromptPair {
        let system = EXPAND_SYSTEM_TEMPLATE
            .replace("{{SUBTASK_COUNT}}", &request.num_subtasks.to_string())
            .replace("{{NEXT_ID}}", &request.next_subtask_id.to_string())
            .replace("{{TITLE_MIN}}", &SUBTASK_TITLE_MIN.to_string())
            .replace("{{DESCRIPTION_MIN}}", &SUBTASK_DESCRIPTION_MIN.to_string())
            .replace("{{DETAILS_MIN}}", &SUBTASK_DETAILS_MIN.to_string());
        let system = finish_system(system, request.research);

        let mut user = String::from("Break down this task:\n\n");
        user.push_str(&render_task(&request.task));
        if !request.additional_context.trim().is_empty() {
            let _ = write!(
                user,
                "\n<ADDITIONAL_CONTEXT>\n{}\n</ADDITIONAL_CONTEXT>\n",
                embed_document(request.additional_context.trim(), "</ADDITIONAL_CONTEXT>")
            );
        }

        PromptPair { system, user }
    }

    fn add_task(&self, request: &AddTaskRequest) -> PromptPair {
        let system = ADD_SYSTEM_TEMPLATE
            .replace("{{TASK_ID}}", &request.new_task_id.to_string())
            .replace("{{PRIORITY}}", request.priority.as_str());
        let system = finish_system(system, request.research);

        let mut user = format!(
            "Create a new task for this request:\n\n<REQUEST>\n{}\n</REQUEST>\n",
            embed_document(&request.prompt, "</REQUEST>")
        );
        if !request.dependencies.is_empty() {
            let _ = write!(
                user,
                "\nThe new task must depend on: {}\n",
                join_ids(&request.dependencies)
            );
        }
        user.push_str("\n<EXISTING_TASKS>\n");
        if request.existing_tasks.is_empty() {
            user.push_str("- No existing tasks.\n");
        }
        for task in &request.existing_tasks {
            let _ = writeln!(user, "- {}: {} [{}]", task.id, task.title, task.status.as_str());
        }
        user.push_str("</EXISTING_TASKS>\n");

        PromptPair { system, user }
    }

    fn analyze_complexity(&self, request: &AnalyzeComplexityRequest) -> PromptPair {
        let system = ANALYZE_SYSTEM_TEMPLATE.replace("{{THRESHOLD}}", &request.threshold.to_string());
        let system = finish_system(system, request.research);

        let mut user = format!("Analyze the complexity of these {} tasks:\n", request.tasks.len());
        for task in &request.tasks {
            user.push('\n');
            user.push_str(&render_task(task));
        }

        PromptPair { system, user }
    }

    fn update_subtask(&self, request: &UpdateSubtaskRequest) -> PromptPair {
        let system = UPDATE_SYSTEM_TEMPLATE.replace("{{RESEARCH}}", research_block(request.research));

        let mut user = String::new();
        if let Some(parent) = &request.parent_task {
            let _ = writeln!(
                user,
                "Parent task {}: {}\n{}\n",
                parent.id, parent.title, parent.description
            );
        }
        user.push_str(&render_subtask(&request.subtask));
        let _ = write!(
            user,
            "\n<UPDATE>\n{}\n</UPDATE>\n",
            embed_document(&request.update_prompt, "</UPDATE>")
        );

        PromptPair { system, user }
    }
}

fn research_block(research: bool) -> &'static str {
    if research { RESEARCH_NOTE } else { "" }
}

fn finish_system(template: String, research: bool) -> String {
    template
        .replace("{{RESEARCH}}", research_block(research))
        .replace("{{JSON_ONLY}}", JSON_ONLY_RULE)
}

fn render_task(task: &Task) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Task {}: {}", task.id, task.title);
    let _ = writeln!(s, "Description: {}", task.description);
    if !task.details.is_empty() {
        let _ = writeln!(s, "Details: {}", task.details);
    }
    if !task.test_strategy.is_empty() {
        let _ = writeln!(s, "Test strategy: {}", task.test_strategy);
    }
    let _ = writeln!(s, "Priority: {}", task.priority.as_str());
    if !task.dependencies.is_empty() {
        let _ = writeln!(s, "Depends on: {}", join_ids(&task.dependencies));
    }
    s
}

fn render_subtask(subtask: &Subtask) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Subtask {}: {}", subtask.id, subtask.title);
    let _ = writeln!(s, "Description: {}", subtask.description);
    let _ = writeln!(s, "Current details:\n{}", subtask.details);
    s
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

/// Prepares user text for embedding between XML-style tags.
///
/// Occurrences of `closing_tag` are broken with a zero-width space so the
/// prompt structure survives. The text is otherwise passed through whole.
fn embed_document(payload: &str, closing_tag: &str) -> String {
    payload.replace(closing_tag, &closing_tag.replace("</", "<\u{200B}/"))
}
