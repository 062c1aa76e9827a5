//! CLI argument parsing using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::{Subtask, Task, TaskPriority};

/// `taskbridge` - task breakdowns through a command-line AI tool
///
/// Sends PRDs and tasks to the configured AI CLI and prints validated JSON
/// results on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "taskbridge", version, about, long_about = None)]
pub struct Args {
    /// Directory holding `.taskbridge/config.json` (defaults to the working directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Executable name or path, overriding the configuration
    #[arg(long, global = true)]
    pub executable: Option<String>,

    /// Model passed to the executable, overriding the configuration
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Log filter such as `debug` or `taskbridge=trace` (defaults to `RUST_LOG`, then `info`)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, one per bridge operation plus `check`.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the AI CLI is installed and responsive
    Check,

    /// Generate tasks from a PRD file
    ParsePrd {
        /// PRD text file
        prd: PathBuf,

        /// Approximate number of tasks (0 lets the model decide)
        #[arg(short, long, default_value_t = 10)]
        num_tasks: u32,

        /// Id of the first generated task
        #[arg(long, default_value_t = 1)]
        next_id: u32,

        #[arg(long)]
        project_name: Option<String>,

        /// Ask for research-backed answers
        #[arg(long)]
        research: bool,
    },

    /// Expand a task into subtasks
    Expand {
        /// JSON task file (`{"tasks": [...]}`)
        #[arg(long)]
        tasks: PathBuf,

        /// Id of the task to expand
        #[arg(long)]
        id: u32,

        /// Number of subtasks
        #[arg(short, long, default_value_t = 3)]
        num: u32,

        /// Id of the first subtask (defaults to after the existing subtasks)
        #[arg(long)]
        next_subtask_id: Option<u32>,

        /// Extra guidance for the breakdown
        #[arg(long, default_value = "")]
        context: String,

        #[arg(long)]
        research: bool,
    },

    /// Create a single task from a description
    AddTask {
        /// What the task should accomplish
        prompt: String,

        /// JSON task file with the existing tasks
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Id of the new task (defaults to after the existing tasks)
        #[arg(long)]
        id: Option<u32>,

        /// Comma-separated ids the new task depends on
        #[arg(long, value_delimiter = ',')]
        dependencies: Vec<u32>,

        #[arg(long, default_value = "medium", value_parser = parse_priority)]
        priority: TaskPriority,

        #[arg(long)]
        research: bool,
    },

    /// Score the complexity of every task in a task file
    Analyze {
        /// JSON task file
        #[arg(long)]
        tasks: PathBuf,

        /// Score at or above which expansion is recommended
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
        threshold: u8,

        #[arg(long)]
        research: bool,
    },

    /// Generate text to append to a subtask's details
    UpdateSubtask {
        /// JSON task file
        #[arg(long)]
        tasks: PathBuf,

        /// Subtask reference as `PARENT.SUBTASK`, e.g. `3.2`
        #[arg(long, value_parser = parse_subtask_ref)]
        id: (u32, u32),

        /// What changed or what to record
        prompt: String,

        #[arg(long)]
        research: bool,
    },
}

/// Parses a priority name.
///
/// # Errors
///
/// Returns a message listing the accepted names.
pub fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(&s.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("invalid priority '{s}' (expected high, medium or low)"))
}

/// Parses a `PARENT.SUBTASK` reference such as `3.2`.
///
/// # Errors
///
/// Returns a message when the reference is malformed.
pub fn parse_subtask_ref(s: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("invalid subtask reference '{s}' (expected PARENT.SUBTASK, e.g. 3.2)");
    let (parent, sub) = s.trim().split_once('.').ok_or_else(invalid)?;
    let parent = parent.parse().map_err(|_| invalid())?;
    let sub = sub.parse().map_err(|_| invalid())?;
    Ok((parent, sub))
}

/// Returns the id following the highest task id, or 1 for no tasks.
#[must_use]
pub fn next_task_id(tasks: &[Task]) -> u32 {
    tasks.iter().map(|t| t.id).max().map_or(1, |id| id.saturating_add(1))
}

/// Returns the id following the task's highest subtask id, or 1.
#[must_use]
pub fn next_subtask_id(task: &Task) -> u32 {
    task.subtasks
        .iter()
        .map(|s| s.id)
        .max()
        .map_or(1, |id| id.saturating_add(1))
}

/// Finds a task by id.
///
/// # Errors
///
/// Returns an error if no task has the id.
pub fn find_task(tasks: &[Task], id: u32) -> Result<&Task> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .with_context(|| format!("Task {id} not found"))
}

/// Finds a subtask of `task` by id.
///
/// # Errors
///
/// Returns an error if the task has no such subtask.
pub fn find_subtask(task: &Task, id: u32) -> Result<&Subtask> {
    task.subtasks
        .iter()
        .find(|s| s.id == id)
        .with_context(|| format!("Subtask {}.{id} not found", task.id))
}
