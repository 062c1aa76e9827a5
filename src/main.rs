//! `taskbridge` - task breakdowns through a command-line AI tool
//!
//! Entry point for the binary.

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskbridge::cli::{self, Args, Command};
use taskbridge::core::{
    AddTaskRequest, AnalyzeComplexityRequest, BridgeError, CliProcessExecutor, ExpandTaskRequest,
    GenerateTasksRequest, TaskBridge, UpdateSubtaskRequest,
};
use taskbridge::fs::{self, BridgePaths};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = setup_logging(args.log_level.as_deref()) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if let Some(bridge_error) = e.downcast_ref::<BridgeError>() {
                eprintln!("phase: {}", bridge_error.terminal_phase());
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr so stdout carries only results.
fn setup_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .init();
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let paths = match &args.config_dir {
        Some(dir) => BridgePaths::new(dir),
        None => BridgePaths::from_cwd()?,
    };
    let mut config = paths.load_config()?;
    config.apply_env_overrides()?;
    if let Some(executable) = args.executable {
        config.executable = executable;
    }
    if let Some(model) = args.model {
        config.model = Some(model);
    }
    config.ensure_cli_mode()?;

    let bridge = TaskBridge::new(CliProcessExecutor::new(config.launcher()))
        .with_settings(config.settings());
    info!(
        executable = %bridge.executable(),
        config = %paths.config_file().display(),
        "bridge ready"
    );

    match args.command {
        Command::Check => {
            bridge.check_availability().await?;
            print_json(&json!({"available": true, "executable": bridge.executable()}))
        }
        Command::ParsePrd {
            prd,
            num_tasks,
            next_id,
            project_name,
            research,
        } => {
            let request = GenerateTasksRequest {
                num_tasks,
                next_id,
                project_name,
                research,
                ..GenerateTasksRequest::new(fs::read_text(&prd)?, prd.display().to_string())
            };
            print_json(&bridge.generate_tasks(&request).await?)
        }
        Command::Expand {
            tasks,
            id,
            num,
            next_subtask_id,
            context,
            research,
        } => {
            let tasks = fs::read_tasks(&tasks)?;
            let task = cli::find_task(&tasks, id)?;
            let request = ExpandTaskRequest {
                num_subtasks: num,
                next_subtask_id: next_subtask_id.unwrap_or_else(|| cli::next_subtask_id(task)),
                additional_context: context,
                research,
                ..ExpandTaskRequest::new(task.clone())
            };
            print_json(&bridge.expand_task(&request).await?)
        }
        Command::AddTask {
            prompt,
            tasks,
            id,
            dependencies,
            priority,
            research,
        } => {
            let existing_tasks = match tasks {
                Some(path) => fs::read_tasks(&path)?,
                None => Vec::new(),
            };
            let new_task_id = id.unwrap_or_else(|| cli::next_task_id(&existing_tasks));
            let request = AddTaskRequest {
                existing_tasks,
                dependencies,
                priority,
                research,
                ..AddTaskRequest::new(prompt, new_task_id)
            };
            print_json(&bridge.add_task(&request).await?)
        }
        Command::Analyze {
            tasks,
            threshold,
            research,
        } => {
            let request = AnalyzeComplexityRequest {
                threshold,
                research,
                ..AnalyzeComplexityRequest::new(fs::read_tasks(&tasks)?)
            };
            print_json(&bridge.analyze_complexity(&request).await?)
        }
        Command::UpdateSubtask {
            tasks,
            id: (parent_id, subtask_id),
            prompt,
            research,
        } => {
            let tasks = fs::read_tasks(&tasks)?;
            let parent = cli::find_task(&tasks, parent_id)?;
            let subtask = cli::find_subtask(parent, subtask_id)?;
            let request = UpdateSubtaskRequest {
                parent_task: Some(parent.clone()),
                research,
                ..UpdateSubtaskRequest::new(subtask.clone(), prompt)
            };
            print_json(&bridge.update_subtask(&request).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}
