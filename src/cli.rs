use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::api::{BoardApi, HttpBoardApi};
use crate::board::form::{self, FormMode, TaskForm};
use crate::board::{html, Board};
use crate::calendar::{self, CalendarLog};
use crate::config::AppConfig;
use crate::model::task::{ProjectId, Status, TaskId};

/// Parse CLI args for `planny add` and create the task.
pub async fn handle_add(config: &AppConfig, args: &[String]) -> Result<()> {
    let form = parse_add_args(args)?;
    let api = HttpBoardApi::from_config(config);

    let submitted = match form::submit(&api, FormMode::Create, &form).await {
        Ok(s) => s,
        Err(e) => bail!("{}: {}", e.field.label(), e.message),
    };

    match submitted.task_id {
        Some(id) => {
            println!("Created task #{id}: {}", form.title.trim());
            let log = CalendarLog::new(config.calendar_path());
            if let Err(e) = calendar::mirror_task(&api, &log, id).await {
                warn!(task_id = id, error = %e, "calendar mirroring failed");
            }
        }
        None => {
            println!("Created task: {}", form.title.trim());
            warn!("create response carried no taskID; calendar event skipped");
        }
    }
    Ok(())
}

/// `planny move <task-id> <status>`: same path as a drag, awaited in order.
pub async fn handle_move(config: &AppConfig, args: &[String]) -> Result<()> {
    let (task_id, status) = parse_move_args(args)?;
    let api = std::sync::Arc::new(HttpBoardApi::from_config(config));
    let mut board = Board::new(api);
    board.load().await;

    board
        .move_task(task_id, status)
        .await
        .with_context(|| format!("Failed to move task #{task_id}"))?;

    match board.view().status_of(task_id) {
        Some(now) => println!("Task #{task_id} is now in {now}"),
        None => println!("Task #{task_id} updated"),
    }
    Ok(())
}

/// `planny export`: write the current board as HTML.
pub async fn handle_export(config: &AppConfig, args: &[String]) -> Result<()> {
    let opts = parse_export_args(args)?;
    let api = HttpBoardApi::from_config(config);
    let tasks = api.fetch_tasks().await.context("Failed to load tasks")?;

    let visible = crate::board::filter_by_project(&tasks, opts.project);
    let page = html::render_page(&crate::board::view::build(visible), "Kanban Board");

    match opts.output {
        Some(path) => {
            std::fs::write(&path, page)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Board written to {}", path.display());
        }
        None => print!("{page}"),
    }
    Ok(())
}

/// Parse `planny add` arguments into a create form.
///
/// Supported forms:
///   planny add "Fix login" --status todo --project 3
///   planny add Fix login -s 1 -p 3 -d "SSO is broken" --due 2025-06-30 -a 4 --priority High
pub fn parse_add_args(args: &[String]) -> Result<TaskForm> {
    if args.is_empty() {
        bail!("Usage: planny add <title> --status <status> --project <id> [-d <description>] [--due YYYY-MM-DD] [-a <developer-id>] [--priority Low|Medium|High]");
    }

    let mut form = TaskForm::default();
    let mut title_parts: Vec<String> = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        let target = match flag {
            "-d" | "--desc" | "--description" => Some(&mut form.description),
            "-s" | "--status" => Some(&mut form.status),
            "-p" | "--project" => Some(&mut form.project),
            "--due" => Some(&mut form.due_date),
            "-a" | "--assign" => Some(&mut form.assigned_to),
            "--priority" => Some(&mut form.priority),
            _ => None,
        };
        match target {
            Some(slot) => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for {flag}");
                };
                *slot = value.clone();
            }
            None => title_parts.push(args[i].clone()),
        }
        i += 1;
    }

    form.title = title_parts.join(" ");
    if !form.status.is_empty() {
        form.status = parse_status(&form.status)?.id().to_string();
    }
    Ok(form)
}

pub fn parse_move_args(args: &[String]) -> Result<(TaskId, Status)> {
    let [id, status] = args else {
        bail!("Usage: planny move <task-id> <status>");
    };
    let task_id = id
        .parse::<TaskId>()
        .with_context(|| format!("Invalid task id: {id}"))?;
    Ok((task_id, parse_status(status)?))
}

#[derive(Debug, Default, PartialEq)]
pub struct ExportArgs {
    pub project: Option<ProjectId>,
    pub output: Option<PathBuf>,
}

pub fn parse_export_args(args: &[String]) -> Result<ExportArgs> {
    let mut opts = ExportArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let Some(value) = args.get(i) else {
            bail!("Missing value for {flag}");
        };
        match flag {
            "-p" | "--project" => {
                opts.project = Some(
                    value
                        .parse::<ProjectId>()
                        .with_context(|| format!("Invalid project id: {value}"))?,
                )
            }
            "-o" | "--output" => opts.output = Some(PathBuf::from(value)),
            other => bail!("Unknown option: {other}"),
        }
        i += 1;
    }
    Ok(opts)
}

/// Accept a status id (`1`-`5`) or its label in any case, with spaces,
/// dashes or underscores ("in progress", "bug-report", "todo").
pub fn parse_status(s: &str) -> Result<Status> {
    if let Ok(id) = s.parse::<u32>() {
        return Status::from_id(id).with_context(|| format!("Unknown status: {s}"));
    }
    let wanted = normalize(s);
    Status::ALL
        .into_iter()
        .find(|st| normalize(st.label()) == wanted)
        .with_context(|| format!("Unknown status: {s}"))
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn print_help() {
    println!("planny — terminal kanban board\n");
    println!("USAGE:");
    println!("  planny                        Launch the board");
    println!("  planny add <title> [options]  Create a task");
    println!("  planny move <id> <status>     Move a task to another column");
    println!("  planny export [options]       Print the board as HTML");
    println!();
    println!("ADD OPTIONS:");
    println!("  -s, --status <status>      To-Do, In Progress, Bug Report, Testing, Complete (or 1-5)");
    println!("  -p, --project <id>         Project id");
    println!("  -d, --desc <text>          Description");
    println!("      --due <YYYY-MM-DD>     Due date");
    println!("  -a, --assign <id>          Developer id");
    println!("      --priority <level>     Low, Medium or High");
    println!();
    println!("EXPORT OPTIONS:");
    println!("  -p, --project <id>         Only tasks of this project");
    println!("  -o, --output <file>        Write to a file instead of stdout");
    println!();
    println!("Configuration lives in ~/.planny/config.toml (base_url, cookie, log_level).");
}
