//! taskmaster task command implementations.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::load_context;
use crate::error::{Error, Result};
use crate::filter::{FilterPatch, FilterSpec};
use crate::format::{format_date, priority_label, relative_due, status_label};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{parse_due_date, Task, TaskInput, TaskPatch};
use crate::validate::{validate_task_input, validate_task_patch};

pub struct ListOptions {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct NewOptions {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub assignee: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub assignee: Option<String>,
    pub clear_description: bool,
    pub clear_due: bool,
    pub clear_assignee: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub yes: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    filters: &'a FilterSpec,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
struct TaskDeletedOutput {
    id: String,
    title: String,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Blank text means "no value"
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Map a `--field value` / `--clear-field` pair onto a patch slot
fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        return Some(None);
    }
    value.map(|value| non_empty(Some(value)))
}

fn task_line(task: &Task, today: NaiveDate) -> String {
    let mut line = format!(
        "[{}][{}] {} {}",
        task.status, task.priority, task.id, task.title
    );
    let due = relative_due(task.due_date, today);
    if !due.is_empty() {
        line.push_str(&format!(" ({due})"));
    }
    if let Some(assignee) = task.assignee.as_ref() {
        line.push_str(&format!(" (@{assignee})"));
    }
    line
}

fn push_task_summary(human: &mut HumanOutput, task: &Task, today: NaiveDate) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", status_label(task.status));
    human.push_summary("Priority", priority_label(task.priority));
    let mut due = format_date(task.due_date);
    let relative = relative_due(task.due_date, today);
    if !relative.is_empty() {
        due.push_str(&format!(" ({relative})"));
    }
    human.push_summary("Due", due);
    if let Some(assignee) = task.assignee.as_ref() {
        human.push_summary("Assignee", assignee.clone());
    }
    human.push_summary("Created", task.created_at.to_rfc3339());
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let controller = ctx.session.controller_mut()?;

    let patch = FilterPatch {
        status: options.status.as_deref().map(str::parse).transpose()?,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        search: options.search,
    };
    controller.set_filters(patch);

    let tasks = controller.filtered_tasks();
    let filters = controller.filters();
    let today = today();

    let mut human = HumanOutput::new("Tasks");
    let noun = if tasks.len() == 1 { "task" } else { "tasks" };
    human.push_summary("Found", format!("{} {noun}", tasks.len()));
    if filters.is_active() {
        human.push_summary(
            "Filters",
            format!(
                "status={} priority={} search={:?}",
                filters.status, filters.priority, filters.search
            ),
        );
    }
    for task in &tasks {
        human.push_detail(task_line(task, today));
    }
    if tasks.is_empty() {
        if filters.is_active() {
            human.push_next_step("Try adjusting your filters");
        } else {
            human.push_next_step("taskmaster new \"<title>\"");
        }
    }

    let output = TaskListOutput {
        total: tasks.len(),
        filters,
        tasks,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let controller = ctx.session.controller()?;
    let id = controller.store().resolve_id(&options.id)?;
    let task = controller.load_task(&id)?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    push_task_summary(&mut human, &task, today());
    if let Some(description) = task.description.as_ref() {
        human.push_detail(description.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &task,
        Some(&human),
    )
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let mut input = TaskInput::new(options.title.trim());
    input.description = non_empty(options.description);
    input.assignee = non_empty(options.assignee);
    if let Some(status) = options.status.as_deref() {
        input.status = status.parse()?;
    }
    if let Some(priority) = options.priority.as_deref() {
        input.priority = priority.parse()?;
    }
    input.due_date = options.due.as_deref().map(parse_due_date).transpose()?;

    let today = today();
    validate_task_input(&input, today)?;

    let mut ctx = load_context(options.data_dir)?;
    let task = ctx.session.controller_mut()?.create_task(input)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task, today);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "new",
        &task,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let due_date = if options.clear_due {
        Some(None)
    } else {
        options
            .due
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .map(Some)
    };
    let patch = TaskPatch {
        title: options.title.map(|title| title.trim().to_string()),
        description: clearable(options.description, options.clear_description),
        status: options.status.as_deref().map(str::parse).transpose()?,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        due_date,
        assignee: clearable(options.assignee, options.clear_assignee),
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field flag".to_string(),
        ));
    }

    let today = today();
    validate_task_patch(&patch, today)?;

    let mut ctx = load_context(options.data_dir)?;
    let controller = ctx.session.controller_mut()?;
    let id = controller.store().resolve_id(&options.id)?;
    let task = controller.update_task(&id, &patch)?;

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task, today);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &task,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let mut ctx = load_context(options.data_dir)?;
    let controller = ctx.session.controller_mut()?;
    let id = controller.store().resolve_id(&options.id)?;
    let task = controller.load_task(&id)?;

    if !options.yes && !confirm_delete(&task)? {
        if !options.quiet && !options.json {
            println!("Delete cancelled");
        }
        return Ok(());
    }

    controller.delete_task(&id)?;

    let output = TaskDeletedOutput {
        id: task.id.clone(),
        title: task.title.clone(),
    };
    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id);
    human.push_summary("Title", task.title);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "delete",
        &output,
        Some(&human),
    )
}

/// Ask before deleting. Without a terminal there is nobody to ask, so the
/// caller must pass `--yes`.
fn confirm_delete(task: &Task) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(Error::InvalidArgument(
            "refusing to delete without confirmation; pass --yes".to_string(),
        ));
    }

    let mut stderr = io::stderr();
    write!(
        stderr,
        "Delete \"{}\"? This action cannot be undone. [y/N] ",
        task.title
    )?;
    stderr.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
