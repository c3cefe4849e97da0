//! Stats and dashboard views.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::cli::load_context;
use crate::controller::{HIGH_PRIORITY_LIMIT, RECENT_TASKS_LIMIT};
use crate::error::Result;
use crate::format::{relative_due, status_label, truncate};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::stats::TaskStats;
use crate::task::Task;

/// Titles longer than this are cut in dashboard lists
const TITLE_WIDTH: usize = 60;

pub struct StatsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DashboardOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct StatsOutput {
    #[serde(flatten)]
    stats: TaskStats,
    completion_percent: usize,
}

#[derive(Serialize)]
struct DashboardOutput<'a> {
    stats: StatsOutput,
    recent: &'a [Task],
    high_priority: Vec<&'a Task>,
}

fn push_counts(human: &mut HumanOutput, stats: &TaskStats) {
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("To Do", stats.todo.to_string());
    human.push_summary("In Progress", stats.in_progress.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human.push_summary("High priority open", stats.high_priority_open.to_string());
    human.push_summary("Completion", format!("{}%", stats.completion_percent()));
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let stats = ctx.session.controller()?.stats();

    let mut human = HumanOutput::new("Task stats");
    push_counts(&mut human, &stats);

    let output = StatsOutput {
        completion_percent: stats.completion_percent(),
        stats,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &output,
        Some(&human),
    )
}

pub fn run_dashboard(options: DashboardOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let controller = ctx.session.controller()?;
    let stats = controller.stats();
    let recent = controller.recent_tasks(RECENT_TASKS_LIMIT);
    let high_priority = controller.high_priority_open_tasks(HIGH_PRIORITY_LIMIT);
    let today = Local::now().date_naive();

    let mut human = HumanOutput::new("Dashboard");
    push_counts(&mut human, &stats);

    for task in recent {
        human.push_detail(format!(
            "recent: {} {} [{}]",
            task.id,
            truncate(&task.title, TITLE_WIDTH),
            status_label(task.status)
        ));
    }
    for task in &high_priority {
        let mut line = format!(
            "high priority: {} {}",
            task.id,
            truncate(&task.title, TITLE_WIDTH)
        );
        let due = relative_due(task.due_date, today);
        if !due.is_empty() {
            line.push_str(&format!(" ({due})"));
        }
        human.push_detail(line);
    }

    if stats.total == 0 {
        human.push_next_step("taskmaster new \"<title>\"");
    } else if high_priority.is_empty() {
        human.push_detail("No high priority tasks");
    }

    let output = DashboardOutput {
        stats: StatsOutput {
            completion_percent: stats.completion_percent(),
            stats,
        },
        recent,
        high_priority,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "dashboard",
        &output,
        Some(&human),
    )
}
