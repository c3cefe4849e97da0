//! taskmaster init command implementation
//!
//! Creates the data directory and a default config, and seeds sample tasks
//! into an empty store.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{display_path, load_context};
use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::SeedOutcome;

pub struct InitOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created_config: bool,
    seed: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    seeded: Option<usize>,
    tasks: usize,
}

pub fn run(options: InitOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let created_config = ensure_config(&ctx.data_dir)?;
    let tasks = ctx.session.controller()?.tasks().len();

    let (seed, seeded) = match ctx.seed {
        SeedOutcome::Seeded(count) => ("seeded", Some(count)),
        SeedOutcome::AlreadyPopulated => ("already-populated", None),
        SeedOutcome::Disabled => ("disabled", None),
        SeedOutcome::Corrupt => ("corrupt", None),
    };

    let header = match ctx.seed {
        SeedOutcome::Seeded(count) => format!("taskmaster init: seeded {count} sample tasks"),
        _ if created_config => "taskmaster init: initialized data directory".to_string(),
        _ => "taskmaster init: nothing to do".to_string(),
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", display_path(&ctx.data_dir));
    human.push_summary(
        "config",
        if created_config { "created" } else { "existing" },
    );
    human.push_summary("tasks", tasks.to_string());
    if ctx.seed == SeedOutcome::Corrupt {
        human.push_detail("stored task data is unreadable; it was left untouched");
    }
    human.push_next_step("taskmaster list");
    human.push_next_step("taskmaster new \"<title>\"");

    let report = InitReport {
        data_dir: ctx.data_dir.clone(),
        created_config,
        seed,
        seeded,
        tasks,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}

fn ensure_config(data_dir: &Path) -> Result<bool> {
    let path = Config::path_in(data_dir);
    if path.exists() {
        return Ok(false);
    }
    Config::default().save(&path)?;
    Ok(true)
}
