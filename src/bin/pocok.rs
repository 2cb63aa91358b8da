// src/bin/pocok.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use pocok::{
    cli::{self, Cli},
    core::{dispatcher::Dispatcher, project},
    models::{DispatchContext, ScriptKind},
};
use std::env;
use std::path::Path;

/// Starter files written by `pocok init` when the project has none.
const STARTER_DESCRIPTOR: &str = include_str!("../../resources/pocok.yml");
const STARTER_COMPOSE: &str = include_str!("../../resources/docker-compose.yml");

/// Entry point: logging setup, argument parsing, and the single
/// centralized error handler. Every fatal condition ends here as one
/// human-readable message and a non-zero exit; clean completion returns
/// zero implicitly.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {e:#}", "Error".red().bold());
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Could not determine the current directory")?;

    if cli.command == "init" {
        return handle_init(&cli, &cwd);
    }

    let descriptor = match &cli.file {
        Some(file) => file.clone(),
        None => project::discover(&cwd)?,
    };
    let compose = project::load(&descriptor)?;

    if cli.command == "plan" {
        // `pocok plan ls`
        for name in project::plan_names(&compose) {
            println!("{name}");
        }
        return Ok(());
    }

    let (plan_name, _) = project::select_plan(&compose, cli.plan())?;
    let ctx = build_context(&cwd, &descriptor, plan_name, cli.always_update)?;
    let dispatcher = Dispatcher::new(compose, ctx)?;

    let verb = cli::normalize_verb(&cli.command);
    dispatcher.run(verb)?;

    match verb {
        "down" | "stop" => println!("{}", "Project stopped".green()),
        "build" => println!("{}", "Project built".green()),
        "pull" => println!("{}", "Project pull complete".green()),
        _ => {}
    }
    Ok(())
}

/// Creates the starter descriptor and compose file when absent, then runs
/// the plan's init scripts.
fn handle_init(cli: &Cli, cwd: &Path) -> Result<()> {
    let descriptor = match project::discover(cwd) {
        Ok(existing) => existing,
        Err(_) => {
            let path = cwd.join("pocok.yml");
            std::fs::write(&path, STARTER_DESCRIPTOR)
                .with_context(|| format!("Could not write '{}'", path.display()))?;
            let default_compose = cwd.join("docker-compose.yml");
            if !default_compose.exists() {
                std::fs::write(&default_compose, STARTER_COMPOSE)
                    .with_context(|| format!("Could not write '{}'", default_compose.display()))?;
            }
            path
        }
    };

    let compose = project::load(&descriptor)?;
    let (plan_name, _) = project::select_plan(&compose, cli.plan())?;
    let ctx = build_context(cwd, &descriptor, plan_name, cli.always_update)?;
    Dispatcher::new(compose, ctx)?.run_script(ScriptKind::InitScript)?;

    println!("{}", "Project init completed".green());
    Ok(())
}

/// Resolves the read-only working context once: the repository root is the
/// current directory, the working directory is wherever the descriptor
/// lives, and the project takes the repository directory's name.
fn build_context(
    cwd: &Path,
    descriptor: &Path,
    plan_name: String,
    always_update: bool,
) -> Result<DispatchContext> {
    let descriptor = dunce::canonicalize(descriptor)
        .with_context(|| format!("Could not resolve '{}'", descriptor.display()))?;
    let working_directory = descriptor
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    let repo_dir = dunce::canonicalize(cwd)?;

    let project_name = repo_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project")
        .to_string();

    Ok(DispatchContext {
        project_name,
        repo_dir,
        working_directory,
        plan_name,
        always_update,
    })
}
