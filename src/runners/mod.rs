//! # Backend Plan Runners
//!
//! One adapter per container backend, plus the script sandbox runner.
//! Each adapter translates a resolved plan and a verb's command tokens
//! into external process invocations; the executor does the spawning.
//!
//! Failure policy: Docker, Kubernetes and script invocations propagate a
//! nonzero exit as a fatal error. Helm alone recovers and logs it (see
//! `helm` module docs).

pub mod docker;
pub mod helm;
pub mod kubernetes;
pub mod script;

use crate::core::project;
use crate::error::DispatchError;
use crate::models::DispatchContext;
use colored::Colorize;
use std::path::PathBuf;

/// Resolves an explicit list of declarative file names against the
/// working directory, verifying each exists in the checkout.
pub(crate) fn resolve_named_files(
    ctx: &DispatchContext,
    names: &[String],
) -> Result<Vec<PathBuf>, DispatchError> {
    names
        .iter()
        .map(|name| project::resolve_named_file(ctx, name))
        .collect()
}

/// Echoes an invocation the way the rest of the console output looks.
pub(crate) fn echo(argv: &[String]) {
    println!("{} {}", "→".blue(), argv.join(" ").green());
}
