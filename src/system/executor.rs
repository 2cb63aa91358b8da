// src/system/executor.rs

use dunce;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{command}' could not be executed: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command '{command}' exited with status code {code}.")]
    NonZeroExit { command: String, code: i32 },
}

impl ExecutionError {
    /// The exit code carried by a `NonZeroExit`, if that is what this is.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Runs one external process and blocks until it exits.
///
/// The argv is spawned directly (no intermediate shell), the working
/// directory is simplified via `dunce`, and the child's environment is
/// exactly `envs` - callers pass a full resolved copy of the inherited
/// environment, so nothing else may leak in. Stdout/stderr are inherited
/// so backend tool output reaches the user unchanged.
///
/// A nonzero exit status is an error carrying the exit code. There is no
/// cancellation path: once spawned, the process is always waited for.
pub fn execute_command(
    argv: &[String],
    cwd: &Path,
    envs: &BTreeMap<String, String>,
) -> Result<(), ExecutionError> {
    let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;
    let display = argv.join(" ");
    let clean_cwd = dunce::simplified(cwd);

    let status = StdCommand::new(program)
        .args(args)
        .current_dir(clean_cwd)
        .env_clear()
        .envs(envs)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::SpawnFailed {
            command: display.clone(),
            source: e,
        })?;

    if status.success() {
        Ok(())
    } else {
        // A termination by signal has no code; report -1.
        Err(ExecutionError::NonZeroExit {
            command: display,
            code: status.code().unwrap_or(-1),
        })
    }
}
