// src/error.rs

use crate::models::BackendMode;
use crate::system::executor::ExecutionError;
use thiserror::Error;

/// Everything that can fatally abort a dispatch. Every variant propagates
/// up to the single top-level handler; the only local recovery anywhere is
/// the Helm adapter's catch-and-log of `Process` failures.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration could not be loaded: {0}")]
    ConfigLoad(String),

    #[error("Command not found in hierarchy: {0}")]
    UnknownCommand(String),

    #[error("File '{file}' does not exist in project '{project}'")]
    MissingFile { file: String, project: String },

    #[error("Command '{verb}' is not supported with {mode}")]
    BackendUnsupported { verb: String, mode: BackendMode },

    #[error("No '{tool}' binary found on PATH; required for {mode} mode")]
    ToolMissing { tool: &'static str, mode: BackendMode },

    #[error(transparent)]
    Process(#[from] ExecutionError),
}
