// src/system/tools.rs

use crate::constants::{COMPOSE_TOOL, DOCKER_TOOL, HELM_TOOL, KUBERNETES_TOOL};
use crate::error::DispatchError;
use crate::models::BackendMode;
use std::env;
use std::path::{Path, PathBuf};

/// Verifies that a usable backend tool for `mode` is present on `PATH`.
/// Called once at dispatcher construction; a missing tool is fatal before
/// any verb is dispatched.
pub fn check(mode: BackendMode) -> Result<(), DispatchError> {
    let path_var = env::var_os("PATH").unwrap_or_default();
    check_with_path(mode, Path::new(&path_var))
}

fn check_with_path(mode: BackendMode, path_var: &Path) -> Result<(), DispatchError> {
    let candidates: &[&'static str] = match mode {
        // Either the standalone compose binary or plain docker will do.
        BackendMode::Docker => &[COMPOSE_TOOL, DOCKER_TOOL],
        BackendMode::Kubernetes => &[KUBERNETES_TOOL],
        BackendMode::Helm => &[HELM_TOOL],
    };

    for tool in candidates {
        if let Some(found) = find_in_path(tool, path_var) {
            log::debug!("Resolved {mode} tool '{tool}' at {}", found.display());
            return Ok(());
        }
    }

    Err(DispatchError::ToolMissing {
        tool: candidates[0],
        mode,
    })
}

/// Searches every `PATH` entry for an executable file with the given name
/// (also probing the `.exe` suffix for Windows installs).
fn find_in_path(name: &str, path_var: &Path) -> Option<PathBuf> {
    for dir in env::split_paths(path_var) {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        let with_exe = dir.join(format!("{name}.exe"));
        if is_executable(&with_exe) {
            return Some(with_exe);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
