// src/core/project.rs

use crate::constants::PROJECT_DESCRIPTOR_FILENAMES;
use crate::core::paths;
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition, ProjectCompose};
use std::path::{Path, PathBuf};

/// Locates the project descriptor (`pocok.yml` / `pocok.yaml`) in the
/// given directory.
pub fn discover(directory: &Path) -> Result<PathBuf, DispatchError> {
    for name in PROJECT_DESCRIPTOR_FILENAMES {
        let candidate = directory.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(DispatchError::ConfigLoad(format!(
        "No project descriptor ({}) found in '{}'",
        PROJECT_DESCRIPTOR_FILENAMES.join(" or "),
        directory.display()
    )))
}

/// Reads and parses a project descriptor.
pub fn load(path: &Path) -> Result<ProjectCompose, DispatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DispatchError::ConfigLoad(format!(
            "Could not read project descriptor '{}': {e}",
            path.display()
        ))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        DispatchError::ConfigLoad(format!(
            "Project descriptor '{}' has wrong YAML format: {e}",
            path.display()
        ))
    })
}

/// Selects the active plan. A requested plan must exist; without a request
/// the plan named `default` wins, then a descriptor's sole plan. Anything
/// else is fatal, listing what is available.
pub fn select_plan<'a>(
    compose: &'a ProjectCompose,
    requested: Option<&str>,
) -> Result<(String, &'a PlanDefinition), DispatchError> {
    if let Some(name) = requested {
        let plan = compose.plan.get(name).ok_or_else(|| {
            DispatchError::ConfigLoad(format!(
                "Plan '{name}' not found in project. Available plans: {}",
                plan_names(compose).join(", ")
            ))
        })?;
        return Ok((name.to_string(), plan));
    }

    if let Some(plan) = compose.plan.get("default") {
        return Ok(("default".to_string(), plan));
    }
    if compose.plan.len() == 1 {
        let (name, plan) = compose
            .plan
            .iter()
            .next()
            .expect("len() == 1 guarantees an entry");
        return Ok((name.clone(), plan));
    }

    Err(DispatchError::ConfigLoad(format!(
        "No plan selected and no 'default' plan exists. Available plans: {}",
        plan_names(compose).join(", ")
    )))
}

/// All plan names, in deterministic (sorted) order.
pub fn plan_names(compose: &ProjectCompose) -> Vec<String> {
    compose.plan.keys().cloned().collect()
}

/// Resolves a repo-relative file reference to an absolute path, failing
/// with the file and project name when it does not exist in the checkout.
pub fn resolve_file(ctx: &DispatchContext, file: &Path) -> Result<PathBuf, DispatchError> {
    let absolute = ctx.repo_dir.join(file);
    if absolute.is_file() {
        Ok(absolute)
    } else {
        Err(DispatchError::MissingFile {
            file: file.display().to_string(),
            project: ctx.project_name.clone(),
        })
    }
}

/// Resolves a declarative file name relative to the working directory and
/// verifies it exists.
pub fn resolve_named_file(ctx: &DispatchContext, name: &str) -> Result<PathBuf, DispatchError> {
    let relative = paths::repo_relative_file(&ctx.repo_dir, &ctx.working_directory, name);
    resolve_file(ctx, &relative)
}
