// src/core/environment.rs

use crate::constants::{ENV_FILE_SUFFIX, HOST_SYSTEM_VAR};
use crate::core::{paths, project};
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition, ProjectCompose};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The fully merged variable mapping handed to an adapter invocation.
pub type EnvironmentMap = BTreeMap<String, String>;

/// Merges environment-file layers into a single variable mapping.
///
/// Rebuilt fresh for every adapter invocation - file sets may differ per
/// command - and deterministic: identical inputs always produce an
/// identical map.
#[derive(Debug)]
pub struct EnvironmentResolver<'a> {
    project: &'a ProjectCompose,
    ctx: &'a DispatchContext,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(project: &'a ProjectCompose, ctx: &'a DispatchContext) -> Self {
        Self { project, ctx }
    }

    /// Resolves the environment for one adapter call.
    ///
    /// Override order, weakest first: inherited process environment,
    /// project default include, plan-specific includes and directory
    /// scans (in file-list order). The synthetic `HOST_SYSTEM` key always
    /// wins last.
    pub fn resolve(&self, plan: &PlanDefinition) -> Result<EnvironmentMap, DispatchError> {
        let mut merged = BTreeMap::new();

        // Project default layer first so plan-specific files override it.
        if let Some(default_include) = &self.project.environment {
            for include in default_include.include.to_vec() {
                self.parse_into(&include_path(self.ctx, &include), &mut merged)?;
            }
        }
        for file in self.plan_env_files(plan) {
            self.parse_into(&file, &mut merged)?;
        }

        let mut environment: EnvironmentMap = std::env::vars().collect();
        environment.extend(merged);
        environment.insert(HOST_SYSTEM_VAR.to_string(), host_system());
        Ok(environment)
    }

    /// Collects the plan-specific environment files, repo-relative, in
    /// merge order: explicit `environment.include` entries first, then
    /// every `.env` file found in the plan's declared compose/manifest
    /// directories (sorted for deterministic ordering).
    fn plan_env_files(&self, plan: &PlanDefinition) -> Vec<PathBuf> {
        let Some(structured) = plan.as_structured() else {
            return Vec::new();
        };

        let mut files = Vec::new();
        if let Some(environment) = &structured.environment {
            for include in environment.include.to_vec() {
                files.push(include_path(self.ctx, &include));
            }
        }

        let mut scan_dirs = Vec::new();
        if let Some(dirs) = &structured.docker_compose_dir {
            scan_dirs.extend(dirs.to_vec());
        }
        if let Some(dirs) = &structured.kubernetes_dir {
            scan_dirs.extend(dirs.to_vec());
        }
        if !scan_dirs.is_empty() {
            files.extend(paths::scan_sorted(
                &self.ctx.repo_dir,
                &self.ctx.working_directory,
                &scan_dirs,
                &[ENV_FILE_SUFFIX],
            ));
        }
        files
    }

    fn parse_into(
        &self,
        file: &Path,
        env: &mut BTreeMap<String, String>,
    ) -> Result<(), DispatchError> {
        let resolved = project::resolve_file(self.ctx, file)?;
        let content = std::fs::read_to_string(&resolved).map_err(|e| {
            DispatchError::ConfigLoad(format!(
                "Could not read environment file '{}': {e}",
                resolved.display()
            ))
        })?;
        parse_env_lines(&content, env);
        Ok(())
    }
}

fn include_path(ctx: &DispatchContext, include: &str) -> PathBuf {
    paths::repo_relative_file(&ctx.repo_dir, &ctx.working_directory, include)
}

/// Parses `KEY=VALUE` lines into the map. `#`-prefixed lines and lines
/// without `=` are skipped; only the first `=` delimits; both sides are
/// trimmed. Later keys override earlier ones.
fn parse_env_lines(content: &str, env: &mut BTreeMap<String, String>) {
    for line in content.lines() {
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            env.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
}

/// `platform.system()`-style name of the host operating system.
pub fn host_system() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        // Uncommon hosts keep the raw identifier.
        other => other.to_string(),
    }
}
