// src/runners/docker.rs

use crate::constants::{COMPOSE_TOOL, MANIFEST_SUFFIXES};
use crate::core::environment::EnvironmentMap;
use crate::core::{paths, project};
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition, ProjectCompose};
use crate::runners;
use crate::system::executor;
use std::path::PathBuf;

/// Drives Docker Compose for one plan: resolves the compose file list and
/// issues `docker-compose --project-name <name> -f <file>... <tokens...>`
/// invocations in the working directory.
#[derive(Debug)]
pub struct DockerPlanRunner<'a> {
    project: &'a ProjectCompose,
    ctx: &'a DispatchContext,
}

impl<'a> DockerPlanRunner<'a> {
    pub fn new(project: &'a ProjectCompose, ctx: &'a DispatchContext) -> Self {
        Self { project, ctx }
    }

    /// Runs one compose invocation. A nonzero exit is fatal.
    pub fn run(
        &self,
        plan: &PlanDefinition,
        tokens: &[String],
        env: &EnvironmentMap,
    ) -> Result<(), DispatchError> {
        let files = self.docker_files(plan)?;
        let argv = self.build_command(&files, tokens);
        log::info!("Docker command: {argv:?}");
        runners::echo(&argv);
        executor::execute_command(&argv, &self.ctx.working_directory, env)?;
        Ok(())
    }

    /// The compose file list for a plan: explicit files, or a directory
    /// scan, or - for a bare service list - each entry translated through
    /// the project's container-name table.
    pub fn docker_files(&self, plan: &PlanDefinition) -> Result<Vec<PathBuf>, DispatchError> {
        match plan {
            PlanDefinition::Structured(structured) => {
                if let Some(names) = &structured.docker_compose_file {
                    names
                        .to_vec()
                        .iter()
                        .map(|name| self.resolve_service_file(name))
                        .collect()
                } else if let Some(dirs) = &structured.docker_compose_dir {
                    paths::scan_sorted(
                        &self.ctx.repo_dir,
                        &self.ctx.working_directory,
                        &dirs.to_vec(),
                        &MANIFEST_SUFFIXES,
                    )
                    .iter()
                    .map(|file| project::resolve_file(self.ctx, file))
                    .collect()
                } else {
                    Ok(Vec::new())
                }
            }
            PlanDefinition::Simple(services) => services
                .iter()
                .map(|service| self.resolve_service_file(service))
                .collect(),
        }
    }

    fn resolve_service_file(&self, service: &str) -> Result<PathBuf, DispatchError> {
        project::resolve_named_file(self.ctx, &self.compose_file_name(service))
    }

    /// Logical service name -> declarative file name, defaulting to the
    /// literal name when untranslated.
    fn compose_file_name(&self, service: &str) -> String {
        self.project
            .containers
            .get(service)
            .cloned()
            .unwrap_or_else(|| service.to_string())
    }

    fn build_command(&self, files: &[PathBuf], tokens: &[String]) -> Vec<String> {
        let mut argv = vec![
            COMPOSE_TOOL.to_string(),
            "--project-name".to_string(),
            self.ctx.project_name.clone(),
        ];
        for file in files {
            argv.push("-f".to_string());
            argv.push(file.display().to_string());
        }
        argv.extend(tokens.iter().cloned());
        argv
    }
}
