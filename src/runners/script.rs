// src/runners/script.rs

use crate::constants::{
    DOCKER_TOOL, HOST_SYSTEM_VAR, SCRIPT_SANDBOX_IMAGE, SCRIPT_SANDBOX_MOUNT, SCRIPT_SANDBOX_USER,
};
use crate::core::environment;
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition, ProjectCompose, ScriptKind};
use crate::runners;
use crate::system::executor;

/// Runs plan hook scripts inside an ephemeral sandbox container: the
/// working directory is mounted and used as the container's working
/// directory, execution happens as a fixed non-root user, and the host
/// system name is injected. A nonzero exit from any script is fatal.
#[derive(Debug)]
pub struct ScriptPlanRunner<'a> {
    project: &'a ProjectCompose,
    ctx: &'a DispatchContext,
}

impl<'a> ScriptPlanRunner<'a> {
    pub fn new(project: &'a ProjectCompose, ctx: &'a DispatchContext) -> Self {
        Self { project, ctx }
    }

    /// Runs every script of the given kind, in declaration order. Absent
    /// script lists are a quiet no-op.
    pub fn run(&self, plan: &PlanDefinition, kind: ScriptKind) -> Result<(), DispatchError> {
        let scripts = self.scripts(plan, kind);
        if scripts.is_empty() {
            return Ok(());
        }

        // Scripts see the inherited process environment, not the resolved
        // plan environment; HOST_SYSTEM travels via the container flag.
        let env = std::env::vars().collect();
        for script in scripts {
            let argv = self.container_command(&script);
            log::info!("Script command: {argv:?}");
            runners::echo(&argv);
            executor::execute_command(&argv, &self.ctx.working_directory, &env)?;
        }
        Ok(())
    }

    /// Project-level scripts first (skipped for the generic `script`
    /// kind, which is plan-only), then plan-level ones.
    fn scripts(&self, plan: &PlanDefinition, kind: ScriptKind) -> Vec<String> {
        let mut scripts = Vec::new();
        if let Some(project_scripts) = self.project.scripts(kind) {
            scripts.extend(project_scripts.to_vec());
        }
        if let Some(structured) = plan.as_structured() {
            if let Some(plan_scripts) = structured.scripts(kind) {
                scripts.extend(plan_scripts.to_vec());
            }
        }
        scripts
    }

    fn container_command(&self, script: &str) -> Vec<String> {
        let mount = format!(
            "{}:{SCRIPT_SANDBOX_MOUNT}",
            self.ctx.working_directory.display()
        );
        vec![
            DOCKER_TOOL.to_string(),
            "run".to_string(),
            "-e".to_string(),
            format!("{HOST_SYSTEM_VAR}={}", environment::host_system()),
            "-u".to_string(),
            SCRIPT_SANDBOX_USER.to_string(),
            "-v".to_string(),
            mount,
            "-w".to_string(),
            SCRIPT_SANDBOX_MOUNT.to_string(),
            SCRIPT_SANDBOX_IMAGE.to_string(),
            "/bin/sh".to_string(),
            "-c".to_string(),
            script.to_string(),
        ]
    }
}
