// src/runners/kubernetes.rs

use crate::constants::{KUBERNETES_TOOL, MANIFEST_SUFFIXES};
use crate::core::environment::EnvironmentMap;
use crate::core::{paths, project};
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition};
use crate::runners;
use crate::system::executor;
use std::path::{Path, PathBuf};

/// Drives kubectl for one plan. Every resolved manifest file becomes its
/// own `kubectl <tokens...> -f <file>` invocation, in sorted file order.
#[derive(Debug)]
pub struct KubernetesRunner<'a> {
    ctx: &'a DispatchContext,
}

impl<'a> KubernetesRunner<'a> {
    pub fn new(ctx: &'a DispatchContext) -> Self {
        Self { ctx }
    }

    /// Runs the command tokens once per manifest file. Any nonzero exit
    /// aborts the remaining files.
    pub fn run(
        &self,
        plan: &PlanDefinition,
        tokens: &[String],
        env: &EnvironmentMap,
    ) -> Result<(), DispatchError> {
        for file in self.manifest_files(plan)? {
            let argv = build_command(tokens, &file);
            log::info!("Kubernetes command: {argv:?}");
            runners::echo(&argv);
            executor::execute_command(&argv, &self.ctx.working_directory, env)?;
        }
        Ok(())
    }

    /// Explicit `kubernetes-file` entries, or a sorted scan of the
    /// declared `kubernetes-dir` directories.
    pub fn manifest_files(&self, plan: &PlanDefinition) -> Result<Vec<PathBuf>, DispatchError> {
        let Some(structured) = plan.as_structured() else {
            return Ok(Vec::new());
        };

        if let Some(names) = &structured.kubernetes_file {
            runners::resolve_named_files(self.ctx, &names.to_vec())
        } else if let Some(dirs) = &structured.kubernetes_dir {
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
}

fn build_command(tokens: &[String], file: &Path) -> Vec<String> {
    let mut argv = vec![KUBERNETES_TOOL.to_string()];
    argv.extend(tokens.iter().cloned());
    argv.push("-f".to_string());
    argv.push(file.display().to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(repo: &Path) -> DispatchContext {
        DispatchContext {
            project_name: "sample".to_string(),
            repo_dir: repo.to_path_buf(),
            working_directory: repo.to_path_buf(),
            plan_name: "cluster".to_string(),
            always_update: false,
        }
    }

    fn plan(yaml: &str) -> PlanDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn one_invocation_per_file_shape() {
        let argv = build_command(&["apply".to_string()], &PathBuf::from("deploy.yml"));
        assert_eq!(argv, vec!["kubectl", "apply", "-f", "deploy.yml"]);
    }

    #[test]
    fn explicit_files_are_resolved_in_order() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("svc.yml"), "").unwrap();
        fs::write(repo.path().join("deploy.yml"), "").unwrap();

        let ctx = context(repo.path());
        let runner = KubernetesRunner::new(&ctx);
        let plan = plan("kubernetes-file: [deploy.yml, svc.yml]");

        let files = runner.manifest_files(&plan).unwrap();
        assert_eq!(
            files,
            vec![repo.path().join("deploy.yml"), repo.path().join("svc.yml")]
        );
    }

    #[test]
    fn directory_scan_is_sorted_and_filtered() {
        let repo = TempDir::new().unwrap();
        let dir = repo.path().join("kubernetes");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("20-svc.yaml"), "").unwrap();
        fs::write(dir.join("10-deploy.yml"), "").unwrap();
        fs::write(dir.join("README.md"), "").unwrap();

        let ctx = context(repo.path());
        let runner = KubernetesRunner::new(&ctx);
        let plan = plan("kubernetes-dir: kubernetes");

        let files = runner.manifest_files(&plan).unwrap();
        assert_eq!(
            files,
            vec![
                repo.path().join("kubernetes/10-deploy.yml"),
                repo.path().join("kubernetes/20-svc.yaml")
            ]
        );
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let repo = TempDir::new().unwrap();
        let ctx = context(repo.path());
        let runner = KubernetesRunner::new(&ctx);
        let plan = plan("kubernetes-file: ghost.yml");

        assert!(matches!(
            runner.manifest_files(&plan),
            Err(DispatchError::MissingFile { .. })
        ));
    }
}
