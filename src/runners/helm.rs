// src/runners/helm.rs

use crate::constants::{HELM_RELEASE_PREFIX, HELM_TOOL};
use crate::core::environment::EnvironmentMap;
use crate::core::paths;
use crate::error::DispatchError;
use crate::models::{DispatchContext, PlanDefinition};
use crate::runners;
use crate::system::executor::{self, ExecutionError};
use std::path::PathBuf;

/// Drives helm for one plan. A single invocation per command sequence
/// entry, addressed at the release `pocok-<project-name>`.
///
/// Failure policy deviates from the other adapters on purpose: helm
/// commands are routinely re-run against already-converged state (e.g.
/// installing a release that exists), so a nonzero exit is logged and
/// swallowed instead of aborting the dispatch. This can mask genuine
/// chart errors; the behavior is preserved deliberately.
#[derive(Debug)]
pub struct HelmRunner<'a> {
    ctx: &'a DispatchContext,
}

impl<'a> HelmRunner<'a> {
    pub fn new(ctx: &'a DispatchContext) -> Self {
        Self { ctx }
    }

    pub fn run(
        &self,
        plan: &PlanDefinition,
        tokens: &[String],
        env: &EnvironmentMap,
    ) -> Result<(), DispatchError> {
        let (chart_dir, values_files) = self.chart_inputs(plan)?;
        let argv = self.build_command(tokens, chart_dir.as_ref(), &values_files);
        log::info!("Helm command: {argv:?}");
        runners::echo(&argv);

        tolerate_nonzero(
            executor::execute_command(&argv, &self.ctx.working_directory, env)
                .map_err(DispatchError::from),
        )
    }

    /// The chart directory (first `helm-dir` entry only) and the resolved
    /// value-override files, as declared by the plan.
    fn chart_inputs(
        &self,
        plan: &PlanDefinition,
    ) -> Result<(Option<PathBuf>, Vec<PathBuf>), DispatchError> {
        let Some(structured) = plan.as_structured() else {
            return Ok((None, Vec::new()));
        };

        if let Some(names) = &structured.helm_file {
            let files = runners::resolve_named_files(self.ctx, &names.to_vec())?;
            return Ok((None, files));
        }

        if let Some(dirs) = &structured.helm_dir {
            let directories = dirs.to_vec();
            if directories.len() > 1 {
                log::warn!("Helm plan uses only the first directory from helm-dir");
            }
            let chart = directories.first().map(|dir| {
                paths::relative_from_repo(&self.ctx.repo_dir, &self.ctx.working_directory)
                    .join(dir)
            });
            return Ok((chart, Vec::new()));
        }

        Ok((None, Vec::new()))
    }

    fn build_command(
        &self,
        tokens: &[String],
        chart_dir: Option<&PathBuf>,
        values_files: &[PathBuf],
    ) -> Vec<String> {
        let mut argv = vec![HELM_TOOL.to_string()];
        argv.extend(tokens.iter().cloned());
        argv.push(format!("{HELM_RELEASE_PREFIX}{}", self.ctx.project_name));

        // Chart and value overrides only make sense for install/upgrade.
        let installs = argv.iter().any(|t| t == "install" || t == "upgrade");
        if installs {
            if let Some(chart) = chart_dir {
                argv.push(chart.display().to_string());
            }
            for file in values_files {
                argv.push("-f".to_string());
                argv.push(file.display().to_string());
            }
        }
        argv
    }
}

/// The Helm exemption: a nonzero exit status is recovered and logged;
/// every other failure (missing files, spawn errors) stays fatal.
fn tolerate_nonzero(result: Result<(), DispatchError>) -> Result<(), DispatchError> {
    match result {
        Err(DispatchError::Process(ExecutionError::NonZeroExit { command, code })) => {
            log::warn!("Helm command '{command}' exited with status code {code}; continuing.");
            Ok(())
        }
        other => other,
    }
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
            plan_name: "chart".to_string(),
            always_update: false,
        }
    }

    fn plan(yaml: &str) -> PlanDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn install_appends_release_chart_and_values() {
        let repo = TempDir::new().unwrap();
        let ctx = context(repo.path());
        let runner = HelmRunner::new(&ctx);

        let argv = runner.build_command(
            &["install".to_string()],
            Some(&PathBuf::from("chart")),
            &[PathBuf::from("values.yml")],
        );
        assert_eq!(
            argv,
            vec!["helm", "install", "pocok-sample", "chart", "-f", "values.yml"]
        );
    }

    #[test]
    fn non_install_verbs_take_only_the_release_name() {
        let repo = TempDir::new().unwrap();
        let ctx = context(repo.path());
        let runner = HelmRunner::new(&ctx);

        let argv = runner.build_command(
            &["delete".to_string()],
            Some(&PathBuf::from("chart")),
            &[PathBuf::from("values.yml")],
        );
        assert_eq!(argv, vec!["helm", "delete", "pocok-sample"]);
    }

    #[test]
    fn only_the_first_helm_dir_is_used() {
        let repo = TempDir::new().unwrap();
        let ctx = context(repo.path());
        let runner = HelmRunner::new(&ctx);

        let (chart, values) = runner.chart_inputs(&plan("helm-dir: [a, b]")).unwrap();
        assert_eq!(chart, Some(PathBuf::from("a")));
        assert!(values.is_empty());
    }

    #[test]
    fn helm_files_resolve_as_value_overrides() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("values.yml"), "").unwrap();
        let ctx = context(repo.path());
        let runner = HelmRunner::new(&ctx);

        let (chart, values) = runner.chart_inputs(&plan("helm-file: values.yml")).unwrap();
        assert_eq!(chart, None);
        assert_eq!(values, vec![repo.path().join("values.yml")]);
    }

    #[test]
    fn nonzero_exit_is_swallowed_but_other_errors_are_not() {
        let swallowed = tolerate_nonzero(Err(DispatchError::Process(
            ExecutionError::NonZeroExit {
                command: "helm install pocok-sample".to_string(),
                code: 1,
            },
        )));
        assert!(swallowed.is_ok());

        let fatal = tolerate_nonzero(Err(DispatchError::MissingFile {
            file: "values.yml".to_string(),
            project: "sample".to_string(),
        }));
        assert!(fatal.is_err());
    }
}
