// src/core/dispatcher.rs

use crate::core::environment::{EnvironmentMap, EnvironmentResolver};
use crate::core::hierarchy::{self, CommandHierarchyEntry, CommandTokens, HookMethod};
use crate::core::mode;
use crate::error::DispatchError;
use crate::models::{BackendMode, DispatchContext, PlanDefinition, ProjectCompose, ScriptKind};
use crate::runners::docker::DockerPlanRunner;
use crate::runners::helm::HelmRunner;
use crate::runners::kubernetes::KubernetesRunner;
use crate::runners::script::ScriptPlanRunner;
use crate::system::tools;

/// Routes lifecycle verbs to the backend adapters.
///
/// Construction resolves the active plan, detects its backend mode (fixed
/// thereafter) and verifies the backend tool is present - all fatal before
/// any verb is dispatched. Per verb, the dispatcher looks up the hierarchy
/// entry, runs pre-hooks, drives the adapter through the verb's command
/// sequence, then runs post-hooks. Everything is strictly sequential.
#[derive(Debug)]
pub struct Dispatcher {
    project: ProjectCompose,
    ctx: DispatchContext,
    mode: BackendMode,
}

impl Dispatcher {
    pub fn new(project: ProjectCompose, ctx: DispatchContext) -> Result<Self, DispatchError> {
        let plan = project.plan.get(&ctx.plan_name).ok_or_else(|| {
            DispatchError::ConfigLoad(format!(
                "Plan '{}' not found in project '{}'",
                ctx.plan_name, ctx.project_name
            ))
        })?;
        let mode = mode::detect(plan);
        log::debug!("Plan '{}' runs in {mode} mode", ctx.plan_name);
        tools::check(mode)?;
        Ok(Self { project, ctx, mode })
    }

    /// Construction without the tool probe, for tests that never spawn.
    #[cfg(test)]
    fn new_unchecked(project: ProjectCompose, ctx: DispatchContext) -> Self {
        let plan = project.plan.get(&ctx.plan_name).expect("test plan exists");
        let mode = mode::detect(plan);
        Self { project, ctx, mode }
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Dispatches one lifecycle verb.
    pub fn run(&self, verb: &str) -> Result<(), DispatchError> {
        let entry = hierarchy::lookup(verb)?;
        let plan = self.plan();

        self.pre_run(entry, plan)?;
        self.run_main(verb, entry, plan)?;
        self.after_run(entry, plan)
    }

    /// Runs the active plan's scripts of one kind, outside any verb
    /// dispatch (used by the `init` flow).
    pub fn run_script(&self, kind: ScriptKind) -> Result<(), DispatchError> {
        ScriptPlanRunner::new(&self.project, &self.ctx).run(self.plan(), kind)
    }

    fn run_main(
        &self,
        verb: &str,
        entry: &CommandHierarchyEntry,
        plan: &PlanDefinition,
    ) -> Result<(), DispatchError> {
        // A plan-declared script replaces the backend adapter entirely:
        // start/up run it, every other verb has an empty main phase.
        if let Some(structured) = plan.as_structured() {
            if structured.script.is_some() {
                if verb == "start" || verb == "up" {
                    return ScriptPlanRunner::new(&self.project, &self.ctx)
                        .run(plan, ScriptKind::Script);
                }
                return Ok(());
            }
        }

        match self.mode {
            BackendMode::Kubernetes => {
                let runner = KubernetesRunner::new(&self.ctx);
                for command in backend_sequence(entry, self.mode, verb)? {
                    let env = self.resolve_env(plan)?;
                    runner.run(plan, &command.tokens()?, &env)?;
                }
            }
            BackendMode::Helm => {
                let runner = HelmRunner::new(&self.ctx);
                for command in backend_sequence(entry, self.mode, verb)? {
                    let env = self.resolve_env(plan)?;
                    runner.run(plan, &command.tokens()?, &env)?;
                }
            }
            BackendMode::Docker => {
                let runner = DockerPlanRunner::new(&self.project, &self.ctx);
                // Developer mode: refresh images before starting.
                if self.ctx.always_update && verb == "start" {
                    let env = self.resolve_env(plan)?;
                    runner.run(plan, &["pull".to_string()], &env)?;
                }
                for command in entry.sequence(self.mode) {
                    let env = self.resolve_env(plan)?;
                    runner.run(plan, &command.tokens()?, &env)?;
                }
            }
        }
        Ok(())
    }

    fn pre_run(
        &self,
        entry: &CommandHierarchyEntry,
        plan: &PlanDefinition,
    ) -> Result<(), DispatchError> {
        if entry.before {
            ScriptPlanRunner::new(&self.project, &self.ctx)
                .run(plan, ScriptKind::BeforeScript)?;
        }
        for method in &entry.premethods {
            self.run_method(*method, plan)?;
        }
        Ok(())
    }

    fn after_run(
        &self,
        entry: &CommandHierarchyEntry,
        plan: &PlanDefinition,
    ) -> Result<(), DispatchError> {
        for method in &entry.postmethods {
            self.run_method(*method, plan)?;
        }
        if entry.after {
            ScriptPlanRunner::new(&self.project, &self.ctx)
                .run(plan, ScriptKind::AfterScript)?;
        }
        Ok(())
    }

    fn run_method(&self, method: HookMethod, plan: &PlanDefinition) -> Result<(), DispatchError> {
        match method {
            HookMethod::PullBeforeStart => {
                let env = self.resolve_env(plan)?;
                DockerPlanRunner::new(&self.project, &self.ctx)
                    .run(plan, &["pull".to_string()], &env)
            }
            HookMethod::Pack => {
                // Archive creation lives outside this core; the resolved
                // file list and environment are the packaging contract.
                let files = DockerPlanRunner::new(&self.project, &self.ctx).docker_files(plan)?;
                let env = self.resolve_env(plan)?;
                log::info!(
                    "Resolved {} compose file(s) and {} variables for packaging project '{}'",
                    files.len(),
                    env.len(),
                    self.ctx.project_name
                );
                Ok(())
            }
        }
    }

    fn resolve_env(&self, plan: &PlanDefinition) -> Result<EnvironmentMap, DispatchError> {
        EnvironmentResolver::new(&self.project, &self.ctx).resolve(plan)
    }

    fn plan(&self) -> &PlanDefinition {
        self.project
            .plan
            .get(&self.ctx.plan_name)
            .expect("plan existence verified at construction")
    }
}

/// The command sequence for the active backend. Kubernetes and Helm treat
/// an empty sequence as "verb unsupported under this backend", checked
/// before any process is invoked.
fn backend_sequence<'e>(
    entry: &'e CommandHierarchyEntry,
    mode: BackendMode,
    verb: &str,
) -> Result<&'e [CommandTokens], DispatchError> {
    let sequence = entry.sequence(mode);
    if sequence.is_empty() && matches!(mode, BackendMode::Kubernetes | BackendMode::Helm) {
        return Err(DispatchError::BackendUnsupported {
            verb: verb.to_string(),
            mode,
        });
    }
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn context(repo: &Path, plan_name: &str) -> DispatchContext {
        DispatchContext {
            project_name: "sample".to_string(),
            repo_dir: repo.to_path_buf(),
            working_directory: repo.to_path_buf(),
            plan_name: plan_name.to_string(),
            always_update: false,
        }
    }

    fn compose(yaml: &str) -> ProjectCompose {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn unknown_verb_is_rejected_before_anything_runs() {
        let project = compose("plan: {default: [web]}");
        let dispatcher =
            Dispatcher::new_unchecked(project, context(Path::new("/tmp"), "default"));
        let err = dispatcher.run("frobnicate").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand(_)));
    }

    #[test]
    fn build_under_kubernetes_is_unsupported() {
        let project = compose("plan: {cluster: {kubernetes-dir: kubernetes}}");
        let dispatcher =
            Dispatcher::new_unchecked(project, context(Path::new("/tmp"), "cluster"));
        assert_eq!(dispatcher.mode(), BackendMode::Kubernetes);

        let err = dispatcher.run("build").unwrap_err();
        match err {
            DispatchError::BackendUnsupported { verb, mode } => {
                assert_eq!(verb, "build");
                assert_eq!(mode, BackendMode::Kubernetes);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_docker_sequence_is_not_an_error() {
        let entry = CommandHierarchyEntry::default();
        assert!(backend_sequence(&entry, BackendMode::Docker, "pack").is_ok());
        assert!(backend_sequence(&entry, BackendMode::Helm, "pack").is_err());
    }

    #[test]
    fn construction_fails_for_a_missing_plan() {
        let project = compose("plan: {default: [web]}");
        let err =
            Dispatcher::new(project, context(Path::new("/tmp"), "nope")).unwrap_err();
        assert!(matches!(err, DispatchError::ConfigLoad(_)));
    }

    #[test]
    fn mode_is_fixed_at_construction() {
        let project = compose(
            r#"
plan:
  chart:
    helm-dir: chart
"#,
        );
        let dispatcher = Dispatcher::new_unchecked(project, context(Path::new("/tmp"), "chart"));
        assert_eq!(dispatcher.mode(), BackendMode::Helm);
    }

    // Full-dispatch tests drive the adapters against shim binaries that
    // record their argv. The shim directory reaches the adapters through
    // an included environment file overriding PATH, since spawns use the
    // resolved plan environment.
    #[cfg(unix)]
    mod flow {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use tempfile::TempDir;

        fn install_shim(dir: &Path, name: &str, log: &Path, exit_code: i32) {
            let path = dir.join(name);
            fs::write(
                &path,
                format!("#!/bin/sh\necho \"$@\" >> \"{}\"\nexit {exit_code}\n", log.display()),
            )
            .unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        /// A temp repo with shim tools under `bin/`, a `tools.env` file
        /// pointing PATH at them, and an empty `compose.yml`.
        fn shim_repo(shims: &[(&str, i32)]) -> (TempDir, PathBuf) {
            let repo = TempDir::new().unwrap();
            let bin = repo.path().join("bin");
            fs::create_dir(&bin).unwrap();
            let log = repo.path().join("invocations.log");
            for (name, code) in shims {
                install_shim(&bin, name, &log, *code);
            }
            fs::write(
                repo.path().join("tools.env"),
                format!("PATH={}\n", bin.display()),
            )
            .unwrap();
            fs::write(repo.path().join("compose.yml"), "").unwrap();
            (repo, log)
        }

        fn logged_lines(log: &Path) -> Vec<String> {
            fs::read_to_string(log)
                .map(|content| content.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }

        const COMPOSE_PLAN: &str = r#"
plan:
  default:
    docker-compose-file: compose.yml
    environment:
      include: tools.env
"#;

        #[test]
        fn up_issues_exactly_one_compose_invocation() {
            let (repo, log) = shim_repo(&[("docker-compose", 0)]);
            let dispatcher =
                Dispatcher::new_unchecked(compose(COMPOSE_PLAN), context(repo.path(), "default"));

            dispatcher.run("up").unwrap();

            let lines = logged_lines(&log);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].starts_with("--project-name sample -f "));
            assert!(lines[0].ends_with(" up -d"));
        }

        #[test]
        fn always_update_start_pulls_before_the_main_sequence() {
            let (repo, log) = shim_repo(&[("docker-compose", 0)]);
            let mut ctx = context(repo.path(), "default");
            ctx.always_update = true;
            let dispatcher = Dispatcher::new_unchecked(compose(COMPOSE_PLAN), ctx);

            dispatcher.run("start").unwrap();

            let lines = logged_lines(&log);
            assert_eq!(lines.len(), 2);
            assert!(lines[0].ends_with(" pull"));
            assert!(lines[1].ends_with(" start"));
        }

        #[test]
        fn failing_before_script_stops_dispatch_ahead_of_the_adapter() {
            let (repo, log) = shim_repo(&[("docker-compose", 0)]);
            let project = compose(
                r#"
plan:
  default:
    docker-compose-file: compose.yml
    before_script: exit 7
    environment:
      include: tools.env
"#,
            );
            let dispatcher = Dispatcher::new_unchecked(project, context(repo.path(), "default"));

            // The sandboxed hook fails regardless of how far it gets, and
            // the compose sequence must not have started.
            assert!(dispatcher.run("up").is_err());
            assert!(logged_lines(&log).is_empty());
        }

        #[test]
        fn after_script_runs_once_the_main_sequence_completed() {
            let (repo, log) = shim_repo(&[("docker-compose", 0)]);
            let project = compose(
                r#"
after_script: exit 7
plan:
  default:
    docker-compose-file: compose.yml
    environment:
      include: tools.env
"#,
            );
            let dispatcher = Dispatcher::new_unchecked(project, context(repo.path(), "default"));

            // stop carries the after hook; the main sequence ran first and
            // the hook failure still propagates.
            assert!(dispatcher.run("stop").is_err());
            let lines = logged_lines(&log);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].ends_with(" stop"));
        }

        #[test]
        fn script_plan_dispatches_no_backend_for_other_verbs() {
            let (repo, log) = shim_repo(&[("docker-compose", 0)]);
            let project = compose(
                r#"
plan:
  default:
    script: echo hi
    environment:
      include: tools.env
"#,
            );
            let dispatcher = Dispatcher::new_unchecked(project, context(repo.path(), "default"));

            dispatcher.run("stop").unwrap();
            assert!(logged_lines(&log).is_empty());
        }

        #[test]
        fn helm_failure_is_tolerated_within_a_dispatch() {
            let (repo, log) = shim_repo(&[("helm", 1)]);
            fs::create_dir(repo.path().join("chart")).unwrap();
            let project = compose(
                r#"
plan:
  default:
    helm-dir: chart
    environment:
      include: tools.env
"#,
            );
            let dispatcher = Dispatcher::new_unchecked(project, context(repo.path(), "default"));

            dispatcher.run("up").unwrap();

            let lines = logged_lines(&log);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].starts_with("install pocok-sample"));
        }
    }
}
