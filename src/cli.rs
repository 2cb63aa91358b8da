// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// pocok: a multi-project, container-based development environment
/// orchestrator.
///
/// `pocok <verb> [plan]` dispatches a lifecycle verb (up, down, restart,
/// build, pull, ps, logs, config, pack, ...) against the active plan of
/// the project described by `pocok.yml` in the current directory. The plan
/// decides whether Docker Compose, Kubernetes or Helm handles the verb.
///
/// Management actions: `pocok plan ls` lists the project's plans;
/// `pocok init` creates a starter descriptor and compose file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The lifecycle verb or management action to run.
    pub command: String,

    /// Remaining arguments: usually the plan name; for `plan`, the
    /// subaction (`ls`).
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Developer mode: silently pull images before `start`.
    #[arg(long)]
    pub always_update: bool,

    /// Path to the project descriptor. Defaults to `pocok.yml` /
    /// `pocok.yaml` in the current directory.
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

impl Cli {
    /// The requested plan name, when the trailing arguments carry one.
    pub fn plan(&self) -> Option<&str> {
        if self.command == "plan" {
            None
        } else {
            self.args.first().map(String::as_str)
        }
    }
}

/// Maps user-facing verb aliases onto hierarchy verbs.
pub fn normalize_verb(command: &str) -> &str {
    match command {
        "log" => "logs",
        "project-config" => "config",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize_to_hierarchy_verbs() {
        assert_eq!(normalize_verb("log"), "logs");
        assert_eq!(normalize_verb("project-config"), "config");
        assert_eq!(normalize_verb("up"), "up");
    }

    #[test]
    fn plan_argument_is_positional() {
        let cli = Cli::parse_from(["pocok", "up", "demo"]);
        assert_eq!(cli.command, "up");
        assert_eq!(cli.plan(), Some("demo"));
    }

    #[test]
    fn plan_action_has_no_plan_argument() {
        let cli = Cli::parse_from(["pocok", "plan", "ls"]);
        assert_eq!(cli.command, "plan");
        assert_eq!(cli.plan(), None);
        assert_eq!(cli.args, vec!["ls".to_string()]);
    }
}
