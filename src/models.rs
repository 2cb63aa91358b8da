// src/models.rs

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// --- PROJECT DESCRIPTOR MODELS (what is read from pocok.yml) ---

/// A value that may be authored as a single string or as a list of strings.
/// Descriptor fields like `environment.include` or `docker-compose-file`
/// accept both shapes.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl OneOrMany {
    /// Normalizes to a list, the only shape the core works with.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Many(values) => values.clone(),
            Self::One(value) => vec![value.clone()],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Many(values) => values.len(),
            Self::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Many(values) => values.first().map(String::as_str),
            Self::One(value) => Some(value.as_str()),
        }
    }
}

/// The `environment` block of the project or of a structured plan.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInclude {
    pub include: OneOrMany,
}

/// A plan as authored in the descriptor: either a bare list of service
/// names (implicit simple Docker mode) or a structured object.
/// The shape is resolved once at load time; everything downstream matches
/// on this variant instead of re-inspecting raw YAML.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PlanDefinition {
    Simple(Vec<String>),
    Structured(StructuredPlan),
}

impl PlanDefinition {
    pub fn as_structured(&self) -> Option<&StructuredPlan> {
        match self {
            Self::Structured(plan) => Some(plan),
            Self::Simple(_) => None,
        }
    }
}

/// The structured plan shape. At most one of the three backend-selecting
/// field groups (`docker-compose-*`, `kubernetes-*`, `helm-*`) is expected;
/// mode detection gives `kubernetes-*` priority, then `helm-*`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredPlan {
    #[serde(rename = "docker-compose-file")]
    pub docker_compose_file: Option<OneOrMany>,
    #[serde(rename = "docker-compose-dir")]
    pub docker_compose_dir: Option<OneOrMany>,
    #[serde(rename = "kubernetes-file")]
    pub kubernetes_file: Option<OneOrMany>,
    #[serde(rename = "kubernetes-dir")]
    pub kubernetes_dir: Option<OneOrMany>,
    #[serde(rename = "helm-file")]
    pub helm_file: Option<OneOrMany>,
    #[serde(rename = "helm-dir")]
    pub helm_dir: Option<OneOrMany>,
    pub script: Option<OneOrMany>,
    pub before_script: Option<OneOrMany>,
    pub after_script: Option<OneOrMany>,
    pub init_script: Option<OneOrMany>,
    pub environment: Option<EnvironmentInclude>,
}

impl StructuredPlan {
    /// The script list declared for a given kind, if any.
    pub fn scripts(&self, kind: ScriptKind) -> Option<&OneOrMany> {
        match kind {
            ScriptKind::Script => self.script.as_ref(),
            ScriptKind::BeforeScript => self.before_script.as_ref(),
            ScriptKind::AfterScript => self.after_script.as_ref(),
            ScriptKind::InitScript => self.init_script.as_ref(),
        }
    }
}

/// The parsed configuration tree for one project. Immutable after load;
/// owned by the dispatcher for the duration of one command execution.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectCompose {
    /// Plan name -> plan definition.
    #[serde(default)]
    pub plan: BTreeMap<String, PlanDefinition>,
    /// Logical service name -> declarative file name.
    #[serde(default)]
    pub containers: BTreeMap<String, String>,
    /// Project-level default environment include.
    pub environment: Option<EnvironmentInclude>,
    /// Project-level hook scripts, merged before plan-level ones.
    pub before_script: Option<OneOrMany>,
    pub after_script: Option<OneOrMany>,
    pub init_script: Option<OneOrMany>,
}

impl ProjectCompose {
    /// Project-level script list for a kind. The generic `script` kind is
    /// plan-only and never declared at project level.
    pub fn scripts(&self, kind: ScriptKind) -> Option<&OneOrMany> {
        match kind {
            ScriptKind::Script => None,
            ScriptKind::BeforeScript => self.before_script.as_ref(),
            ScriptKind::AfterScript => self.after_script.as_ref(),
            ScriptKind::InitScript => self.init_script.as_ref(),
        }
    }
}

// --- RUNTIME MODELS ---

/// The container backend a plan targets. Fixed once detected; never
/// changes during a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Docker,
    Kubernetes,
    Helm,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Docker => "Docker",
            Self::Kubernetes => "Kubernetes",
            Self::Helm => "Helm",
        };
        write!(f, "{name}")
    }
}

/// The kind of hook script the script runner is asked to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// The plan's main `script` list (replaces the backend adapter on
    /// start/up).
    Script,
    BeforeScript,
    AfterScript,
    InitScript,
}

/// Read-only working context, resolved once per dispatcher instance and
/// threaded through every adapter call. Replaces the ambient mutable
/// state holder of earlier designs.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Project name; also the compose project name and the Helm release
    /// suffix.
    pub project_name: String,
    /// Root of the checked-out project repository.
    pub repo_dir: PathBuf,
    /// Where external process invocations run.
    pub working_directory: PathBuf,
    /// Name of the active plan.
    pub plan_name: String,
    /// Developer mode: silently pull before start.
    pub always_update: bool,
}
