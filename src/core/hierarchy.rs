// src/core/hierarchy.rs

use crate::error::DispatchError;
use crate::models::BackendMode;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The bundled hierarchy resource, compiled into the binary.
const BUNDLED_HIERARCHY: &str = include_str!("../../resources/command-hierarchy.yml");

/// One command in a backend sequence: either a ready argv or a single
/// string split into tokens on demand.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandTokens {
    Argv(Vec<String>),
    Line(String),
}

impl CommandTokens {
    /// The argv tokens of this command.
    pub fn tokens(&self) -> Result<Vec<String>, DispatchError> {
        match self {
            Self::Argv(tokens) => Ok(tokens.clone()),
            Self::Line(line) => shlex::split(line).ok_or_else(|| {
                DispatchError::ConfigLoad(format!(
                    "Command hierarchy contains an unparseable command line: '{line}'"
                ))
            }),
        }
    }
}

/// Built-in side-effect operations invokable around a command sequence.
/// Validated while the hierarchy is parsed; an unknown method name in the
/// source is a load failure, not a dispatch-time surprise.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMethod {
    #[serde(rename = "pull-before-start")]
    PullBeforeStart,
    #[serde(rename = "pack")]
    Pack,
}

/// One hierarchy entry, keyed by lifecycle verb.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommandHierarchyEntry {
    #[serde(default)]
    pub docker: Vec<CommandTokens>,
    #[serde(default)]
    pub kubernetes: Vec<CommandTokens>,
    #[serde(default)]
    pub helm: Vec<CommandTokens>,
    #[serde(default)]
    pub before: bool,
    #[serde(default)]
    pub after: bool,
    #[serde(default)]
    pub premethods: Vec<HookMethod>,
    #[serde(default)]
    pub postmethods: Vec<HookMethod>,
}

impl CommandHierarchyEntry {
    /// The command sequence for a backend mode.
    pub fn sequence(&self, mode: BackendMode) -> &[CommandTokens] {
        match mode {
            BackendMode::Docker => &self.docker,
            BackendMode::Kubernetes => &self.kubernetes,
            BackendMode::Helm => &self.helm,
        }
    }
}

type HierarchyTable = BTreeMap<String, CommandHierarchyEntry>;

lazy_static! {
    /// Parsed once, read-only for the process lifetime. A malformed
    /// bundled resource surfaces as `ConfigLoad` on first lookup.
    static ref HIERARCHY: Result<HierarchyTable, String> =
        parse(BUNDLED_HIERARCHY).map_err(|e| e.to_string());
}

/// Parses a hierarchy document. Split out from the static so malformed
/// sources are testable.
pub fn parse(source: &str) -> Result<HierarchyTable, DispatchError> {
    serde_yaml::from_str(source).map_err(|e| {
        DispatchError::ConfigLoad(format!("Command hierarchy has wrong YAML format: {e}"))
    })
}

/// Looks up a lifecycle verb in the process-wide hierarchy.
pub fn lookup(verb: &str) -> Result<&'static CommandHierarchyEntry, DispatchError> {
    let table = HIERARCHY
        .as_ref()
        .map_err(|message| DispatchError::ConfigLoad(message.clone()))?;
    table
        .get(verb)
        .ok_or_else(|| DispatchError::UnknownCommand(verb.to_string()))
}
