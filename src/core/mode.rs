// src/core/mode.rs

use crate::models::{BackendMode, PlanDefinition};

/// Decides which container backend a plan targets.
///
/// Priority order: any `kubernetes-*` field selects Kubernetes, else any
/// `helm-*` field selects Helm, else Docker. A bare service list is always
/// Docker. Detection is total - there is no error path - and runs exactly
/// once, when the dispatcher is constructed.
pub fn detect(plan: &PlanDefinition) -> BackendMode {
    let Some(structured) = plan.as_structured() else {
        return BackendMode::Docker;
    };

    if structured.kubernetes_file.is_some() || structured.kubernetes_dir.is_some() {
        BackendMode::Kubernetes
    } else if structured.helm_file.is_some() || structured.helm_dir.is_some() {
        BackendMode::Helm
    } else {
        BackendMode::Docker
    }
}
