// src/constants.rs

/// Descriptor file names probed, in order, in the working directory.
pub const PROJECT_DESCRIPTOR_FILENAMES: [&str; 2] = ["pocok.yml", "pocok.yaml"];

/// The Docker Compose binary driven by the Docker plan runner.
pub const COMPOSE_TOOL: &str = "docker-compose";

/// The plain Docker binary (script sandbox, tool presence probe).
pub const DOCKER_TOOL: &str = "docker";

/// The Kubernetes cluster CLI.
pub const KUBERNETES_TOOL: &str = "kubectl";

/// The Helm binary.
pub const HELM_TOOL: &str = "helm";

/// Helm release names are synthesized as `pocok-<project-name>`.
pub const HELM_RELEASE_PREFIX: &str = "pocok-";

/// Image used as the ephemeral sandbox for plan scripts.
pub const SCRIPT_SANDBOX_IMAGE: &str = "alpine:latest";

/// Numeric user the script sandbox runs as.
pub const SCRIPT_SANDBOX_USER: &str = "1000";

/// Mount point for the working directory inside the script sandbox.
pub const SCRIPT_SANDBOX_MOUNT: &str = "/usr/local";

/// Synthetic environment key naming the host operating system.
pub const HOST_SYSTEM_VAR: &str = "HOST_SYSTEM";

/// Suffix of environment files collected from compose/manifest directories.
pub const ENV_FILE_SUFFIX: &str = ".env";

/// Suffixes accepted when scanning directories for declarative files.
pub const MANIFEST_SUFFIXES: [&str; 2] = [".yml", ".yaml"];
