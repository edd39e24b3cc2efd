//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Container error taxonomy."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use modcon_config::ConfigError;
use modcon_params::ParameterError;
use thiserror::Error;

use crate::lifecycle::LifecycleViolation;
use crate::registry::RegistryError;

/// Why a container run failed.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("module '{module}': unknown implementation '{implementation}'")]
    UnknownImplementation { module: String, implementation: String },
    #[error("module '{module}' failed to configure")]
    Configure {
        module: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("module '{module}' could not be wired: {}", wiring_detail(.missing, .rejected))]
    Wiring {
        module: String,
        missing: Vec<String>,
        rejected: Vec<String>,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("module '{module}' failed to register commands")]
    RegisterCommands {
        module: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("module '{module}' failed to initialize")]
    Initialize {
        module: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("invalid execution block")]
    Execution(#[source] ParameterError),
    #[error("unknown commands in execution block: {}", .0.join(", "))]
    UnknownCommands(Vec<String>),
    #[error("command '{command}' takes no parameters but was given '{parameters}'")]
    UnexpectedParameters { command: String, parameters: String },
    #[error("command '{command}' of module '{module}' failed with parameters '{parameters}'")]
    Command {
        module: String,
        command: String,
        parameters: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleViolation),
}

impl ContainerError {
    /// Whether the failure stems from the specification rather than from
    /// module code running.
    pub fn is_specification(&self) -> bool {
        matches!(
            self,
            ContainerError::Configuration(_)
                | ContainerError::UnknownImplementation { .. }
                | ContainerError::Wiring { .. }
                | ContainerError::Registry(_)
                | ContainerError::Execution(_)
                | ContainerError::UnknownCommands(_)
                | ContainerError::UnexpectedParameters { .. }
        )
    }
}

fn wiring_detail(missing: &[String], rejected: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing requirements {}", missing.join(", ")));
    }
    if !rejected.is_empty() {
        parts.push(format!("rejected requirements {}", rejected.join(", ")));
    }
    parts.join("; ")
}
