//! ---
//! mc_section: "03-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module definitions, configurations, and builders."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::fmt;

use modcon_params::ParameterError;
use thiserror::Error;

use crate::definition::PrerequisiteKind;

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Specification errors detected before any module runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A module definition carried an empty name.
    #[error("module name must not be empty")]
    EmptyName,
    /// One definition violated one or more structural rules.
    #[error("module '{module}' is invalid: {}", join(.violations))]
    InvalidDefinition {
        /// Module the violations belong to.
        module: String,
        /// Every violation found in the definition.
        violations: Vec<DefinitionViolation>,
    },
    /// Two definitions share a name.
    #[error("module '{0}' is defined more than once")]
    DuplicateModule(String),
    /// Prerequisites naming modules that are not defined.
    #[error("undefined prerequisite modules: {}", join(.0))]
    MissingPrerequisites(Vec<MissingPrerequisite>),
    /// The prerequisite relation contains a cycle.
    #[error("module '{module}' is part of a dependency cycle: {}", .path.join(" -> "))]
    Cycle {
        /// Module at which the cycle was detected.
        module: String,
        /// Modules along the cycle.
        path: Vec<String>,
    },
    /// A definition was placed ahead of one of its prerequisites.
    #[error("module '{module}' is listed before its prerequisite '{prerequisite}'")]
    OutOfOrder {
        /// Dependent module.
        module: String,
        /// Prerequisite that does not precede it.
        prerequisite: String,
    },
    /// A requested module is not part of the configuration.
    #[error("module '{0}' is not defined in the configuration")]
    UnknownModule(String),
    /// The top level specification text is malformed.
    #[error("invalid specification: {0}")]
    Parameters(#[from] ParameterError),
    /// A `module=[...]` block is malformed.
    #[error("invalid module block #{index}: {source}")]
    ModuleBlock {
        /// Zero based position of the block in the specification.
        index: usize,
        /// Underlying parameter error.
        #[source]
        source: ParameterError,
    },
    /// The dependency graph rejected input that validation already accepted.
    #[error("internal ordering error: {0}")]
    Ordering(String),
}

/// A single structural problem in a module definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionViolation {
    /// The implementation identifier is empty.
    EmptyImplementation,
    /// The module lists itself as a prerequisite.
    SelfReference(PrerequisiteKind),
    /// A name appears more than once across requirements and predecessors.
    DuplicatePrerequisite(String),
}

impl fmt::Display for DefinitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionViolation::EmptyImplementation => f.write_str("implementation is empty"),
            DefinitionViolation::SelfReference(kind) => write!(f, "lists itself as a {kind}"),
            DefinitionViolation::DuplicatePrerequisite(name) => {
                write!(f, "prerequisite '{name}' is listed more than once")
            }
        }
    }
}

/// A prerequisite that names an undefined module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrerequisite {
    /// Module declaring the prerequisite.
    pub module: String,
    /// Name that could not be resolved.
    pub prerequisite: String,
    /// Whether it was declared as requirement or predecessor.
    pub kind: PrerequisiteKind,
}

impl fmt::Display for MissingPrerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' of module '{}'",
            self.kind, self.prerequisite, self.module
        )
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
