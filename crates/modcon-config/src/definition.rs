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

use crate::error::{ConfigError, DefinitionViolation, Result};

/// How a prerequisite relates to the module that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrerequisiteKind {
    /// Ordered before the module and handed to it during wiring.
    Requirement,
    /// Ordered before the module only.
    Predecessor,
}

impl fmt::Display for PrerequisiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrerequisiteKind::Requirement => f.write_str("requirement"),
            PrerequisiteKind::Predecessor => f.write_str("predecessor"),
        }
    }
}

/// Immutable description of one module instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    name: String,
    implementation: String,
    requirements: Vec<String>,
    predecessors: Vec<String>,
    configuration: String,
}

impl ModuleDefinition {
    /// Validate and construct a definition.
    ///
    /// Every violation found is reported together; an empty name is reported
    /// on its own since nothing else can be attributed to the module.
    pub fn new(
        name: impl Into<String>,
        implementation: impl Into<String>,
        requirements: Vec<String>,
        predecessors: Vec<String>,
        configuration: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let trimmed = |names: Vec<String>| -> Vec<String> {
            names.iter().map(|n| n.trim().to_owned()).collect()
        };
        let definition = Self {
            name,
            implementation: implementation.into().trim().to_owned(),
            requirements: trimmed(requirements),
            predecessors: trimmed(predecessors),
            configuration: configuration.into(),
        };

        let violations = definition.violations();
        if !violations.is_empty() {
            return Err(ConfigError::InvalidDefinition {
                module: definition.name,
                violations,
            });
        }
        Ok(definition)
    }

    fn violations(&self) -> Vec<DefinitionViolation> {
        let mut violations = Vec::new();
        if self.implementation.is_empty() {
            violations.push(DefinitionViolation::EmptyImplementation);
        }
        let mut seen: Vec<&str> = Vec::new();
        let mut reported: Vec<&str> = Vec::new();
        for (kind, prerequisite) in self.prerequisites_with_kind() {
            if prerequisite == self.name {
                let violation = DefinitionViolation::SelfReference(kind);
                if !violations.contains(&violation) {
                    violations.push(violation);
                }
                continue;
            }
            if seen.contains(&prerequisite) {
                if !reported.contains(&prerequisite) {
                    violations.push(DefinitionViolation::DuplicatePrerequisite(
                        prerequisite.to_owned(),
                    ));
                    reported.push(prerequisite);
                }
            } else {
                seen.push(prerequisite);
            }
        }
        violations
    }

    /// Unique module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier resolved against the factory table at instantiation.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// Prerequisites wired into the module.
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    /// Prerequisites used for ordering only.
    pub fn predecessors(&self) -> &[String] {
        &self.predecessors
    }

    /// Opaque configuration text handed to the module, possibly empty.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Requirements followed by predecessors.
    pub fn prerequisites(&self) -> impl Iterator<Item = &str> {
        self.prerequisites_with_kind().map(|(_, name)| name)
    }

    /// Prerequisites tagged with how they were declared.
    pub fn prerequisites_with_kind(&self) -> impl Iterator<Item = (PrerequisiteKind, &str)> {
        self.requirements
            .iter()
            .map(|name| (PrerequisiteKind::Requirement, name.as_str()))
            .chain(
                self.predecessors
                    .iter()
                    .map(|name| (PrerequisiteKind::Predecessor, name.as_str())),
            )
    }
}
