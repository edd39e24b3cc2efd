//! ---
//! mc_section: "03-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module definitions, configurations, and builders."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Module definitions and dependency-ordered configurations.
//!
//! Specification text flows through [`ConfigurationBuilder`], which validates
//! every definition, checks that all prerequisites exist, and orders the
//! modules so that each one follows everything it depends on.
#![warn(missing_docs)]

pub mod builder;
pub mod configuration;
pub mod definition;
pub mod error;

pub use builder::{ConfigurationBuilder, ModuleDefinitionBuilder};
pub use configuration::Configuration;
pub use definition::{ModuleDefinition, PrerequisiteKind};
pub use error::{ConfigError, DefinitionViolation, MissingPrerequisite, Result};
