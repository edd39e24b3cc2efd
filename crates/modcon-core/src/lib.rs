//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module container and lifecycle orchestrator."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Drives modules from a dependency-ordered [`Configuration`] through a fixed
//! lifecycle: instantiate, configure, wire requirements, register commands,
//! initialize, execute, then shut down in reverse order.
//!
//! [`Configuration`]: modcon_config::Configuration

pub mod container;
pub mod error;
pub mod launcher;
pub mod lifecycle;
pub mod module;
pub mod registry;

pub use container::{Container, Escape, ExecutionStep, RunReport, ShutdownFailure};
pub use error::ContainerError;
pub use lifecycle::{LifecycleState, LifecycleViolation, ManagedModule, Phase, PhaseError};
pub use module::{Command, CommandOutcome, FactoryTable, Module, ModuleFactory, RequiredModule};
pub use registry::{
    CommandRegistrar, CommandRegistry, CommandSpecification, ModuleRegistry, RegisteredCommand,
    RegistryError,
};
