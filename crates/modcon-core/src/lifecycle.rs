//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Per-module lifecycle state machine with once-only phases."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use modcon_config::ModuleDefinition;
use thiserror::Error;

use crate::module::{Module, RequiredModule};
use crate::registry::CommandRegistrar;

/// Where a module stands in its lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created,
    Configured,
    Initialized,
    ShuttingDown,
    ShutDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleState::Created => "created",
            LifecycleState::Configured => "configured",
            LifecycleState::Initialized => "initialized",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::ShutDown => "shut down",
        };
        f.write_str(label)
    }
}

/// A lifecycle call the container makes on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Configure,
    WireRequirements,
    RegisterCommands,
    Initialize,
    Shutdown,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::WireRequirements => "wire-requirements",
            Phase::RegisterCommands => "register-commands",
            Phase::Initialize => "initialize",
            Phase::Shutdown => "shutdown",
        }
    }

    fn required_state(self) -> LifecycleState {
        match self {
            Phase::Configure => LifecycleState::Created,
            Phase::WireRequirements | Phase::RegisterCommands | Phase::Initialize => {
                LifecycleState::Configured
            }
            Phase::Shutdown => LifecycleState::Initialized,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Phase::Configure => 1,
            Phase::WireRequirements => 1 << 1,
            Phase::RegisterCommands => 1 << 2,
            Phase::Initialize => 1 << 3,
            Phase::Shutdown => 1 << 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle call that is repeated or out of order. Always a programming
/// defect in the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lifecycle violation: module '{module}' cannot {phase} while {state}")]
pub struct LifecycleViolation {
    pub module: String,
    pub phase: Phase,
    pub state: LifecycleState,
}

/// Failure of a single lifecycle call.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Violation(#[from] LifecycleViolation),
    #[error("{0:#}")]
    Module(anyhow::Error),
}

/// A live module instance paired with its definition and lifecycle state.
pub struct ManagedModule {
    definition: ModuleDefinition,
    instance: Box<dyn Module>,
    state: LifecycleState,
    invoked: u8,
}

impl ManagedModule {
    pub fn new(definition: ModuleDefinition, instance: Box<dyn Module>) -> Self {
        Self {
            definition,
            instance,
            state: LifecycleState::Created,
            invoked: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether `phase` has already been attempted.
    pub fn has_entered(&self, phase: Phase) -> bool {
        self.invoked & phase.bit() != 0
    }

    /// Check and consume `phase`. A phase is consumed even when the module
    /// call that follows fails.
    pub fn enter(&mut self, phase: Phase) -> Result<(), LifecycleViolation> {
        if self.has_entered(phase) || self.state != phase.required_state() {
            return Err(LifecycleViolation {
                module: self.name().to_owned(),
                phase,
                state: self.state,
            });
        }
        self.invoked |= phase.bit();
        Ok(())
    }

    pub fn configure(&mut self) -> Result<(), PhaseError> {
        self.enter(Phase::Configure)?;
        self.instance
            .configure(self.definition.configuration())
            .map_err(PhaseError::Module)?;
        self.state = LifecycleState::Configured;
        Ok(())
    }

    /// Offer every requirement to the module; returns the names it rejected.
    pub fn wire(&mut self, requirements: &[RequiredModule]) -> Result<Vec<String>, LifecycleViolation> {
        self.enter(Phase::WireRequirements)?;
        let rejected = requirements
            .iter()
            .filter(|requirement| !self.instance.add_requirement(requirement))
            .map(|requirement| requirement.name().to_owned())
            .collect();
        Ok(rejected)
    }

    pub fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<(), PhaseError> {
        self.enter(Phase::RegisterCommands)?;
        self.instance
            .register_commands(registrar)
            .map_err(PhaseError::Module)
    }

    pub fn initialize(&mut self) -> Result<(), PhaseError> {
        self.enter(Phase::Initialize)?;
        self.instance.initialize().map_err(PhaseError::Module)?;
        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Shut the module down. The state ends at `ShutDown` even when the
    /// module fails or panics.
    pub fn shutdown(&mut self) -> Result<(), PhaseError> {
        self.enter(Phase::Shutdown)?;
        self.state = LifecycleState::ShuttingDown;
        let instance = &mut self.instance;
        let outcome = catch_unwind(AssertUnwindSafe(|| instance.shutdown()));
        self.state = LifecycleState::ShutDown;
        match outcome {
            Ok(result) => result.map_err(PhaseError::Module),
            Err(payload) => Err(PhaseError::Module(anyhow::anyhow!(
                "panicked during shutdown: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// The view handed to modules that require this one.
    pub fn required_view(&self) -> RequiredModule {
        RequiredModule::new(
            self.definition.name(),
            self.definition.implementation(),
            self.instance.service(),
        )
    }
}

impl fmt::Debug for ManagedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedModule")
            .field("name", &self.name())
            .field("implementation", &self.definition.implementation())
            .field("state", &self.state)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
