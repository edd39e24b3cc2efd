//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Container driving modules through their lifecycle and executing commands."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use modcon_config::Configuration;
use modcon_logging::{LogContext, SharedLogger};
use modcon_params::{BracketParser, ParameterParser};
use tracing::debug;

use crate::error::ContainerError;
use crate::lifecycle::{LifecycleState, ManagedModule, Phase, PhaseError};
use crate::module::{CommandOutcome, FactoryTable};
use crate::registry::{CommandRegistry, ModuleRegistry};

/// One resolved entry of the execution block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStep {
    pub module: String,
    /// Registry key of the command.
    pub command: String,
    pub parameters: String,
}

/// Command that requested an early stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escape {
    pub command: String,
    pub reason: String,
}

/// Module whose shutdown failed; recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownFailure {
    pub module: String,
    pub message: String,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Modules that reached `Initialized`, in initialization order.
    pub initialized: Vec<String>,
    /// Commands that completed, in execution order.
    pub executed: Vec<String>,
    pub escape: Option<Escape>,
    /// Modules shut down, in shutdown order.
    pub shut_down: Vec<String>,
    pub shutdown_failures: Vec<ShutdownFailure>,
}

/// Owns the module and command registries for exactly one run.
///
/// Every module that reached `Initialized` is shut down in reverse order
/// before [`run`](Self::run) returns, whatever the outcome. If the run
/// unwinds, dropping the container performs the same shutdown.
pub struct Container<'f> {
    factories: &'f FactoryTable,
    logger: SharedLogger,
    parser: Box<dyn ParameterParser>,
    modules: ModuleRegistry,
    commands: CommandRegistry,
    report: RunReport,
    shutdown_complete: bool,
}

impl<'f> Container<'f> {
    pub fn new(factories: &'f FactoryTable, logger: SharedLogger) -> Self {
        Self::with_parser(factories, logger, BracketParser::new())
    }

    /// Use `parser` to read the execution block.
    pub fn with_parser<P>(factories: &'f FactoryTable, logger: SharedLogger, parser: P) -> Self
    where
        P: ParameterParser + 'static,
    {
        Self {
            factories,
            logger,
            parser: Box::new(parser),
            modules: ModuleRegistry::new(),
            commands: CommandRegistry::new(),
            report: RunReport::default(),
            shutdown_complete: false,
        }
    }

    /// Drive `configuration` to completion.
    pub fn run(mut self, configuration: &Configuration) -> Result<RunReport, ContainerError> {
        debug!(modules = configuration.len(), "container run starting");
        let outcome = self.drive(configuration);
        if let Err(err) = &outcome {
            self.logger
                .error(&LogContext::new(), &format!("run aborted: {}", error_chain(err)));
        }
        self.shutdown_all();
        outcome.map(|()| std::mem::take(&mut self.report))
    }

    fn drive(&mut self, configuration: &Configuration) -> Result<(), ContainerError> {
        self.instantiate(configuration)?;
        self.configure_all()?;
        self.wire_requirements()?;
        self.register_commands()?;
        self.initialize_all()?;
        let sequence = self.execution_sequence(configuration.execution())?;
        self.execute(&sequence)
    }

    fn instantiate(&mut self, configuration: &Configuration) -> Result<(), ContainerError> {
        for definition in configuration {
            let instance = self
                .factories
                .create(definition.implementation(), definition.name())
                .ok_or_else(|| ContainerError::UnknownImplementation {
                    module: definition.name().to_owned(),
                    implementation: definition.implementation().to_owned(),
                })?;
            self.modules
                .insert(ManagedModule::new(definition.clone(), instance))?;
            debug!(module = %definition.name(), implementation = %definition.implementation(), "module instantiated");
        }
        Ok(())
    }

    fn configure_all(&mut self) -> Result<(), ContainerError> {
        for name in self.modules.names() {
            let Some(module) = self.modules.get_mut(&name) else {
                continue;
            };
            module.configure().map_err(|err| match err {
                PhaseError::Violation(violation) => ContainerError::Lifecycle(violation),
                PhaseError::Module(source) => ContainerError::Configure {
                    module: name.clone(),
                    source,
                },
            })?;
            self.log_phase(&name, Phase::Configure, "configured");
        }
        Ok(())
    }

    fn wire_requirements(&mut self) -> Result<(), ContainerError> {
        for name in self.modules.names() {
            let requirements = match self.modules.get(&name) {
                Some(module) => module.definition().requirements().to_vec(),
                None => continue,
            };
            let mut views = Vec::with_capacity(requirements.len());
            let mut missing = Vec::new();
            for requirement in &requirements {
                match self.modules.get(requirement) {
                    Some(required) => views.push(required.required_view()),
                    None => missing.push(requirement.clone()),
                }
            }

            let Some(module) = self.modules.get_mut(&name) else {
                continue;
            };
            let rejected = module.wire(&views)?;
            if !missing.is_empty() || !rejected.is_empty() {
                return Err(ContainerError::Wiring {
                    module: name,
                    missing,
                    rejected,
                });
            }
            if !views.is_empty() {
                self.log_phase(
                    &name,
                    Phase::WireRequirements,
                    &format!("wired {} requirement(s)", views.len()),
                );
            }
        }
        Ok(())
    }

    fn register_commands(&mut self) -> Result<(), ContainerError> {
        for name in self.modules.names() {
            let Some(module) = self.modules.get_mut(&name) else {
                continue;
            };
            let mut registrar = self.commands.registrar(&name)?;
            let outcome = module.register_commands(&mut registrar);
            let registered = registrar.finish()?;
            outcome.map_err(|err| match err {
                PhaseError::Violation(violation) => ContainerError::Lifecycle(violation),
                PhaseError::Module(source) => ContainerError::RegisterCommands {
                    module: name.clone(),
                    source,
                },
            })?;
            debug!(module = %name, commands = registered, "commands registered");
        }
        self.commands.freeze();
        Ok(())
    }

    fn initialize_all(&mut self) -> Result<(), ContainerError> {
        for name in self.modules.names() {
            let Some(module) = self.modules.get_mut(&name) else {
                continue;
            };
            match module.initialize() {
                Ok(()) => {
                    self.report.initialized.push(name.clone());
                    self.log_phase(&name, Phase::Initialize, "initialized");
                }
                Err(PhaseError::Violation(violation)) => {
                    return Err(ContainerError::Lifecycle(violation))
                }
                Err(PhaseError::Module(source)) => {
                    return Err(ContainerError::Initialize {
                        module: name,
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    /// Resolve the execution block against the frozen command registry.
    pub fn execution_sequence(&self, execution: Option<&str>) -> Result<Vec<ExecutionStep>, ContainerError> {
        let Some(text) = execution else {
            return Ok(Vec::new());
        };
        let entries = self
            .parser
            .parse(text)
            .map_err(ContainerError::Execution)?;

        let mut sequence = Vec::with_capacity(entries.len());
        let mut unknown: Vec<String> = Vec::new();
        let mut unexpected = None;
        for (name, parameters) in entries.entries() {
            let Some(specification) = self.commands.resolve(name) else {
                if !unknown.contains(name) {
                    unknown.push(name.clone());
                }
                continue;
            };
            if specification.parameterless && !parameters.trim().is_empty() && unexpected.is_none() {
                unexpected = Some(ContainerError::UnexpectedParameters {
                    command: specification.full_name.clone(),
                    parameters: parameters.clone(),
                });
            }
            sequence.push(ExecutionStep {
                module: specification.module.clone(),
                command: specification.full_name.clone(),
                parameters: parameters.clone(),
            });
        }

        if !unknown.is_empty() {
            return Err(ContainerError::UnknownCommands(unknown));
        }
        if let Some(err) = unexpected {
            return Err(err);
        }
        Ok(sequence)
    }

    fn execute(&mut self, sequence: &[ExecutionStep]) -> Result<(), ContainerError> {
        for step in sequence {
            let context = LogContext::new()
                .with_module(&step.module)
                .with_command(&step.command);
            let Some(command) = self.commands.get_mut(&step.command) else {
                return Err(ContainerError::UnknownCommands(vec![step.command.clone()]));
            };
            self.logger.debug(&context, "executing command");
            match command.handler_mut().execute(&step.parameters) {
                Ok(CommandOutcome::Completed) => {
                    self.report.executed.push(step.command.clone());
                }
                Ok(CommandOutcome::Escape(reason)) => {
                    self.logger
                        .warn(&context, &format!("escape requested: {reason}"));
                    self.report.escape = Some(Escape {
                        command: step.command.clone(),
                        reason,
                    });
                    break;
                }
                Err(source) => {
                    return Err(ContainerError::Command {
                        module: step.module.clone(),
                        command: step.command.clone(),
                        parameters: step.parameters.clone(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    fn shutdown_all(&mut self) {
        if self.shutdown_complete {
            return;
        }
        self.shutdown_complete = true;

        let initialized = self.report.initialized.clone();
        for name in initialized.iter().rev() {
            let Some(module) = self.modules.get_mut(name) else {
                continue;
            };
            let context = LogContext::new()
                .with_module(name)
                .with_phase(Phase::Shutdown.as_str());
            match module.shutdown() {
                Ok(()) => {
                    self.report.shut_down.push(name.clone());
                    self.logger.info(&context, "shut down");
                }
                Err(err) => {
                    let message = err.to_string();
                    self.logger
                        .error(&context, &format!("shutdown failed: {message}"));
                    if module.state() == LifecycleState::ShutDown {
                        self.report.shut_down.push(name.clone());
                    }
                    self.report.shutdown_failures.push(ShutdownFailure {
                        module: name.clone(),
                        message,
                    });
                }
            }
        }
    }

    fn log_phase(&self, module: &str, phase: Phase, message: &str) {
        let context = LogContext::new()
            .with_module(module)
            .with_phase(phase.as_str());
        self.logger.info(&context, message);
    }
}

impl Drop for Container<'_> {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

fn error_chain(err: &ContainerError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
