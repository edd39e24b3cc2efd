//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module and command registries owned by one container run."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::lifecycle::ManagedModule;
use crate::module::Command;

/// Registration failures. All of them are specification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("module '{0}' is registered more than once")]
    DuplicateModule(String),
    #[error("implementation '{0}' is registered more than once")]
    DuplicateImplementation(String),
    #[error("module '{module}' registers command '{command}' more than once")]
    DuplicateCommand { module: String, command: String },
    #[error("module '{module}' registers a command with an empty name")]
    EmptyCommandName { module: String },
    #[error("module '{module}' cannot register commands after registration closed")]
    Frozen { module: String },
}

/// Live modules keyed by name, in initialization order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<String, ManagedModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: ManagedModule) -> Result<(), RegistryError> {
        let name = module.name().to_owned();
        if self.modules.contains_key(&name) {
            return Err(RegistryError::DuplicateModule(name));
        }
        self.modules.insert(name, module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ManagedModule> {
        self.modules.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ManagedModule> {
        self.modules.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedModule> {
        self.modules.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Addressing data for a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpecification {
    pub module: String,
    pub command: String,
    /// Key the command is invoked by: the bare name, or `module.command`
    /// when another module registered the bare name first.
    pub full_name: String,
    pub parameterless: bool,
}

impl CommandSpecification {
    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.command)
    }
}

/// A command object with its addressing data.
pub struct RegisteredCommand {
    specification: CommandSpecification,
    handler: Box<dyn Command>,
}

impl RegisteredCommand {
    pub fn specification(&self) -> &CommandSpecification {
        &self.specification
    }

    pub fn handler_mut(&mut self) -> &mut dyn Command {
        self.handler.as_mut()
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegisteredCommand")
            .field(&self.specification)
            .finish()
    }
}

/// Commands keyed by full name, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, RegisteredCommand>,
    frozen: bool,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open registration on behalf of `module`.
    pub fn registrar(&mut self, module: &str) -> Result<CommandRegistrar<'_>, RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen {
                module: module.to_owned(),
            });
        }
        Ok(CommandRegistrar {
            registry: self,
            module: module.to_owned(),
            registered: Vec::new(),
            violation: None,
        })
    }

    /// Close registration; the registry is read-only afterwards.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Find a command by full name, or by its `module.command` form.
    pub fn resolve(&self, name: &str) -> Option<&CommandSpecification> {
        if let Some(command) = self.commands.get(name) {
            return Some(&command.specification);
        }
        self.commands
            .values()
            .map(|command| &command.specification)
            .find(|specification| specification.qualified_name() == name)
    }

    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut RegisteredCommand> {
        self.commands.get_mut(full_name)
    }

    pub fn specifications(&self) -> impl Iterator<Item = &CommandSpecification> {
        self.commands.values().map(|command| &command.specification)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Registration handle scoped to one module.
///
/// The first violation is remembered and reported by [`finish`](Self::finish)
/// even if the module ignores the error returned from `register`.
pub struct CommandRegistrar<'a> {
    registry: &'a mut CommandRegistry,
    module: String,
    registered: Vec<String>,
    violation: Option<RegistryError>,
}

impl<'a> CommandRegistrar<'a> {
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Register `command`, returning the full name it is reachable under.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<String, RegistryError> {
        match self.try_register(command) {
            Ok(full_name) => Ok(full_name),
            Err(err) => {
                self.violation.get_or_insert_with(|| err.clone());
                Err(err)
            }
        }
    }

    fn try_register(&mut self, command: Box<dyn Command>) -> Result<String, RegistryError> {
        let bare = command.name().trim().to_owned();
        if bare.is_empty() {
            return Err(RegistryError::EmptyCommandName {
                module: self.module.clone(),
            });
        }
        if self.registered.contains(&bare) {
            return Err(RegistryError::DuplicateCommand {
                module: self.module.clone(),
                command: bare,
            });
        }

        let full_name = if self.registry.commands.contains_key(&bare) {
            qualify(&self.module, &bare)
        } else {
            bare.clone()
        };
        if self.registry.commands.contains_key(&full_name) {
            return Err(RegistryError::DuplicateCommand {
                module: self.module.clone(),
                command: full_name,
            });
        }

        debug!(module = %self.module, command = %bare, full_name = %full_name, "command registered");
        let specification = CommandSpecification {
            module: self.module.clone(),
            command: bare.clone(),
            full_name: full_name.clone(),
            parameterless: command.parameterless(),
        };
        self.registry.commands.insert(
            full_name.clone(),
            RegisteredCommand {
                specification,
                handler: command,
            },
        );
        self.registered.push(bare);
        Ok(full_name)
    }

    /// End registration for this module.
    pub fn finish(self) -> Result<usize, RegistryError> {
        match self.violation {
            Some(violation) => Err(violation),
            None => Ok(self.registered.len()),
        }
    }
}

fn qualify(module: &str, command: &str) -> String {
    format!("{module}.{command}")
}
