//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module and command contracts plus the implementation factory table."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use indexmap::IndexMap;

use crate::registry::{CommandRegistrar, RegistryError};

/// A named component driven through the container lifecycle.
///
/// The container calls each method at most once per instance, in the order
/// `configure`, `add_requirement` (once per requirement), `register_commands`,
/// `initialize`, and finally `shutdown` if initialization succeeded.
pub trait Module {
    /// Apply the opaque configuration text from the module definition.
    fn configure(&mut self, configuration: &str) -> Result<()>;

    /// Accept a configured requirement. Returning `false` rejects it, which
    /// fails the run.
    fn add_requirement(&mut self, requirement: &RequiredModule) -> bool {
        let _ = requirement;
        false
    }

    /// Register the commands this module exposes.
    fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<()> {
        let _ = registrar;
        Ok(())
    }

    /// Bring the module online.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release everything acquired in `initialize`.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Capability handed to modules that require this one.
    fn service(&self) -> Option<Rc<dyn Any>> {
        None
    }
}

/// Result of a successful command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Continue with the next command.
    Completed,
    /// Stop executing commands and shut down cleanly.
    Escape(String),
}

/// A named operation exposed by a module.
pub trait Command {
    /// Bare command name; the registry may qualify it with the module name.
    fn name(&self) -> &str;

    /// Whether the command rejects any parameter text.
    fn parameterless(&self) -> bool {
        false
    }

    /// Run the command with its opaque parameter text.
    fn execute(&mut self, parameters: &str) -> Result<CommandOutcome>;
}

/// View of a configured requirement passed to [`Module::add_requirement`].
#[derive(Clone)]
pub struct RequiredModule {
    name: String,
    implementation: String,
    service: Option<Rc<dyn Any>>,
}

impl RequiredModule {
    pub fn new(
        name: impl Into<String>,
        implementation: impl Into<String>,
        service: Option<Rc<dyn Any>>,
    ) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            service,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// The required module's service, if it offers one of type `T`.
    pub fn service<T: Any>(&self) -> Option<Rc<T>> {
        self.service.clone()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for RequiredModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequiredModule")
            .field("name", &self.name)
            .field("implementation", &self.implementation)
            .field("has_service", &self.service.is_some())
            .finish()
    }
}

/// Constructor receiving the module name.
pub type ModuleFactory = Box<dyn Fn(&str) -> Box<dyn Module>>;

/// Maps implementation identifiers to module constructors.
#[derive(Default)]
pub struct FactoryTable {
    factories: IndexMap<String, ModuleFactory>,
}

impl FactoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `implementation`.
    pub fn register<F>(&mut self, implementation: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&str) -> Box<dyn Module> + 'static,
    {
        let implementation = implementation.into();
        if self.factories.contains_key(&implementation) {
            return Err(RegistryError::DuplicateImplementation(implementation));
        }
        self.factories.insert(implementation, Box::new(factory));
        Ok(())
    }

    /// Construct a module named `name`, or `None` for an unknown identifier.
    pub fn create(&self, implementation: &str, name: &str) -> Option<Box<dyn Module>> {
        self.factories
            .get(implementation)
            .map(|factory| factory(name))
    }

    pub fn contains(&self, implementation: &str) -> bool {
        self.factories.contains_key(implementation)
    }

    pub fn implementations(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Module for Plain {
        fn configure(&mut self, _configuration: &str) -> Result<()> {
            Ok(())
        }

        fn service(&self) -> Option<Rc<dyn Any>> {
            Some(Rc::new(41_u32))
        }
    }

    #[test]
    fn factory_table_rejects_duplicate_implementation() {
        let mut table = FactoryTable::new();
        table.register("plain", |_| Box::new(Plain)).unwrap();
        let err = table.register("plain", |_| Box::new(Plain)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateImplementation("plain".into()));
        assert!(table.create("plain", "p").is_some());
        assert!(table.create("other", "p").is_none());
        assert_eq!(table.implementations().collect::<Vec<_>>(), vec!["plain"]);
    }

    #[test]
    fn required_module_downcasts_service() {
        let module = Plain;
        let view = RequiredModule::new("p", "plain", module.service());
        assert_eq!(view.service::<u32>().as_deref(), Some(&41));
        assert!(view.service::<String>().is_none());
        assert!(RequiredModule::new("q", "plain", None)
            .service::<u32>()
            .is_none());
    }

    #[test]
    fn default_module_rejects_requirements() {
        let mut module = Plain;
        assert!(!module.add_requirement(&RequiredModule::new("x", "y", None)));
        assert!(module.initialize().is_ok());
        assert!(module.shutdown().is_ok());
    }
}
