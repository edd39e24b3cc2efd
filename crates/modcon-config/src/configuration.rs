//! ---
//! mc_section: "03-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module definitions, configurations, and builders."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::definition::ModuleDefinition;
use crate::error::{ConfigError, Result};

/// Module definitions in dependency order plus the optional execution block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    modules: IndexMap<String, ModuleDefinition>,
    execution: Option<String>,
}

impl Configuration {
    /// Build a configuration from definitions that are already ordered.
    ///
    /// Every prerequisite of a definition must appear earlier in `definitions`.
    pub fn new(definitions: Vec<ModuleDefinition>, execution: Option<String>) -> Result<Self> {
        let mut modules: IndexMap<String, ModuleDefinition> = IndexMap::new();
        for definition in definitions {
            if modules.contains_key(definition.name()) {
                return Err(ConfigError::DuplicateModule(definition.name().to_owned()));
            }
            if let Some(prerequisite) = definition
                .prerequisites()
                .find(|name| !modules.contains_key(*name))
            {
                return Err(ConfigError::OutOfOrder {
                    module: definition.name().to_owned(),
                    prerequisite: prerequisite.to_owned(),
                });
            }
            modules.insert(definition.name().to_owned(), definition);
        }
        Ok(Self { modules, execution })
    }

    /// Look up a definition by module name.
    pub fn get(&self, name: &str) -> Option<&ModuleDefinition> {
        self.modules.get(name)
    }

    /// Whether a module with this name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Definitions in dependency order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.values()
    }

    /// Module names in dependency order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the configuration holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Opaque execution text, if the specification carried one.
    pub fn execution(&self) -> Option<&str> {
        self.execution.as_deref()
    }

    /// Sub-configuration holding the requested modules and everything they
    /// transitively depend on, in the same relative order and without an
    /// execution block.
    pub fn extract<I, S>(&self, names: I) -> Result<Configuration>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = Vec::new();
        for name in names {
            let name = name.as_ref();
            let Some((key, _)) = self.modules.get_key_value(name) else {
                return Err(ConfigError::UnknownModule(name.to_owned()));
            };
            pending.push(key.as_str());
        }

        while let Some(name) = pending.pop() {
            if !wanted.insert(name) {
                continue;
            }
            if let Some(definition) = self.modules.get(name) {
                pending.extend(definition.prerequisites());
            }
        }

        let modules = self
            .modules
            .iter()
            .filter(|(name, _)| wanted.contains(name.as_str()))
            .map(|(name, definition)| (name.clone(), definition.clone()))
            .collect();
        Ok(Configuration {
            modules,
            execution: None,
        })
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = &'a ModuleDefinition;
    type IntoIter = indexmap::map::Values<'a, String, ModuleDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.values()
    }
}
