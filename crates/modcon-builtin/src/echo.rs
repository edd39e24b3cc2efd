//! ---
//! mc_section: "08-builtin-modules"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Echo module printing its parameters."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use anyhow::Result;
use modcon_core::{Command, CommandOutcome, CommandRegistrar, Module};

use crate::{parse_configuration, Console};

/// Prints the parameters of each `echo` invocation, after an optional
/// configured `prefix`.
#[derive(Debug)]
pub struct Echo {
    name: String,
    prefix: String,
    console: Console,
}

impl Echo {
    pub fn new(name: &str, console: Console) -> Self {
        Self {
            name: name.to_owned(),
            prefix: String::new(),
            console,
        }
    }
}

impl Module for Echo {
    fn configure(&mut self, configuration: &str) -> Result<()> {
        let parameters = parse_configuration(&self.name, configuration, &["prefix"])?;
        if let Some(prefix) = parameters.get_optional("prefix")? {
            self.prefix = prefix.to_owned();
        }
        Ok(())
    }

    fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<()> {
        registrar.register(Box::new(EchoCommand {
            prefix: self.prefix.clone(),
            console: self.console.clone(),
        }))?;
        Ok(())
    }
}

struct EchoCommand {
    prefix: String,
    console: Console,
}

impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn execute(&mut self, parameters: &str) -> Result<CommandOutcome> {
        self.console.line(&format!("{}{}", self.prefix, parameters))?;
        Ok(CommandOutcome::Completed)
    }
}
