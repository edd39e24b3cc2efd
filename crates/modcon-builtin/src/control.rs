//! ---
//! mc_section: "08-builtin-modules"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Run control module: escape and deliberate failure."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use anyhow::{anyhow, Result};
use modcon_core::{Command, CommandOutcome, CommandRegistrar, Module};

use crate::parse_configuration;

/// Commands that end a run early: `escape` cleanly, `fail` with an error.
#[derive(Debug)]
pub struct Control {
    name: String,
}

impl Control {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl Module for Control {
    fn configure(&mut self, configuration: &str) -> Result<()> {
        parse_configuration(&self.name, configuration, &[])?;
        Ok(())
    }

    fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<()> {
        registrar.register(Box::new(EscapeCommand))?;
        registrar.register(Box::new(FailCommand))?;
        Ok(())
    }
}

struct EscapeCommand;

impl Command for EscapeCommand {
    fn name(&self) -> &str {
        "escape"
    }

    fn execute(&mut self, parameters: &str) -> Result<CommandOutcome> {
        let reason = match parameters.trim() {
            "" => "requested".to_owned(),
            reason => reason.to_owned(),
        };
        Ok(CommandOutcome::Escape(reason))
    }
}

struct FailCommand;

impl Command for FailCommand {
    fn name(&self) -> &str {
        "fail"
    }

    fn execute(&mut self, parameters: &str) -> Result<CommandOutcome> {
        match parameters.trim() {
            "" => Err(anyhow!("requested failure")),
            message => Err(anyhow!("{message}")),
        }
    }
}
