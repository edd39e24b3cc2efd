//! ---
//! mc_section: "08-builtin-modules"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Counter service module and the report module consuming it."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use modcon_core::{Command, CommandOutcome, CommandRegistrar, Module, RequiredModule};
use tracing::debug;

use crate::{parse_configuration, Console};

/// Shared counter offered to dependents of a [`Counter`] module.
#[derive(Debug, Default)]
pub struct CounterService {
    value: Cell<i64>,
}

impl CounterService {
    pub fn new(start: i64) -> Self {
        Self {
            value: Cell::new(start),
        }
    }

    pub fn value(&self) -> i64 {
        self.value.get()
    }

    /// Add `amount`, failing on overflow.
    pub fn add(&self, amount: i64) -> Result<i64> {
        let next = self
            .value
            .get()
            .checked_add(amount)
            .with_context(|| format!("counter overflow adding {amount}"))?;
        self.value.set(next);
        Ok(next)
    }
}

/// Module holding a [`CounterService`]; configuration key `start`.
#[derive(Debug)]
pub struct Counter {
    name: String,
    service: Rc<CounterService>,
    console: Console,
}

impl Counter {
    pub fn new(name: &str, console: Console) -> Self {
        Self {
            name: name.to_owned(),
            service: Rc::new(CounterService::default()),
            console,
        }
    }
}

impl Module for Counter {
    fn configure(&mut self, configuration: &str) -> Result<()> {
        let parameters = parse_configuration(&self.name, configuration, &["start"])?;
        if let Some(start) = parameters.get_optional("start")? {
            let start = start
                .parse::<i64>()
                .with_context(|| format!("start '{start}' is not an integer"))?;
            self.service = Rc::new(CounterService::new(start));
        }
        Ok(())
    }

    fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<()> {
        registrar.register(Box::new(Increment {
            service: self.service.clone(),
        }))?;
        registrar.register(Box::new(Show {
            module: self.name.clone(),
            service: self.service.clone(),
            console: self.console.clone(),
        }))?;
        Ok(())
    }

    fn service(&self) -> Option<Rc<dyn Any>> {
        Some(self.service.clone())
    }
}

struct Increment {
    service: Rc<CounterService>,
}

impl Command for Increment {
    fn name(&self) -> &str {
        "increment"
    }

    fn execute(&mut self, parameters: &str) -> Result<CommandOutcome> {
        let amount = match parameters.trim() {
            "" => 1,
            text => text
                .parse::<i64>()
                .with_context(|| format!("increment '{text}' is not an integer"))?,
        };
        let value = self.service.add(amount)?;
        debug!(amount, value, "counter incremented");
        Ok(CommandOutcome::Completed)
    }
}

struct Show {
    module: String,
    service: Rc<CounterService>,
    console: Console,
}

impl Command for Show {
    fn name(&self) -> &str {
        "show"
    }

    fn parameterless(&self) -> bool {
        true
    }

    fn execute(&mut self, _parameters: &str) -> Result<CommandOutcome> {
        self.console
            .line(&format!("{}={}", self.module, self.service.value()))?;
        Ok(CommandOutcome::Completed)
    }
}

/// Prints every required counter; accepts only counter modules as
/// requirements and needs at least one.
#[derive(Debug)]
pub struct Report {
    name: String,
    counters: Vec<(String, Rc<CounterService>)>,
    console: Console,
}

impl Report {
    pub fn new(name: &str, console: Console) -> Self {
        Self {
            name: name.to_owned(),
            counters: Vec::new(),
            console,
        }
    }
}

impl Module for Report {
    fn configure(&mut self, configuration: &str) -> Result<()> {
        parse_configuration(&self.name, configuration, &[])?;
        Ok(())
    }

    fn add_requirement(&mut self, requirement: &RequiredModule) -> bool {
        match requirement.service::<CounterService>() {
            Some(service) => {
                self.counters.push((requirement.name().to_owned(), service));
                true
            }
            None => false,
        }
    }

    fn register_commands(&mut self, registrar: &mut CommandRegistrar<'_>) -> Result<()> {
        registrar.register(Box::new(ReportCommand {
            counters: self.counters.clone(),
            console: self.console.clone(),
        }))?;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        if self.counters.is_empty() {
            bail!("module '{}' requires at least one counter", self.name);
        }
        Ok(())
    }
}

struct ReportCommand {
    counters: Vec<(String, Rc<CounterService>)>,
    console: Console,
}

impl Command for ReportCommand {
    fn name(&self) -> &str {
        "report"
    }

    fn parameterless(&self) -> bool {
        true
    }

    fn execute(&mut self, _parameters: &str) -> Result<CommandOutcome> {
        let summary = self
            .counters
            .iter()
            .map(|(name, service)| format!("{}={}", name, service.value()))
            .collect::<Vec<_>>()
            .join(" ");
        self.console.line(&summary)?;
        Ok(CommandOutcome::Completed)
    }
}
