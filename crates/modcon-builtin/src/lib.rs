//! ---
//! mc_section: "08-builtin-modules"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Built-in modules registered by the modcon runner."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Modules available to every `modcon` run without an embedding application.
//!
//! | implementation   | commands                          |
//! |------------------|-----------------------------------|
//! | `modcon.Echo`    | `echo`                            |
//! | `modcon.Counter` | `increment [n]`, `show`           |
//! | `modcon.Report`  | `report` (requires counters)      |
//! | `modcon.Control` | `escape [reason]`, `fail [message]` |

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use modcon_core::{FactoryTable, RegistryError};
use modcon_params::{BracketParser, ParameterParser, ParameterSet};
use parking_lot::Mutex;

mod control;
mod counter;
mod echo;

pub use control::Control;
pub use counter::{Counter, CounterService, Report};
pub use echo::Echo;

pub const ECHO: &str = "modcon.Echo";
pub const COUNTER: &str = "modcon.Counter";
pub const REPORT: &str = "modcon.Report";
pub const CONTROL: &str = "modcon.Control";

/// Where built-in commands write their output.
#[derive(Debug, Clone, Default)]
pub enum Console {
    #[default]
    Stdout,
    /// Lines kept in memory.
    Capture(Arc<Mutex<Vec<String>>>),
}

impl Console {
    pub fn capture() -> Self {
        Console::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn line(&self, text: &str) -> Result<()> {
        match self {
            Console::Stdout => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{text}").context("failed to write to stdout")
            }
            Console::Capture(lines) => {
                lines.lock().push(text.to_owned());
                Ok(())
            }
        }
    }

    /// Captured lines; always empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Console::Stdout => Vec::new(),
            Console::Capture(lines) => lines.lock().clone(),
        }
    }
}

/// Register every built-in module, writing output to `console`.
pub fn register_builtins(factories: &mut FactoryTable, console: Console) -> Result<(), RegistryError> {
    let echo_console = console.clone();
    factories.register(ECHO, move |name| Box::new(Echo::new(name, echo_console.clone())))?;
    let counter_console = console.clone();
    factories.register(COUNTER, move |name| {
        Box::new(Counter::new(name, counter_console.clone()))
    })?;
    let report_console = console;
    factories.register(REPORT, move |name| {
        Box::new(Report::new(name, report_console.clone()))
    })?;
    factories.register(CONTROL, |name| Box::new(Control::new(name)))?;
    Ok(())
}

/// Parse module configuration text, accepting only `accepted` keys.
fn parse_configuration(module: &str, text: &str, accepted: &[&str]) -> Result<ParameterSet> {
    let parameters = BracketParser::new()
        .parse(text)
        .with_context(|| format!("module '{module}' has malformed configuration"))?;
    parameters
        .check_keys(accepted)
        .with_context(|| format!("module '{module}' has invalid configuration"))?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_builtins_once() {
        let mut factories = FactoryTable::new();
        register_builtins(&mut factories, Console::capture()).unwrap();
        assert_eq!(
            factories.implementations().collect::<Vec<_>>(),
            vec![ECHO, COUNTER, REPORT, CONTROL]
        );
        assert!(register_builtins(&mut factories, Console::capture()).is_err());
    }

    #[test]
    fn capture_console_keeps_lines() {
        let console = Console::capture();
        console.line("one").unwrap();
        console.clone().line("two").unwrap();
        assert_eq!(console.lines(), vec!["one", "two"]);
        assert!(Console::Stdout.lines().is_empty());
    }
}
