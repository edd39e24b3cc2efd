//! ---
//! mc_section: "06-logging"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Logger handle, tracing adapter, and logging macros."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Logger handle injected into the container, plus the `mc_*` macros that
//! attach module, command, and phase fields to `tracing` events.
#![warn(missing_docs)]

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

#[doc(hidden)]
pub use tracing as __tracing;

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured context attached to every log call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContext<'a> {
    /// Module the event concerns.
    pub module: Option<&'a str>,
    /// Command full name the event concerns.
    pub command: Option<&'a str>,
    /// Lifecycle phase in progress.
    pub phase: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a module name.
    pub fn with_module(mut self, module: &'a str) -> Self {
        self.module = Some(module);
        self
    }

    /// Attach a command name.
    pub fn with_command(mut self, command: &'a str) -> Self {
        self.command = Some(command);
        self
    }

    /// Attach a lifecycle phase.
    pub fn with_phase(mut self, phase: &'a str) -> Self {
        self.phase = Some(phase);
        self
    }
}

/// Severity of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal progress.
    Info,
    /// Unusual but handled situation.
    Warn,
    /// Failure.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Leveled logger handle.
pub trait Logger: Send + Sync {
    /// Record `message` at `level`.
    fn log(&self, level: LogLevel, context: &LogContext<'_>, message: &str);

    /// Record a debug message.
    fn debug(&self, context: &LogContext<'_>, message: &str) {
        self.log(LogLevel::Debug, context, message);
    }

    /// Record an informational message.
    fn info(&self, context: &LogContext<'_>, message: &str) {
        self.log(LogLevel::Info, context, message);
    }

    /// Record a warning.
    fn warn(&self, context: &LogContext<'_>, message: &str) {
        self.log(LogLevel::Warn, context, message);
    }

    /// Record an error.
    fn error(&self, context: &LogContext<'_>, message: &str) {
        self.log(LogLevel::Error, context, message);
    }
}

/// Shared logger handle.
pub type SharedLogger = Arc<dyn Logger>;

/// Logger forwarding to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    /// Convenience constructor returning a shared handle.
    pub fn shared() -> SharedLogger {
        Arc::new(TracingLogger)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, context: &LogContext<'_>, message: &str) {
        match level {
            LogLevel::Debug => mc_debug!(context = context, "{}", message),
            LogLevel::Info => mc_info!(context = context, "{}", message),
            LogLevel::Warn => mc_warn!(context = context, "{}", message),
            LogLevel::Error => mc_error!(context = context, "{}", message),
        }
    }
}

/// One entry captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Module from the context, if any.
    pub module: Option<String>,
    /// Command from the context, if any.
    pub command: Option<String>,
    /// Phase from the context, if any.
    pub phase: Option<String>,
    /// Rendered message.
    pub message: String,
}

/// Logger keeping every entry in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    /// Create an empty in-memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured entries.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Captured entries at exactly `level`.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect()
    }

    /// Whether any entry at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|record| record.level == level && record.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, context: &LogContext<'_>, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            module: context.module.map(str::to_owned),
            command: context.command.map(str::to_owned),
            phase: context.phase.map(str::to_owned),
            message: message.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new().with_module("db").with_phase("initialize");
        mc_info!(context = ctx, "module online");
        mc_debug!("debug message");
        mc_warn!(context = ctx.with_command("db.flush"), "escape requested");
        mc_error!(context = ctx, "error code: {}", 42);
    }

    #[test]
    fn tracing_logger_accepts_every_level() {
        init();
        let logger = TracingLogger::shared();
        let ctx = LogContext::new().with_module("web");
        logger.debug(&ctx, "debug");
        logger.info(&ctx, "info");
        logger.warn(&ctx, "warn");
        logger.error(&ctx, "error");
    }

    #[test]
    fn memory_logger_records_context() {
        let logger = MemoryLogger::new();
        let shared: SharedLogger = Arc::new(logger.clone());
        shared.warn(
            &LogContext::new().with_module("a").with_command("a.stop"),
            "escape: done",
        );
        shared.info(&LogContext::new(), "plain");

        let warnings = logger.at_level(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].module.as_deref(), Some("a"));
        assert_eq!(warnings[0].command.as_deref(), Some("a.stop"));
        assert!(logger.contains(LogLevel::Info, "plain"));
        assert!(!logger.contains(LogLevel::Error, "plain"));
        assert_eq!(logger.records().len(), 2);
    }
}
