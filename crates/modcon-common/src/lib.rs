//! ---
//! mc_section: "07-runner-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Runner configuration and tracing bootstrap shared by binaries."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
//! Shared runner primitives: the optional TOML configuration file and the
//! tracing subscriber bootstrap used by the `modcon` binary.

pub mod config;
pub mod logging;

pub use config::{ExitCodes, LoadedRunnerConfig, LoggingConfig, RunnerConfig};
pub use logging::{init_tracing, LogFormat, TracingGuard};
