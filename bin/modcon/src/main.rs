//! ---
//! mc_section: "09-runner"
//! mc_subsection: "binary"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Binary entrypoint for the modcon runner."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use modcon_builtin::{register_builtins, Console};
use modcon_common::{init_tracing, LogFormat, RunnerConfig};
use modcon_config::Configuration;
use modcon_core::{launcher, FactoryTable};
use modcon_logging::{LogContext, TracingLogger};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Resolve module dependencies, run their lifecycle, and execute commands",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to the runner configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Override the console log format")]
    log_format: Option<CliLogFormat>,

    #[arg(
        long = "only",
        value_name = "MODULE",
        help = "Run only these modules and their prerequisites, without the execution block"
    )]
    only: Vec<String>,

    #[arg(long, help = "Print the resolved module order and exit")]
    plan: bool,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,

    #[arg(
        value_name = "SPECIFICATION",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Specification words, joined with single spaces"
    )]
    specification: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogFormat {
    Pretty,
    StructuredJson,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::StructuredJson => LogFormat::StructuredJson,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.version {
        println!("modcon {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let (mut config, config_path) = match &cli.config {
        Some(path) => (RunnerConfig::from_path(path)?, Some(path.clone())),
        None => {
            let loaded = RunnerConfig::load_with_source(&[
                PathBuf::from("modcon.toml"),
                PathBuf::from("configs/modcon.toml"),
            ])?;
            (loaded.config, loaded.source)
        }
    };
    if let Some(format) = cli.log_format {
        config.logging.format = format.into();
    }
    let _tracing = init_tracing("modcon", &config.logging)?;
    if let Some(path) = &config_path {
        info!(config_path = %path.display(), "runner configuration loaded");
    }

    let mut factories = FactoryTable::new();
    register_builtins(&mut factories, Console::Stdout)?;
    let logger = TracingLogger::shared();
    let exit_codes = config.exit_codes;

    if !cli.plan && cli.only.is_empty() {
        let status = launcher::launch(&cli.specification, &factories, logger, &exit_codes);
        return Ok(exit_code(status));
    }

    let configuration = match launcher::plan(&cli.specification) {
        Ok(configuration) => configuration,
        Err(err) => {
            logger.error(&LogContext::new(), &format!("invalid specification: {err}"));
            return Ok(exit_code(exit_codes.specification));
        }
    };
    let configuration = if cli.only.is_empty() {
        configuration
    } else {
        match configuration.extract(&cli.only) {
            Ok(subset) => subset,
            Err(err) => {
                error!(error = %err, "cannot select modules");
                return Ok(exit_code(exit_codes.specification));
            }
        }
    };

    if cli.plan {
        print_plan(&configuration);
        return Ok(ExitCode::SUCCESS);
    }
    let status = launcher::run_configuration(&configuration, &factories, logger, &exit_codes);
    Ok(exit_code(status))
}

fn print_plan(configuration: &Configuration) {
    for (position, definition) in configuration.iter().enumerate() {
        let mut line = format!(
            "{:>3}. {} ({})",
            position + 1,
            definition.name(),
            definition.implementation()
        );
        if !definition.requirements().is_empty() {
            line.push_str(&format!(" requires {}", definition.requirements().join(", ")));
        }
        if !definition.predecessors().is_empty() {
            line.push_str(&format!(" after {}", definition.predecessors().join(", ")));
        }
        println!("{line}");
    }
    if let Some(execution) = configuration.execution() {
        println!("execution: {execution}");
    }
}

fn exit_code(status: i32) -> ExitCode {
    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
