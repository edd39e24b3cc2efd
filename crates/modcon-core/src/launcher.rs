//! ---
//! mc_section: "05-container"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Process entry helpers turning argument vectors into container runs."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use modcon_common::ExitCodes;
use modcon_config::{ConfigError, Configuration, ConfigurationBuilder};
use modcon_logging::{LogContext, SharedLogger};
use tracing::info;

use crate::container::{Container, RunReport};
use crate::error::ContainerError;
use crate::module::FactoryTable;

/// Join `args` with single spaces into one specification string.
pub fn specification<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the ordered configuration described by `args` without running it.
pub fn plan<S: AsRef<str>>(args: &[S]) -> Result<Configuration, ConfigError> {
    ConfigurationBuilder::default().build(&specification(args))
}

/// Run the specification in `args` and return the process exit status.
pub fn launch<S: AsRef<str>>(
    args: &[S],
    factories: &FactoryTable,
    logger: SharedLogger,
    exit_codes: &ExitCodes,
) -> i32 {
    let configuration = match plan(args) {
        Ok(configuration) => configuration,
        Err(err) => {
            logger.error(&LogContext::new(), &format!("invalid specification: {err}"));
            return exit_codes.specification;
        }
    };
    run_configuration(&configuration, factories, logger, exit_codes)
}

/// Run an already built configuration and return the process exit status.
pub fn run_configuration(
    configuration: &Configuration,
    factories: &FactoryTable,
    logger: SharedLogger,
    exit_codes: &ExitCodes,
) -> i32 {
    let result = Container::new(factories, logger).run(configuration);
    exit_status(&result, exit_codes)
}

/// Map a run result to a process exit status.
pub fn exit_status(result: &Result<RunReport, ContainerError>, exit_codes: &ExitCodes) -> i32 {
    match result {
        Ok(report) => {
            info!(
                initialized = report.initialized.len(),
                executed = report.executed.len(),
                escaped = report.escape.is_some(),
                shutdown_failures = report.shutdown_failures.len(),
                "run complete"
            );
            0
        }
        Err(err) if err.is_specification() => exit_codes.specification,
        Err(_) => exit_codes.runtime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_arguments_with_single_spaces() {
        assert_eq!(
            specification(&["module=[", "name=a", "class=x", "]"]),
            "module=[ name=a class=x ]"
        );
        assert_eq!(specification::<&str>(&[]), "");
    }

    #[test]
    fn plan_orders_modules() {
        let configuration = plan(&[
            "module=[name=a class=x requirement=b]",
            "module=[name=b class=x]",
        ])
        .unwrap();
        assert_eq!(configuration.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn exit_status_classifies_errors() {
        let codes = ExitCodes {
            specification: 7,
            runtime: 9,
        };
        assert_eq!(exit_status(&Ok(RunReport::default()), &codes), 0);
        assert_eq!(
            exit_status(&Err(ContainerError::UnknownCommands(vec!["x".into()])), &codes),
            7
        );
        assert_eq!(
            exit_status(
                &Err(ContainerError::Initialize {
                    module: "a".into(),
                    source: anyhow::anyhow!("boom"),
                }),
                &codes
            ),
            9
        );
    }
}
