//! ---
//! mc_section: "08-builtin-modules"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Built-in modules driven through a container run."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::sync::Arc;

use modcon_builtin::{register_builtins, Console};
use modcon_config::ConfigurationBuilder;
use modcon_core::{Container, ContainerError, FactoryTable, RunReport};
use modcon_logging::MemoryLogger;

fn run(specification: &str) -> (Result<RunReport, ContainerError>, Console) {
    let console = Console::capture();
    let mut factories = FactoryTable::new();
    register_builtins(&mut factories, console.clone()).unwrap();
    let configuration = ConfigurationBuilder::default().build(specification).unwrap();
    let result = Container::new(&factories, Arc::new(MemoryLogger::new())).run(&configuration);
    (result, console)
}

#[test]
fn report_reads_counters_it_requires() {
    let (result, console) = run(
        "module=[name=report class=modcon.Report requirement=hits requirement=misses] \
         module=[name=hits class=modcon.Counter configuration=[start=10]] \
         module=[name=misses class=modcon.Counter] \
         execution=[increment=5 misses.increment= increment=-2 report= hits.show= show=]",
    );
    let report = result.unwrap();
    assert_eq!(report.initialized, vec!["hits", "misses", "report"]);
    assert_eq!(console.lines(), vec!["hits=13 misses=1", "hits=13", "hits=13"]);
}

#[test]
fn echo_prefixes_parameters() {
    let (result, console) = run(
        r#"module=[name=say class=modcon.Echo configuration=[prefix="> "]] execution=[echo=hello echo=[two words]]"#,
    );
    result.unwrap();
    assert_eq!(console.lines(), vec!["> hello", "> two words"]);
}

#[test]
fn control_escape_ends_the_run_cleanly() {
    let (result, console) = run(
        "module=[name=say class=modcon.Echo] module=[name=ctl class=modcon.Control] \
         execution=[echo=first escape=[all done] echo=never]",
    );
    let report = result.unwrap();
    assert_eq!(console.lines(), vec!["first"]);
    let escape = report.escape.unwrap();
    assert_eq!(escape.command, "escape");
    assert_eq!(escape.reason, "all done");
}

#[test]
fn control_fail_aborts_with_message() {
    let (result, _) = run("module=[name=ctl class=modcon.Control] execution=[fail=[out of paper]]");
    match result.unwrap_err() {
        ContainerError::Command {
            module,
            command,
            source,
            ..
        } => {
            assert_eq!(module, "ctl");
            assert_eq!(command, "fail");
            assert_eq!(source.to_string(), "out of paper");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn report_rejects_non_counter_requirement() {
    let (result, _) = run(
        "module=[name=report class=modcon.Report requirement=say] module=[name=say class=modcon.Echo]",
    );
    assert!(matches!(
        result.unwrap_err(),
        ContainerError::Wiring { rejected, .. } if rejected == vec!["say".to_owned()]
    ));
}

#[test]
fn show_is_parameterless() {
    let (result, _) = run("module=[name=c class=modcon.Counter] execution=[show=now]");
    assert!(matches!(
        result.unwrap_err(),
        ContainerError::UnexpectedParameters { .. }
    ));
}
