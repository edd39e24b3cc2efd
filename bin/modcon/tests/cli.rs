//! ---
//! mc_section: "09-runner"
//! mc_subsection: "integration-tests"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Runs the modcon binary and checks exit status and diagnostics."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::process::{Command, Output};

fn modcon(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modcon"))
        .args(args)
        .env_remove("MODCON_LOG")
        .env_remove("RUST_LOG")
        .env_remove("MODCON_CONFIG")
        .output()
        .expect("modcon binary runs")
}

#[test]
fn invalid_specification_is_reported_on_stderr() {
    for _ in 0..20 {
        let output = modcon(&["module=[", "name=a", "class=modcon.Echo"]);
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("invalid specification"), "stderr was: {stderr}");
    }
}

#[test]
fn shutdown_is_logged_after_a_failing_command() {
    for _ in 0..20 {
        let output = modcon(&["module=[name=c class=modcon.Control]", "execution=[fail=boom]"]);
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("boom"), "stderr was: {stderr}");
        assert!(stderr.contains("shut down"), "stderr was: {stderr}");
    }
}

#[test]
fn plan_prints_resolved_order() {
    let output = modcon(&[
        "--plan",
        "module=[name=a class=modcon.Echo predecessor=b]",
        "module=[name=b class=modcon.Echo]",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["  1. b (modcon.Echo)", "  2. a (modcon.Echo) after b"]);
}
