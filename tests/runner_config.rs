//! ---
//! mc_section: "15-testing"
//! mc_subsection: "integration-tests"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Runner configuration file loading tests."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use modcon_common::{LogFormat, RunnerConfig};
use tempfile::tempdir;

#[test]
fn sample_configuration_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("configs/modcon.toml");
    let config = RunnerConfig::from_path(&path).unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.logging.filter, "info,modcon_core=debug");
    assert_eq!(config.exit_codes.specification, 2);
}

#[test]
fn load_prefers_environment_then_candidates_then_defaults() {
    let dir = tempdir().unwrap();
    let candidate = dir.path().join("modcon.toml");
    fs::write(&candidate, "[exit_codes]\nruntime = 3\n").unwrap();
    let overridden = dir.path().join("override.toml");
    fs::write(&overridden, "[logging]\nformat = \"structured-json\"\n").unwrap();
    let absent = dir.path().join("absent.toml");

    std::env::remove_var(RunnerConfig::ENV_CONFIG_PATH);
    let loaded = RunnerConfig::load_with_source(&[absent.clone(), candidate.clone()]).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(candidate.as_path()));
    assert_eq!(loaded.config.exit_codes.runtime, 3);

    let loaded = RunnerConfig::load_with_source(&[absent.clone()]).unwrap();
    assert!(loaded.source.is_none());
    assert_eq!(loaded.config, RunnerConfig::default());

    std::env::set_var(RunnerConfig::ENV_CONFIG_PATH, &overridden);
    let loaded = RunnerConfig::load_with_source(&[candidate]).unwrap();
    std::env::remove_var(RunnerConfig::ENV_CONFIG_PATH);
    assert_eq!(loaded.source, Some(overridden));
    assert_eq!(loaded.config.logging.format, LogFormat::StructuredJson);
}

#[test]
fn invalid_files_are_rejected_with_path_context() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[exit_codes]\nspecification = 0\n").unwrap();
    let err = RunnerConfig::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bad.toml"));

    let missing: PathBuf = dir.path().join("missing.toml");
    assert!(RunnerConfig::from_path(&missing).is_err());
}
