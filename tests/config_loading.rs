use std::error::Error;
use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use buildswarm::config::{load_and_validate, load_from_path};
use buildswarm::errors::SwarmError;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("Buildswarm.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn defaults_are_applied_for_missing_fields() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[build]
versions = ["1.16.5"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.build.versions, vec!["1.16.5"]);
    assert_eq!(cfg.build.starting_workers, 2);
    assert_eq!(cfg.build.build_root, "./BuildTools");

    let timings = cfg.timing.to_timings();
    assert_eq!(timings.poll, Duration::from_millis(200));
    assert_eq!(timings.settle, Duration::from_millis(3000));
    assert_eq!(timings.grace, Duration::from_millis(5000));

    Ok(())
}

#[test]
fn timing_overrides_are_honoured() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[build]
versions = ["1.16.5"]

[timing]
settle_ms = 10
grace_ms = 20
"#,
    )?;

    let timings = load_and_validate(&path)?.timing.to_timings();
    assert_eq!(timings.settle, Duration::from_millis(10));
    assert_eq!(timings.grace, Duration::from_millis(20));
    // Untouched fields keep their defaults.
    assert_eq!(timings.startup, Duration::from_millis(500));

    Ok(())
}

#[test]
fn zero_workers_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[build]
versions = ["1.16.5"]
starting_workers = 0
"#,
    )?;

    match load_and_validate(&path) {
        Err(SwarmError::Config(msg)) => assert!(msg.contains("starting_workers")),
        other => panic!("expected Config error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn version_without_minor_component_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[build]
versions = ["latest"]
"#,
    )?;

    match load_and_validate(&path) {
        Err(SwarmError::InvalidVersion(v)) => assert_eq!(v, "latest"),
        other => panic!("expected InvalidVersion, got {other:?}"),
    }

    Ok(())
}

#[test]
fn craftbukkit_entry_must_be_a_listed_version() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[build]
versions = ["1.16.5"]
craftbukkit = ["1.15.2"]
"#,
    )?;

    match load_and_validate(&path) {
        Err(SwarmError::Config(msg)) => assert!(msg.contains("1.15.2")),
        other => panic!("expected Config error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let (_dir, path) = write_config("[build\nversions = 3")?;

    match load_from_path(&path) {
        Err(SwarmError::Toml(_)) => {}
        other => panic!("expected Toml error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn missing_config_file_is_an_io_error() -> TestResult {
    let dir = tempdir()?;

    match load_from_path(dir.path().join("nope.toml")) {
        Err(SwarmError::Io(_)) => {}
        other => panic!("expected Io error, got {other:?}"),
    }

    Ok(())
}
