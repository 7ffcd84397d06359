use std::collections::BTreeSet;
use std::error::Error;
use std::path::Path;

use tempfile::tempdir;

use buildswarm::stage::ToolEntry;
use buildswarm::task::{BuildTask, ScriptWriter, ShellFamily};

type TestResult = Result<(), Box<dyn Error>>;

fn task(version: &str, optional: bool, root: &Path) -> BuildTask {
    let mut task = BuildTask::new(version, root).expect("valid version");
    task.request_optional_step(optional);
    task
}

fn installer_lines(body: &str, version: &str) -> Vec<String> {
    body.lines()
        .filter(|l| l.contains(&format!("--rev {version}")))
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn minor_16_with_optional_step_emits_two_invocations() {
    let writer = ScriptWriter::new(ShellFamily::posix());
    let body = writer.render_installer(&task("1.16.5", true, Path::new("/tmp/build")));

    let lines = installer_lines(&body, "1.16.5");
    assert_eq!(lines.len(), 2);
    assert!(!lines[0].contains("--compile craftbukkit"));
    assert!(lines[1].ends_with("--compile craftbukkit"));
}

#[test]
fn minor_12_with_optional_step_emits_one_invocation() {
    let writer = ScriptWriter::new(ShellFamily::posix());
    let body = writer.render_installer(&task("1.12.2", true, Path::new("/tmp/build")));

    assert_eq!(installer_lines(&body, "1.12.2").len(), 1);
    assert!(!body.contains("craftbukkit"));
}

#[test]
fn minor_16_without_flag_emits_one_invocation() {
    let writer = ScriptWriter::new(ShellFamily::posix());
    let body = writer.render_installer(&task("1.16.5", false, Path::new("/tmp/build")));

    assert_eq!(installer_lines(&body, "1.16.5").len(), 1);
}

#[test]
fn cleanup_targets_equal_manifest_entries() {
    let entries = vec![
        ToolEntry {
            name: "BuildData".to_string(),
            is_dir: true,
        },
        ToolEntry {
            name: "BuildTools.jar".to_string(),
            is_dir: false,
        },
        ToolEntry {
            name: "apache-maven".to_string(),
            is_dir: true,
        },
    ];

    let writer = ScriptWriter::new(ShellFamily::posix());
    let task = task("1.16.5", false, Path::new("/tmp/build"));
    let body = writer.render_cleanup(&task, &entries);

    // Every remove line quotes its target; collect them.
    let targets: BTreeSet<String> = body
        .lines()
        .filter_map(|l| l.split('"').nth(1))
        .map(|s| s.to_string())
        .collect();

    let expected: BTreeSet<String> = entries
        .iter()
        .map(|e| task.work_dir().join(&e.name).display().to_string())
        .collect();
    assert_eq!(targets, expected);

    // Directories get the recursive remove, files the plain one.
    for line in body.lines().filter(|l| l.contains('"')) {
        if line.contains("BuildTools.jar") {
            assert!(line.starts_with("rm \""), "file entry uses rm: {line}");
        } else {
            assert!(line.starts_with("rm -r \""), "dir entry uses rm -r: {line}");
        }
    }
}

#[test]
fn windows_family_uses_batch_syntax() {
    let shell = ShellFamily::windows();
    assert_eq!(shell.installer_script(), "installer.bat");
    assert_eq!(shell.cleanup_script(), "cleanup.bat");

    let writer = ScriptWriter::new(shell);
    let task = task("1.16.5", false, Path::new("/opt/build"));
    let entries = vec![
        ToolEntry {
            name: "BuildData".to_string(),
            is_dir: true,
        },
        ToolEntry {
            name: "BuildTools.jar".to_string(),
            is_dir: false,
        },
    ];
    let body = writer.render_cleanup(&task, &entries);

    assert!(body.starts_with("@echo off\n"));
    assert!(body.contains("RD /s /q \"\\opt\\build\\1_16_5\\BuildData\""));
    assert!(body.contains("DEL /q \"\\opt\\build\\1_16_5\\BuildTools.jar\""));
}

#[test]
fn relative_build_root_yields_absolute_cleanup_targets() {
    // The cleanup script runs with the work dir as its cwd; targets rendered
    // from a relative root would miss from there.
    let task = task("1.16.5", false, Path::new("./BuildTools"));
    assert!(task.work_dir().is_absolute());

    let writer = ScriptWriter::new(ShellFamily::posix());
    let entries = vec![ToolEntry {
        name: "BuildTools.jar".to_string(),
        is_dir: false,
    }];
    let body = writer.render_cleanup(&task, &entries);

    for target in body.lines().filter_map(|l| l.split('"').nth(1)) {
        assert!(
            Path::new(target).is_absolute(),
            "cleanup target must be absolute: {target}"
        );
    }
}

#[test]
fn scripts_are_written_and_removed_on_disk() -> TestResult {
    let root = tempdir()?;
    let task = task("1.16.5", false, root.path());
    task.ensure_work_dir()?;

    let writer = ScriptWriter::new(ShellFamily::posix());
    writer.write_scripts(&task, &[])?;
    assert!(writer.installer_path(&task).is_file());
    assert!(writer.cleanup_path(&task).is_file());

    writer.remove_scripts(&task)?;
    assert!(!writer.installer_path(&task).exists());
    assert!(!writer.cleanup_path(&task).exists());

    Ok(())
}

#[test]
fn work_dir_is_derived_from_identifier() {
    let task = task("1.16.5", false, Path::new("/tmp/build"));
    assert_eq!(task.work_dir(), Path::new("/tmp/build/1_16_5"));
    assert_eq!(task.minor_version(), 16);
}
