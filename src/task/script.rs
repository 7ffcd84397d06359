// src/task/script.rs

//! Generation of the per-task installer and cleanup scripts.
//!
//! The shell family (script extension, remove commands, launch syntax) is
//! resolved once at startup into an explicit [`ShellFamily`] value and passed
//! in wherever scripts are written or launched; nothing here consults the OS
//! at write time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::Result;
use crate::stage::ToolEntry;
use crate::task::build_task::BuildTask;

/// Platform-dependent script syntax.
#[derive(Debug, Clone, Copy)]
pub struct ShellFamily {
    pub script_ext: &'static str,
    pub remove_dir_cmd: &'static str,
    pub remove_file_cmd: &'static str,
    header: &'static str,
    windows: bool,
}

impl ShellFamily {
    /// The family matching the OS this process runs on.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::posix()
        }
    }

    pub fn windows() -> Self {
        Self {
            script_ext: "bat",
            remove_dir_cmd: "RD /s /q",
            remove_file_cmd: "DEL /q",
            header: "@echo off",
            windows: true,
        }
    }

    pub fn posix() -> Self {
        Self {
            script_ext: "sh",
            remove_dir_cmd: "rm -r",
            remove_file_cmd: "rm",
            header: "#!/bin/sh",
            windows: false,
        }
    }

    pub fn installer_script(&self) -> String {
        format!("installer.{}", self.script_ext)
    }

    pub fn cleanup_script(&self) -> String {
        format!("cleanup.{}", self.script_ext)
    }

    /// Program + arguments to launch a script that sits in the process'
    /// working directory.
    pub fn launch(&self, script: &str) -> (String, Vec<String>) {
        if self.windows {
            ("cmd".to_string(), vec!["/C".to_string(), script.to_string()])
        } else {
            ("sh".to_string(), vec![format!("./{script}")])
        }
    }

    fn display_path(&self, path: &Path) -> String {
        let raw = path.display().to_string();
        if self.windows {
            raw.replace('/', "\\")
        } else {
            raw
        }
    }

    fn remove_line(&self, path: &Path, is_dir: bool) -> String {
        let cmd = if is_dir {
            self.remove_dir_cmd
        } else {
            self.remove_file_cmd
        };
        format!("{cmd} \"{}\"", self.display_path(path))
    }
}

/// Renders and writes the two scripts for a task.
#[derive(Debug, Clone, Copy)]
pub struct ScriptWriter {
    shell: ShellFamily,
}

impl ScriptWriter {
    pub fn new(shell: ShellFamily) -> Self {
        Self { shell }
    }

    pub fn installer_path(&self, task: &BuildTask) -> PathBuf {
        task.work_dir().join(self.shell.installer_script())
    }

    pub fn cleanup_path(&self, task: &BuildTask) -> PathBuf {
        task.work_dir().join(self.shell.cleanup_script())
    }

    /// Installer script body: one invocation of the external tool, plus the
    /// conditional craftbukkit invocation (see
    /// [`BuildTask::wants_craftbukkit_compile`]).
    pub fn render_installer(&self, task: &BuildTask) -> String {
        let command = task.installer_command();
        let mut body = format!("{}\n{command}\n", self.shell.header);
        if task.wants_craftbukkit_compile() {
            body.push_str(&format!("{command} --compile craftbukkit\n"));
        }
        body
    }

    /// Cleanup script body: one remove line per staged tool entry, targeting
    /// the copy under the task's work dir. The dir-vs-file decision comes
    /// from the manifest captured at startup, not from probing the work dir
    /// (which has not been populated yet when this is written).
    pub fn render_cleanup(&self, task: &BuildTask, entries: &[ToolEntry]) -> String {
        let mut body = format!("{}\n", self.shell.header);
        for entry in entries {
            let target = task.work_dir().join(&entry.name);
            body.push_str(&self.shell.remove_line(&target, entry.is_dir));
            body.push('\n');
        }
        body
    }

    /// Write both scripts into the task's work dir. A write failure is fatal
    /// for the task.
    pub fn write_scripts(&self, task: &BuildTask, entries: &[ToolEntry]) -> Result<()> {
        let installer = self.installer_path(task);
        fs::write(&installer, self.render_installer(task))
            .with_context(|| format!("writing installer script {installer:?}"))?;

        let cleanup = self.cleanup_path(task);
        fs::write(&cleanup, self.render_cleanup(task, entries))
            .with_context(|| format!("writing cleanup script {cleanup:?}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for path in [&installer, &cleanup] {
                fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                    .with_context(|| format!("marking {path:?} executable"))?;
            }
        }

        Ok(())
    }

    /// Delete both scripts after the pipeline has run them.
    pub fn remove_scripts(&self, task: &BuildTask) -> Result<()> {
        for path in [self.installer_path(task), self.cleanup_path(task)] {
            fs::remove_file(&path).with_context(|| format!("removing script {path:?}"))?;
        }
        Ok(())
    }
}
