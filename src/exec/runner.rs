// src/exec/runner.rs

//! Launching generated scripts and demultiplexing their output.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::bridge::LogSink;
use crate::errors::Result;
use crate::task::ShellFamily;

/// Runs one script as a child process and routes its output.
///
/// stdout lines are normalized and forwarded to the sink immediately at
/// CONSOLE level. stderr lines are buffered on a separate drain task (so
/// neither pipe can back up and deadlock the child) and reported in one
/// block after the process has exited and both streams hit EOF: an ERROR
/// summary followed by every captured line at CONSOLE_ERROR.
///
/// The exit code is logged but never drives control flow; the pipeline is
/// best-effort and surfaces problems through the log stream only.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    shell: ShellFamily,
    settle: Duration,
}

impl ProcessRunner {
    pub fn new(shell: ShellFamily, settle: Duration) -> Self {
        Self { shell, settle }
    }

    /// Execute `script` (a file name inside `work_dir`) to completion.
    ///
    /// Returns `Err` only when the process could not be launched or awaited;
    /// stderr output from a process that did run is reported, not returned.
    pub async fn run(&self, script: &str, work_dir: &Path, sink: &LogSink) -> Result<()> {
        let (program, args) = self.shell.launch(script);
        debug!(%script, work_dir = ?work_dir, "launching script");

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(work_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning {script} in {work_dir:?}"))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let collector = tokio::spawn(async move {
            let mut collected = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let line = normalize_line(&line);
                    if !line.is_empty() {
                        collected.push(line);
                    }
                }
            }
            collected
        });

        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = normalize_line(&line);
                if !line.is_empty() {
                    sink.console(line);
                }
            }
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for {script}"))?;
        debug!(%script, exit_code = status.code().unwrap_or(-1), "script process exited");

        let errors = match collector.await {
            Ok(errors) => errors,
            Err(err) => {
                warn!(error = %err, "stderr drain task aborted");
                Vec::new()
            }
        };

        if !errors.is_empty() {
            sink.error("Errors were found during this step. The result may be unusable.");
            for line in errors {
                sink.console_error(line);
            }
        }

        // Deliberate pause so slow observers can drain the captured output
        // before the next step starts.
        sleep(self.settle).await;
        Ok(())
    }
}

/// Normalize one captured output line: drop trailing terminators, widen tabs
/// to two spaces, and collapse escaped backslash sequences the way the tool's
/// own output uses them.
pub fn normalize_line(raw: &str) -> String {
    raw.trim_end_matches(['\r', '\n'])
        .replace('\t', "  ")
        .replace("\\r", "")
        .replace("\\n", "")
        .replace("\\t", "  ")
        .replace("\\\\", "\\")
}
