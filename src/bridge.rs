// src/bridge.rs

//! Per-worker log bridge.
//!
//! Each worker owns a [`LogSink`] and hands the matching [`LogStream`] to
//! whatever observer wants to display its output (the CLI front end here, a
//! GUI in other hosts). The channel is unbounded so producers never block on
//! a slow or absent observer; it is the observer's job to drain it.
//!
//! The two extra severities `Console` and `ConsoleError` carry lines captured
//! from an external process' stdout/stderr. They are first-class variants
//! rather than ad-hoc extensions of some shared logging facility.

use std::fmt;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    /// A line the external build tool wrote to stdout.
    Console,
    /// A line the external build tool wrote to stderr.
    ConsoleError,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Console => "CONSOLE",
            LogLevel::ConsoleError => "CONSOLE_ERROR",
        };
        f.write_str(s)
    }
}

/// One structured log record as seen by an observer.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.message
        )
    }
}

/// Producer half of a worker's log bridge.
///
/// Cloneable; the worker and its `ProcessRunner` share one sink. Sends never
/// block and a missing receiver is tolerated (records are simply dropped once
/// the observer has gone away).
#[derive(Debug, Clone)]
pub struct LogSink {
    worker: String,
    tx: mpsc::UnboundedSender<LogRecord>,
}

/// Consumer half; drained by the registered observer.
pub type LogStream = mpsc::UnboundedReceiver<LogRecord>;

/// Create the bridge for one worker.
pub fn channel(worker: &str) -> (LogSink, LogStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        LogSink {
            worker: worker.to_string(),
            tx,
        },
        rx,
    )
}

impl LogSink {
    pub fn worker(&self) -> &str {
        &self.worker
    }

    fn emit(&self, level: LogLevel, message: String) {
        // Mirror onto the process-wide tracing subscriber for diagnostics;
        // the bridge itself stays the product-facing channel.
        match level {
            LogLevel::Debug | LogLevel::Console => {
                debug!(worker = %self.worker, %level, "{message}");
            }
            LogLevel::Info => info!(worker = %self.worker, "{message}"),
            LogLevel::Warning => warn!(worker = %self.worker, "{message}"),
            LogLevel::Error | LogLevel::Critical | LogLevel::ConsoleError => {
                error!(worker = %self.worker, %level, "{message}");
            }
        }

        let _ = self.tx.send(LogRecord {
            timestamp: Local::now(),
            level,
            message,
        });
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into());
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.emit(LogLevel::Critical, message.into());
    }

    pub fn console(&self, message: impl Into<String>) {
        self.emit(LogLevel::Console, message.into());
    }

    pub fn console_error(&self, message: impl Into<String>) {
        self.emit(LogLevel::ConsoleError, message.into());
    }
}
