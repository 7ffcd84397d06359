// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildswarm`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildswarm",
    version,
    about = "Build multiple server versions in parallel through the external installer tool.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Buildswarm.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Buildswarm.toml")]
    pub config: String,

    /// Version to build (repeatable). Overrides `[build].versions`.
    #[arg(long, value_name = "VERSION")]
    pub rev: Vec<String>,

    /// Version that should also get the craftbukkit compile step
    /// (repeatable). Only used together with `--rev`.
    #[arg(long, value_name = "VERSION")]
    pub craftbukkit: Vec<String>,

    /// Number of workers to start. Overrides `[build].starting_workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDSWARM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the build plan without executing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
