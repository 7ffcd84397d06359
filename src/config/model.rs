// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// build_root = "./BuildTools"
/// tools_dir = "./tools"
/// versions = ["1.16.5", "1.12.2"]
/// craftbukkit = ["1.16.5"]
/// starting_workers = 2
///
/// [timing]
/// settle_ms = 3000
/// ```
///
/// All sections are optional and have defaults; `[build].versions` may also
/// be supplied (or overridden) on the command line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub timing: TimingSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Directory under which one work dir per version is created.
    #[serde(default = "default_build_root")]
    pub build_root: String,

    /// Staging directory holding the support tools (the installer jar and its
    /// helpers) that get unpacked into every work dir.
    #[serde(default = "default_tools_dir")]
    pub tools_dir: String,

    /// Versions to build, e.g. `["1.16.5", "1.12.2"]`.
    #[serde(default)]
    pub versions: Vec<String>,

    /// Versions that should also get the extra craftbukkit compile step.
    /// Only honoured for versions with a minor component above 13.
    #[serde(default)]
    pub craftbukkit: Vec<String>,

    /// How many workers to start before enqueueing tasks.
    #[serde(default = "default_starting_workers")]
    pub starting_workers: usize,
}

fn default_build_root() -> String {
    "./BuildTools".to_string()
}

fn default_tools_dir() -> String {
    "./tools".to_string()
}

fn default_starting_workers() -> usize {
    2
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            build_root: default_build_root(),
            tools_dir: default_tools_dir(),
            versions: Vec::new(),
            craftbukkit: Vec::new(),
            starting_workers: default_starting_workers(),
        }
    }
}

/// `[timing]` section.
///
/// The defaults match the intended production pacing; tests and impatient
/// operators can shrink them.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingSection {
    /// Delay before a freshly started worker begins polling.
    #[serde(default = "default_startup_ms")]
    pub startup_ms: u64,

    /// How long a worker waits on the queue per poll.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    /// Pause after each external process completes, so observers can drain
    /// the captured output before the next step starts.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause between a worker's final log record and the release of its sink.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_startup_ms() -> u64 {
    500
}

fn default_poll_ms() -> u64 {
    200
}

fn default_settle_ms() -> u64 {
    3000
}

fn default_grace_ms() -> u64 {
    5000
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            startup_ms: default_startup_ms(),
            poll_ms: default_poll_ms(),
            settle_ms: default_settle_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

impl TimingSection {
    pub fn to_timings(&self) -> Timings {
        Timings {
            startup: Duration::from_millis(self.startup_ms),
            poll: Duration::from_millis(self.poll_ms),
            settle: Duration::from_millis(self.settle_ms),
            grace: Duration::from_millis(self.grace_ms),
        }
    }
}

/// Resolved pacing values shared by workers and the process runner.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub startup: Duration,
    pub poll: Duration,
    pub settle: Duration,
    pub grace: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        TimingSection::default().to_timings()
    }
}
