// src/task/build_task.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;

use crate::errors::{Result, SwarmError};

/// Name of the external installer jar inside the support-tool stage.
pub const INSTALLER_JAR: &str = "BuildTools.jar";

/// Versions up to and including this minor component never get the extra
/// craftbukkit compile step, regardless of what the producer asked for.
pub const CRAFTBUKKIT_MIN_MINOR: u32 = 13;

/// Extract the minor component (second run of digits) from a version
/// identifier such as `"1.16.5"`.
pub fn minor_component(identifier: &str) -> Result<u32> {
    let digits = Regex::new(r"\d+").expect("static regex");
    let minor = digits
        .find_iter(identifier)
        .nth(1)
        .ok_or_else(|| SwarmError::InvalidVersion(identifier.to_string()))?;
    minor
        .as_str()
        .parse::<u32>()
        .map_err(|_| SwarmError::InvalidVersion(identifier.to_string()))
}

/// One unit of work: a version to build.
///
/// Constructed by the producer, optionally flagged for the extra compile
/// step, then moved into the queue. After dequeue a worker only reads it.
#[derive(Debug, Clone)]
pub struct BuildTask {
    identifier: String,
    minor_version: u32,
    work_dir: PathBuf,
    wants_optional_step: bool,
}

impl BuildTask {
    /// Create a task for `identifier`, deriving the work dir under
    /// `build_root` (dots in the identifier become underscores).
    ///
    /// The root is anchored to an absolute path: the cleanup script embeds
    /// the rendered work-dir paths and executes with the work dir as its
    /// cwd, so a relative root would make every remove target miss.
    pub fn new(identifier: &str, build_root: &Path) -> Result<Self> {
        let minor_version = minor_component(identifier)?;
        let build_root = std::path::absolute(build_root)?;
        let work_dir = build_root.join(identifier.replace('.', "_"));
        Ok(Self {
            identifier: identifier.to_string(),
            minor_version,
            work_dir,
            wants_optional_step: false,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn wants_optional_step(&self) -> bool {
        self.wants_optional_step
    }

    /// Producer-side flag for the extra craftbukkit compile step. Only
    /// meaningful before the task is enqueued.
    pub fn request_optional_step(&mut self, wanted: bool) {
        self.wants_optional_step = wanted;
    }

    /// Whether the installer script should carry the second invocation.
    /// Domain rule: the flag only takes effect above minor 13.
    pub fn wants_craftbukkit_compile(&self) -> bool {
        self.wants_optional_step && self.minor_version > CRAFTBUKKIT_MIN_MINOR
    }

    /// The installer invocation for this version. The output dir points one
    /// level up so built artifacts land next to the per-version work dirs.
    pub fn installer_command(&self) -> String {
        format!(
            "java -jar {INSTALLER_JAR} --rev {} --output-dir ./../",
            self.identifier
        )
    }

    /// Create the work dir if it does not exist yet. Failure here is fatal
    /// for the task.
    pub fn ensure_work_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.work_dir)
            .with_context(|| format!("creating work dir {:?}", self.work_dir))?;
        Ok(())
    }
}

impl fmt::Display for BuildTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
