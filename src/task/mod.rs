// src/task/mod.rs

//! Build tasks, script generation, and the shared task queue.

pub mod build_task;
pub mod queue;
pub mod script;

pub use build_task::{BuildTask, CRAFTBUKKIT_MIN_MINOR, INSTALLER_JAR, minor_component};
pub use queue::TaskQueue;
pub use script::{ScriptWriter, ShellFamily};
