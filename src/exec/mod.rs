// src/exec/mod.rs

//! External process execution.

pub mod runner;

pub use runner::{ProcessRunner, normalize_line};
