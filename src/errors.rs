// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwarmError {
    /// `WorkerPool::remove_last` was called with no workers registered.
    #[error("worker pool is empty")]
    EmptyPool,

    #[error("configuration error: {0}")]
    Config(String),

    /// A version identifier did not contain at least two numeric components.
    #[error("invalid version identifier: '{0}'")]
    InvalidVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
