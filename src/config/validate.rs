// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{Result, SwarmError};
use crate::task::minor_component;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `starting_workers >= 1`
/// - `poll_ms >= 1` (a zero poll would busy-spin the workers)
/// - every listed version has at least two numeric components
/// - every `craftbukkit` entry also appears in `versions`
///
/// It does **not** check that `tools_dir` exists; that is resolved when the
/// tool stage is loaded at startup.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.starting_workers == 0 {
        return Err(SwarmError::Config(
            "[build].starting_workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.timing.poll_ms == 0 {
        return Err(SwarmError::Config(
            "[timing].poll_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    for version in &cfg.build.versions {
        minor_component(version)?;
    }

    for extra in &cfg.build.craftbukkit {
        if !cfg.build.versions.contains(extra) {
            return Err(SwarmError::Config(format!(
                "[build].craftbukkit entry '{extra}' is not listed in [build].versions"
            )));
        }
    }

    Ok(())
}
