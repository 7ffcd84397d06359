// src/stage.rs

//! Support-tool staging.
//!
//! The external installer needs a set of support files (the installer jar
//! and whatever it ships with) present in every task's work dir. They are
//! staged once at startup from a directory on disk; the top-level listing
//! becomes the manifest the cleanup scripts are generated from.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::Result;

/// One top-level entry of the staged tools, as recorded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    pub name: String,
    pub is_dir: bool,
}

/// The staged support tools: a source directory plus its manifest.
#[derive(Debug)]
pub struct ToolStage {
    root: PathBuf,
    entries: Vec<ToolEntry>,
}

impl ToolStage {
    /// Read the staging directory and capture its top-level manifest.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut entries = Vec::new();

        let listing =
            fs::read_dir(&root).with_context(|| format!("reading tool stage at {root:?}"))?;
        for entry in listing {
            let entry = entry.with_context(|| format!("listing tool stage at {root:?}"))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .with_context(|| format!("inspecting staged entry {name:?}"))?
                .is_dir();
            entries.push(ToolEntry { name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level manifest, in stable (sorted) order.
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Copy the staged tools into a task's work dir. Failure here is fatal
    /// for the task.
    pub fn unpack_into(&self, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest).with_context(|| format!("creating unpack target {dest:?}"))?;
        copy_tree(&self.root, dest)?;
        Ok(())
    }
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in fs::read_dir(src).with_context(|| format!("reading {src:?}"))? {
        let entry = entry.with_context(|| format!("reading {src:?}"))?;
        let target = dest.join(entry.file_name());
        if entry
            .file_type()
            .with_context(|| format!("inspecting {:?}", entry.path()))?
            .is_dir()
        {
            fs::create_dir_all(&target).with_context(|| format!("creating {target:?}"))?;
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {:?} to {target:?}", entry.path()))?;
        }
    }
    Ok(())
}
