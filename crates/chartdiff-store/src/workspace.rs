//! Per-comparison scratch workspace.
//!
//! A [`Workspace`] owns `<root>/<request_id>` exclusively and removes it when
//! dropped, on success, error and unwind alike.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use chartdiff_core_types::RequestId;
use std::fs;
use std::path::{Path, PathBuf};

/// Which side of a comparison a chart copy belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Side::Left => "version1",
            Side::Right => "version2",
        }
    }
}

/// Scratch directory handle with guaranteed cleanup
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Create `<base>/<request_id>`
    ///
    /// # Errors
    ///
    /// `Io` if the directory cannot be created or already exists.
    pub fn create(base: &Path, request_id: &RequestId) -> Result<Self> {
        fs::create_dir_all(base).map_err(|e| io_error("create_work_root", e))?;
        let root = base.join(request_id.as_str());
        fs::create_dir(&root).map_err(|e| io_error("create_workspace", e))?;
        tracing::debug!(path = %root.display(), "workspace created");
        Ok(Self { root, keep: false })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the repository is cloned
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// Where one version's chart is copied
    pub fn chart_dir(&self, side: Side) -> PathBuf {
        self.root.join(side.dir_name())
    }

    /// Where inline values content is written
    pub fn values_file(&self) -> PathBuf {
        self.root.join("values.yaml")
    }

    /// Write inline values into the workspace
    ///
    /// # Errors
    ///
    /// `Io` on write failure.
    pub fn write_values(&self, content: &str) -> Result<PathBuf> {
        let path = self.values_file();
        fs::write(&path, content).map_err(|e| io_error("write_values", e))?;
        Ok(path)
    }

    /// Leave the directory on disk when dropped, for debugging
    pub fn keep_on_drop(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!(path = %self.root.display(), "workspace kept");
            return;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => tracing::debug!(path = %self.root.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.root.display(),
                error = %e,
                "failed to remove workspace"
            ),
        }
    }
}
