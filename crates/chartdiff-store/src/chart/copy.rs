//! Copying a chart out of a checkout.

#![allow(clippy::result_large_err)]

use crate::chart::discovery::discover_charts;
use crate::errors::{chart_path_not_found, io_error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, creating `dst` if needed
///
/// Symlinks are not followed into directories. A linked file is copied by
/// content only when its target lies inside `boundary`; any other link is
/// skipped.
fn copy_tree(src: &Path, dst: &Path, boundary: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| io_error("copy_chart", e))?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            io_error(
                "copy_chart",
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| io_error("copy_chart", e))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).map_err(|e| io_error("copy_chart", e))?;
        } else if file_type.is_symlink() {
            match fs::canonicalize(entry.path()) {
                Ok(real) if real.starts_with(boundary) && real.is_file() => {
                    fs::copy(&real, &target).map_err(|e| io_error("copy_chart", e))?;
                }
                Ok(real) if !real.starts_with(boundary) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        "skipping symlink leaving the checkout"
                    );
                }
                _ => tracing::debug!(path = %entry.path().display(), "skipping symlink"),
            }
        }
    }
    Ok(())
}

/// Copy `<repo_dir>/<chart_path>` into `dest`
///
/// Linked files inside the chart are copied only when they point somewhere
/// within the checkout.
///
/// # Errors
///
/// `ChartPathNotFound` (with the discovered chart directories as
/// diagnostics) when the subpath is missing, escapes the checkout or is not
/// a directory. `Io` when the copy itself fails.
pub fn extract_chart(repo_dir: &Path, chart_path: &str, version: &str, dest: &Path) -> Result<PathBuf> {
    let boundary = fs::canonicalize(repo_dir).map_err(|e| io_error("extract_chart", e))?;
    let source = match resolve_in_checkout(&boundary, chart_path) {
        Some(p) if p.is_dir() => p,
        _ => {
            let candidates = discover_charts(repo_dir);
            tracing::debug!(chart_path, version, candidates = candidates.len(), "chart path missing");
            return Err(chart_path_not_found(chart_path, version, candidates));
        }
    };

    copy_tree(&source, dest, &boundary)?;
    tracing::debug!(chart_path, version, dest = %dest.display(), "chart extracted");
    Ok(dest.to_path_buf())
}

/// Resolve `rel` under `root` to an existing path that stays inside `root`
///
/// `rel` must be relative without `..`. Symlinks along the way are resolved
/// and the result is rejected when its real location leaves `root`.
pub fn resolve_in_checkout(root: &Path, rel: &str) -> Option<PathBuf> {
    let root = fs::canonicalize(root).ok()?;
    let joined = resolve_within(&root, rel)?;
    let real = fs::canonicalize(joined).ok()?;
    real.starts_with(&root).then_some(real)
}

/// Join a relative path without allowing it to leave `root`
fn resolve_within(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(rel.trim()).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
