//! Locating charts inside a checkout.

use crate::chart::descriptor::CHART_FILE;
use std::path::Path;
use walkdir::WalkDir;

/// Every directory under `root` holding a `Chart.yaml`, as sorted relative
/// paths. `.git` and vendored `charts/` subdirectories are not descended.
pub fn discover_charts(root: &Path) -> Vec<String> {
    let mut found: Vec<String> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !skipped(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == CHART_FILE)
        .filter_map(|e| {
            let dir = e.path().parent()?;
            let rel = dir.strip_prefix(root).ok()?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            Some(if rel.is_empty() { ".".to_string() } else { rel })
        })
        .collect();
    found.sort();
    found.dedup();
    found
}

fn skipped(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == ".git" || (name == "charts" && is_chart_dir(entry.path().parent()))
}

fn is_chart_dir(dir: Option<&Path>) -> bool {
    dir.map(|d| d.join(CHART_FILE).is_file()).unwrap_or(false)
}
