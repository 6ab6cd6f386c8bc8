//! Removal of label and annotation sections from `dyff between` output.

use regex::Regex;
use std::sync::LazyLock;

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

fn is_metadata_path(path: &str) -> bool {
    path.contains("metadata.labels") || path.contains("metadata.annotations")
}

/// An unindented line that does not start with a diff marker
fn is_path_line(line: &str) -> bool {
    if line.starts_with(' ') || line.starts_with('\t') {
        return false;
    }
    match line.trim().chars().next() {
        None => false,
        Some(c) => !matches!(c, '±' | '+' | '-' | ' '),
    }
}

/// Drop every dyff section whose path names `metadata.labels` or
/// `metadata.annotations`, including nested ones such as
/// `spec.template.metadata.labels`
pub fn filter_metadata_sections(output: &str) -> String {
    let lines: Vec<&str> = output.split('\n').collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut skipping = false;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if !line.starts_with(' ') && !line.starts_with('\t') {
            if is_metadata_path(trimmed) {
                skipping = true;
                continue;
            } else if is_path_line(trimmed) {
                skipping = false;
            }
        }

        if skipping {
            if trimmed.is_empty() {
                if let Some(next) = lines.get(i + 1) {
                    if is_path_line(next) {
                        skipping = false;
                    }
                }
            }
            continue;
        }

        kept.push(*line);
    }

    let joined = kept.join("\n");
    EXCESS_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
