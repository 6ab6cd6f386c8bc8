//! Diff normalization.
//!
//! Guarantees a [`StructuredDiff`] whenever any diff input exists. Inputs are
//! considered in priority order, first present wins:
//!
//! 1. a pinned, pre-built structured diff (overrides and fixtures)
//! 2. the structured diff produced by the primary differ
//! 3. a plain line-oriented diff, parsed here
//!
//! The plain-text parser recognizes resource boundaries written as a
//! parenthesized slash-separated identity, as in dyff output:
//!
//! ```text
//! spec.replicas  (apps/v1/Deployment/default/web)
//!   ± value change
//!     - 3
//!     + 2
//! ```
//!
//! It cannot recover field paths, so each block with change lines yields a
//! single opaque change. Input without any boundary collapses into one
//! synthetic `Generic/comparison-result` resource.

use crate::model::{
    Change, ChangeStats, ChangeType, DiffMetadata, DiffStats, Importance, InputSources,
    ResourceDiff, ResourceIdentity, ResourceStats, ResourceSummary, SourceMetadata,
    StructuredDiff,
};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Engine version stamped on diffs converted from plain text
pub const CONVERTED_ENGINE_VERSION: &str = "1.0.0-converted";

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^()\s/]*(?:/[^()\s/]*){2,})\)").expect("static regex")
});

/// The available diff inputs for one comparison
#[derive(Debug, Clone, Default)]
pub struct DiffSources<'a> {
    pub pinned: Option<StructuredDiff>,
    pub primary: Option<StructuredDiff>,
    pub plain: Option<&'a str>,
}

impl<'a> DiffSources<'a> {
    pub fn from_primary(diff: StructuredDiff) -> Self {
        Self {
            primary: Some(diff),
            ..Self::default()
        }
    }

    pub fn from_plain(plain: &'a str) -> Self {
        Self {
            plain: Some(plain),
            ..Self::default()
        }
    }
}

/// Pick the highest-priority input, parsing the plain diff if necessary
///
/// Returns `None` only when no structured input exists and the plain diff is
/// absent, empty or whitespace-only.
pub fn normalize(
    sources: DiffSources<'_>,
    v1: Option<&str>,
    v2: Option<&str>,
) -> Option<StructuredDiff> {
    if let Some(pinned) = sources.pinned {
        tracing::debug!("using pinned structured diff");
        return Some(pinned);
    }
    if let Some(primary) = sources.primary {
        return Some(primary);
    }
    sources
        .plain
        .and_then(|plain| parse_plain_diff(plain, v1, v2))
}

/// Identity encoded in a boundary line, if the line is one
///
/// Layouts by segment count:
/// - 3: `kind/namespace/name` (apiVersion defaults to `v1`)
/// - 4: `apiVersion/kind/namespace/name`
/// - 5: `group/version/kind/namespace/name`
/// - more: first segment is the kind, second the namespace, last the name
///
/// A `default` namespace is normalized to the empty string.
pub fn parse_boundary(line: &str) -> Option<ResourceIdentity> {
    let captures = BOUNDARY.captures(line.trim())?;
    let token = captures.get(1)?.as_str();
    let parts: Vec<&str> = token.split('/').collect();

    let (api_version, kind, namespace, name) = match parts.as_slice() {
        [kind, namespace, name] => ("v1".to_string(), *kind, *namespace, *name),
        [api_version, kind, namespace, name] => {
            (api_version.to_string(), *kind, *namespace, *name)
        }
        [group, version, kind, namespace, name] => {
            (format!("{}/{}", group, version), *kind, *namespace, *name)
        }
        _ => (
            "v1".to_string(),
            parts.first().copied().unwrap_or_default(),
            parts.get(1).copied().unwrap_or_default(),
            parts.last().copied().unwrap_or_default(),
        ),
    };

    let kind = if kind.is_empty() { "Unknown" } else { kind };
    let name = if name.is_empty() { "unknown" } else { name };
    let namespace = if namespace == "default" { "" } else { namespace };
    let api_version = if api_version.is_empty() {
        "v1".to_string()
    } else {
        api_version
    };

    Some(ResourceIdentity::new(api_version, kind, namespace, name))
}

fn is_change_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('+') || trimmed.starts_with('-') || trimmed.starts_with('~')
}

fn general_summary(total_changes: usize) -> ResourceSummary {
    ResourceSummary {
        total_changes,
        by_importance: None,
        categories: Some(vec!["general".to_string()]),
    }
}

fn finalize_block(identity: ResourceIdentity, lines: &[&str]) -> ResourceDiff {
    let change_lines = lines.iter().filter(|l| is_change_line(l)).count();
    let changes = if change_lines > 0 {
        vec![Change::opaque("unknown").with_importance(Importance::Medium)]
    } else {
        Vec::new()
    };
    ResourceDiff {
        identity,
        change_type: ChangeType::Modified,
        before_hash: None,
        after_hash: None,
        changes,
        summary: Some(general_summary(change_lines.max(1))),
    }
}

/// Convert a plain line-oriented diff into a structured diff
///
/// Every resource is reported as `modified`; the line format carries no
/// reliable add/remove signal.
pub fn parse_plain_diff(plain: &str, v1: Option<&str>, v2: Option<&str>) -> Option<StructuredDiff> {
    if plain.trim().is_empty() {
        return None;
    }

    let mut resources = Vec::new();
    let mut current: Option<(ResourceIdentity, Vec<&str>)> = None;

    for line in plain.split('\n') {
        if let Some(identity) = parse_boundary(line) {
            if let Some((previous, lines)) = current.take() {
                resources.push(finalize_block(previous, &lines));
            }
            current = Some((identity, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((previous, lines)) = current.take() {
        resources.push(finalize_block(previous, &lines));
    }

    if resources.is_empty() {
        resources.push(ResourceDiff {
            identity: ResourceIdentity::new("v1", "Generic", "", "comparison-result"),
            change_type: ChangeType::Modified,
            before_hash: None,
            after_hash: None,
            changes: Vec::new(),
            summary: Some(general_summary(1)),
        });
    }

    tracing::debug!(resources = resources.len(), "plain diff converted");

    let count = resources.len();
    let now = Utc::now();
    Some(StructuredDiff {
        metadata: DiffMetadata {
            engine_version: CONVERTED_ENGINE_VERSION.to_string(),
            compare_id: format!("converted-{}", now.timestamp_millis()),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            inputs: InputSources {
                left: SourceMetadata::helm(v1.unwrap_or("v1")),
                right: SourceMetadata::helm(v2.unwrap_or("v2")),
            },
            normalization_rules: None,
        },
        resources,
        stats: Some(DiffStats {
            resources: ResourceStats {
                added: 0,
                removed: 0,
                modified: count,
            },
            changes: ChangeStats { total: count },
        }),
    })
}
