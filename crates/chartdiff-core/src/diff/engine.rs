//! Structured manifest comparison.
//!
//! The core entry point is [`ManifestDiffer::compare`]; [`SemanticDiffer`]
//! is the default implementation.

#![allow(clippy::result_large_err)]

use crate::diff::manifest::{parse_stream, ManifestDocument, ParsedStream};
use crate::diff::semantic;
use crate::errors::{ChartDiffError, Result};
use crate::model::{
    Change, DiffMetadata, DiffStats, InputSources, ResourceDiff, StructuredDiff,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Version stamped into the metadata of every diff this engine produces
pub const ENGINE_VERSION: &str = "1.0.0";

/// Compares two rendered manifest streams by resource identity
pub trait ManifestDiffer: Send + Sync {
    /// # Errors
    ///
    /// `DiffComputation` when either stream cannot be interpreted. Callers
    /// treat this as recoverable and fall back to a plain diff.
    fn compare(&self, left: &str, right: &str, inputs: &InputSources) -> Result<StructuredDiff>;
}

/// Comparison switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub ignore_labels: bool,
    pub ignore_annotations: bool,
    /// Emit `unchanged` entries instead of omitting them
    pub include_unchanged: bool,
}

/// Identity-keyed differ with path-based semantic enrichment
#[derive(Debug, Clone, Default)]
pub struct SemanticDiffer {
    options: DiffOptions,
}

impl SemanticDiffer {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DiffOptions {
        self.options
    }

    fn normalization_rules(&self) -> Vec<String> {
        let mut rules = Vec::new();
        if self.options.ignore_labels {
            rules.push("ignoreLabels".to_string());
        }
        if self.options.ignore_annotations {
            rules.push("ignoreAnnotations".to_string());
        }
        rules.push("normalizeDefaults".to_string());
        rules
    }

    fn compare_documents(&self, before: &ManifestDocument, after: &ManifestDocument) -> Vec<Change> {
        let mut changes = Vec::new();
        if !self.options.ignore_labels {
            compare_maps("metadata.labels", &before.labels, &after.labels, &mut changes);
        }
        if !self.options.ignore_annotations {
            compare_maps(
                "metadata.annotations",
                &before.annotations,
                &after.annotations,
                &mut changes,
            );
        }
        compare_maps("metadata", &before.metadata, &after.metadata, &mut changes);
        compare_maps("spec", &before.spec, &after.spec, &mut changes);
        compare_maps("data", &before.data, &after.data, &mut changes);
        compare_maps("", &before.other, &after.other, &mut changes);
        changes
    }
}

impl ManifestDiffer for SemanticDiffer {
    fn compare(&self, left: &str, right: &str, inputs: &InputSources) -> Result<StructuredDiff> {
        let before = parse_side("left", left)?;
        let after = parse_side("right", right)?;

        let keys: BTreeSet<_> = before
            .documents
            .keys()
            .chain(after.documents.keys())
            .collect();

        let mut resources = Vec::new();
        for key in keys {
            let resource = match (before.documents.get(key), after.documents.get(key)) {
                (Some(b), None) => ResourceDiff::removed(b.identity.clone(), b.hash.clone()),
                (None, Some(a)) => ResourceDiff::added(a.identity.clone(), a.hash.clone()),
                (Some(b), Some(a)) => {
                    let changes = if b.hash == a.hash {
                        Vec::new()
                    } else {
                        self.compare_documents(b, a)
                    };
                    if changes.is_empty() {
                        // Equal content, or differences confined to ignored scopes
                        if !self.options.include_unchanged {
                            continue;
                        }
                        ResourceDiff::unchanged(b.identity.clone(), b.hash.clone())
                    } else {
                        ResourceDiff::modified(
                            b.identity.clone(),
                            b.hash.clone(),
                            a.hash.clone(),
                            changes,
                        )
                    }
                }
                (None, None) => continue,
            };
            resources.push(resource);
        }

        tracing::debug!(
            resources = resources.len(),
            left_documents = before.documents.len(),
            right_documents = after.documents.len(),
            "structured diff computed"
        );

        let stats = DiffStats::tally(&resources);
        Ok(StructuredDiff {
            metadata: DiffMetadata {
                engine_version: ENGINE_VERSION.to_string(),
                compare_id: uuid::Uuid::new_v4().to_string(),
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                inputs: inputs.clone(),
                normalization_rules: Some(self.normalization_rules()),
            },
            resources,
            stats: Some(stats),
        })
    }
}

fn parse_side(side: &str, text: &str) -> Result<ParsedStream> {
    let parsed = parse_stream(text);
    if parsed.is_unparseable() {
        return Err(ChartDiffError::UnparseableManifest {
            side: side.to_string(),
            reason: format!("{} document(s) could not be decoded", parsed.invalid),
        }
        .into());
    }
    Ok(parsed)
}

/// Recursive comparison over maps; any other differing value is one replace
fn compare_maps(
    base: &str,
    before: &Map<String, Value>,
    after: &Map<String, Value>,
    out: &mut Vec<Change>,
) {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    for key in keys {
        let path = if base.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", base, key)
        };
        match (before.get(key), after.get(key)) {
            (Some(b), None) => out.push(enrich(Change::remove(path, b.clone()))),
            (None, Some(a)) => out.push(enrich(Change::add(path, a.clone()))),
            (Some(b), Some(a)) if b != a => match (b, a) {
                (Value::Object(bm), Value::Object(am)) => compare_maps(&path, bm, am, out),
                _ => out.push(enrich(Change::replace(path, b.clone(), a.clone()))),
            },
            _ => {}
        }
    }
}

fn enrich(change: Change) -> Change {
    let path = change.path.clone();
    let mut change = change
        .with_category(semantic::change_category(&path))
        .with_importance(semantic::importance(&path))
        .with_flags(semantic::flags(&path));
    if let Some(semantic_type) = semantic::semantic_type(&path) {
        change = change.with_semantic_type(semantic_type);
    }
    change
}
