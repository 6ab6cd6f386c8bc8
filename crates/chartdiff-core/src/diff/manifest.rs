//! Splitting and decoding of rendered manifest streams.

use crate::model::ResourceIdentity;
use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

/// One decoded manifest document, split into the comparison scopes
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub identity: ResourceIdentity,
    /// String-valued labels only
    pub labels: Map<String, Value>,
    /// String-valued annotations only
    pub annotations: Map<String, Value>,
    /// Metadata without name, namespace, labels and annotations
    pub metadata: Map<String, Value>,
    pub spec: Map<String, Value>,
    pub data: Map<String, Value>,
    /// Top-level fields outside apiVersion, kind, metadata, spec and data
    pub other: Map<String, Value>,
    /// sha256 hex of the canonical JSON form of the whole document
    pub hash: String,
}

/// Result of parsing one stream
#[derive(Debug, Default)]
pub struct ParsedStream {
    pub documents: BTreeMap<(String, String, String, String), ManifestDocument>,
    /// Non-blank documents that were not valid YAML mappings
    pub invalid: usize,
    /// Valid documents without apiVersion or kind
    pub without_identity: usize,
}

impl ParsedStream {
    /// True when the stream had content but nothing in it could be decoded
    pub fn is_unparseable(&self) -> bool {
        self.documents.is_empty() && self.invalid > 0
    }
}

/// Parse a multi-document stream
///
/// Documents are split on `\n---`. A later document with the same identity
/// replaces an earlier one.
pub fn parse_stream(text: &str) -> ParsedStream {
    let mut parsed = ParsedStream::default();
    if text.trim().is_empty() {
        return parsed;
    }

    for chunk in text.split("\n---") {
        let chunk = chunk.trim();
        // A leading separator leaves "---" on the first chunk
        let chunk = chunk.strip_prefix("---").unwrap_or(chunk).trim();
        if chunk.is_empty() {
            continue;
        }

        let raw: Value = match serde_yaml::from_str(chunk) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid manifest document");
                parsed.invalid += 1;
                continue;
            }
        };
        let root = match raw {
            Value::Object(root) => root,
            // Comment-only documents decode to null
            Value::Null => continue,
            _ => {
                parsed.invalid += 1;
                continue;
            }
        };
        if root.is_empty() {
            continue;
        }

        match decode_document(root) {
            Some(doc) => {
                let key = {
                    let (a, k, n, m) = doc.identity.sort_key();
                    (a.to_string(), k.to_string(), n.to_string(), m.to_string())
                };
                parsed.documents.insert(key, doc);
            }
            None => {
                tracing::debug!("skipping manifest document without apiVersion or kind");
                parsed.without_identity += 1;
            }
        }
    }

    parsed
}

fn decode_document(root: Map<String, Value>) -> Option<ManifestDocument> {
    let api_version = non_empty_str(root.get("apiVersion"))?;
    let kind = non_empty_str(root.get("kind"))?;
    let hash = content_hash(&Value::Object(root.clone()));

    let mut doc = ManifestDocument {
        identity: ResourceIdentity::new(api_version, kind, "", ""),
        labels: Map::new(),
        annotations: Map::new(),
        metadata: Map::new(),
        spec: Map::new(),
        data: Map::new(),
        other: Map::new(),
        hash,
    };

    for (key, value) in root {
        match key.as_str() {
            "apiVersion" | "kind" => {}
            "metadata" => {
                if let Value::Object(metadata) = value {
                    split_metadata(metadata, &mut doc);
                }
            }
            "spec" => match value {
                Value::Object(spec) => doc.spec = spec,
                other => {
                    doc.other.insert(key, other);
                }
            },
            "data" => match value {
                Value::Object(data) => doc.data = data,
                other => {
                    doc.other.insert(key, other);
                }
            },
            _ => {
                doc.other.insert(key, value);
            }
        }
    }

    Some(doc)
}

fn split_metadata(metadata: Map<String, Value>, doc: &mut ManifestDocument) {
    for (key, value) in metadata {
        match key.as_str() {
            "name" => {
                if let Value::String(name) = value {
                    doc.identity.name = name;
                }
            }
            "namespace" => {
                if let Value::String(namespace) = value {
                    doc.identity.namespace = namespace;
                }
            }
            "labels" => doc.labels = string_entries(value),
            "annotations" => doc.annotations = string_entries(value),
            _ => {
                doc.metadata.insert(key, value);
            }
        }
    }
}

fn string_entries(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().filter(|(_, v)| v.is_string()).collect(),
        _ => Map::new(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// sha256 hex of the compact JSON serialization (keys in sorted order)
pub fn content_hash(value: &Value) -> String {
    let canonical = serde_json::to_string(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
