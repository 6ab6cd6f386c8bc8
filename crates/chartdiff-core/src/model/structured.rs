use crate::model::resource::{ChangeType, ResourceDiff};
use serde::{Deserialize, Serialize};

/// Description of one compared input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_hash: Option<String>,
}

impl SourceMetadata {
    /// A rendered chart at the given version
    pub fn helm(version: impl Into<String>) -> Self {
        Self {
            source: "helm".to_string(),
            chart: None,
            version: Some(version.into()),
            values_hash: None,
        }
    }
}

impl Default for SourceMetadata {
    fn default() -> Self {
        Self {
            source: "helm".to_string(),
            chart: None,
            version: None,
            values_hash: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSources {
    pub left: SourceMetadata,
    pub right: SourceMetadata,
}

/// Traceability block of a structured diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMetadata {
    pub engine_version: String,
    /// Caller-opaque correlation token, stable for one comparison
    pub compare_id: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub inputs: InputSources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization_rules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub resources: ResourceStats,
    pub changes: ChangeStats,
}

impl DiffStats {
    /// Count resources per change type and field changes across all resources
    pub fn tally(resources: &[ResourceDiff]) -> Self {
        let mut stats = DiffStats::default();
        for resource in resources {
            match resource.change_type {
                ChangeType::Added => stats.resources.added += 1,
                ChangeType::Removed => stats.resources.removed += 1,
                ChangeType::Modified => stats.resources.modified += 1,
                ChangeType::Unchanged => {}
            }
            stats.changes.total += resource.changes.len();
        }
        stats
    }
}

/// Resource- and field-addressable difference between two rendered versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDiff {
    pub metadata: DiffMetadata,
    pub resources: Vec<ResourceDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<DiffStats>,
}

impl StructuredDiff {
    /// A diff with no resources, for two identical renders
    pub fn empty(engine_version: &str, compare_id: impl Into<String>, inputs: InputSources) -> Self {
        Self {
            metadata: DiffMetadata {
                engine_version: engine_version.to_string(),
                compare_id: compare_id.into(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                inputs,
                normalization_rules: None,
            },
            resources: Vec::new(),
            stats: Some(DiffStats::tally(&[])),
        }
    }

    /// Number of resources whose change type is added, removed or modified
    pub fn changed_resource_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|r| r.change_type.is_change())
            .count()
    }
}
