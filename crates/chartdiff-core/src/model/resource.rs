use crate::model::change::{Change, Importance};
use crate::model::identity::ResourceIdentity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How one resource differs between the two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl ChangeType {
    /// Added, removed and modified count as changed; unchanged does not
    pub fn is_change(&self) -> bool {
        !matches!(self, ChangeType::Unchanged)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
            ChangeType::Unchanged => "unchanged",
        }
    }
}

/// Derived per-resource summary. Never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub total_changes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_importance: Option<BTreeMap<Importance, usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl ResourceSummary {
    /// Summarize a list of changes: counts per importance and sorted unique categories
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut by_importance = BTreeMap::new();
        let mut categories = BTreeSet::new();
        for change in changes {
            if let Some(importance) = change.importance {
                *by_importance.entry(importance).or_insert(0) += 1;
            }
            if let Some(category) = &change.change_category {
                categories.insert(category.clone());
            }
        }
        Self {
            total_changes: changes.len(),
            by_importance: Some(by_importance),
            categories: Some(categories.into_iter().collect()),
        }
    }
}

/// Difference record for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDiff {
    pub identity: ResourceIdentity,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResourceSummary>,
}

impl ResourceDiff {
    /// Present only in the right-hand version
    pub fn added(identity: ResourceIdentity, after_hash: String) -> Self {
        Self {
            identity,
            change_type: ChangeType::Added,
            before_hash: None,
            after_hash: Some(after_hash),
            changes: Vec::new(),
            summary: None,
        }
    }

    /// Present only in the left-hand version
    pub fn removed(identity: ResourceIdentity, before_hash: String) -> Self {
        Self {
            identity,
            change_type: ChangeType::Removed,
            before_hash: Some(before_hash),
            after_hash: None,
            changes: Vec::new(),
            summary: None,
        }
    }

    /// Present in both versions with differing content
    pub fn modified(
        identity: ResourceIdentity,
        before_hash: String,
        after_hash: String,
        changes: Vec<Change>,
    ) -> Self {
        let summary = ResourceSummary::from_changes(&changes);
        Self {
            identity,
            change_type: ChangeType::Modified,
            before_hash: Some(before_hash),
            after_hash: Some(after_hash),
            changes,
            summary: Some(summary),
        }
    }

    pub fn unchanged(identity: ResourceIdentity, hash: String) -> Self {
        Self {
            identity,
            change_type: ChangeType::Unchanged,
            before_hash: Some(hash.clone()),
            after_hash: Some(hash),
            changes: Vec::new(),
            summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_added_has_no_before_hash() {
        let diff = ResourceDiff::added(
            ResourceIdentity::new("v1", "ConfigMap", "", "cfg"),
            "h2".to_string(),
        );
        let value = serde_json::to_value(&diff).unwrap();

        assert_eq!(value["changeType"], "added");
        assert!(value.get("beforeHash").is_none());
        assert_eq!(value["afterHash"], "h2");
    }

    #[test]
    fn test_summary_groups_importance_and_sorts_categories() {
        let changes = vec![
            Change::replace("spec.replicas", json!(1), json!(2))
                .with_importance(Importance::High)
                .with_category("workload"),
            Change::add("metadata.labels.tier", json!("web"))
                .with_importance(Importance::Low)
                .with_category("metadata"),
            Change::replace("spec.template.spec.containers", json!([]), json!([1]))
                .with_importance(Importance::High)
                .with_category("workload"),
        ];

        let summary = ResourceSummary::from_changes(&changes);

        assert_eq!(summary.total_changes, 3);
        let by_importance = summary.by_importance.unwrap();
        assert_eq!(by_importance.get(&Importance::High), Some(&2));
        assert_eq!(by_importance.get(&Importance::Low), Some(&1));
        assert_eq!(
            summary.categories.unwrap(),
            vec!["metadata".to_string(), "workload".to_string()]
        );
    }
}
