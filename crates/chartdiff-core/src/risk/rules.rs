//! Declarative risk rule tables.
//!
//! Both tables are plain data so they can be inspected and tested without
//! running the evaluator. Field rules are evaluated in slice order and the
//! first rule that produces a signal wins.

use crate::model::{ChangeType, RiskCategory, RiskLevel};

/// Kinds whose presence or absence directly affects uptime
pub const AVAILABILITY_CRITICAL: &[&str] = &["Deployment", "StatefulSet", "DaemonSet", "Service"];

/// Kinds that control access or network security
pub const SECURITY_SENSITIVE: &[&str] = &[
    "NetworkPolicy",
    "ServiceAccount",
    "Role",
    "RoleBinding",
    "ClusterRole",
    "ClusterRoleBinding",
    "Secret",
];

const WORKLOADS: &[&str] = &["Deployment", "StatefulSet"];
const RBAC: &[&str] = &["Role", "ClusterRole", "RoleBinding", "ClusterRoleBinding"];

/// Which resource kinds a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindScope {
    Any,
    OneOf(&'static [&'static str]),
}

impl KindScope {
    pub fn matches(&self, kind: &str) -> bool {
        match self {
            KindScope::Any => true,
            KindScope::OneOf(kinds) => kinds.contains(&kind),
        }
    }
}

/// Substring predicate over a change path
///
/// Matches when the path contains every `all_of` needle, at least one
/// `any_of` needle (if any are listed) and none of the `none_of` needles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPattern {
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
}

impl PathPattern {
    pub const ANY: PathPattern = PathPattern {
        all_of: &[],
        any_of: &[],
        none_of: &[],
    };

    pub fn matches(&self, path: &str) -> bool {
        self.all_of.iter().all(|n| path.contains(n))
            && (self.any_of.is_empty() || self.any_of.iter().any(|n| path.contains(n)))
            && !self.none_of.iter().any(|n| path.contains(n))
    }
}

/// What a matching field rule emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fixed {
        level: RiskLevel,
        category: RiskCategory,
        title: &'static str,
        description: &'static str,
    },
    /// Decrease is high, increase is medium. Declines when the values are
    /// equal or not both numeric.
    ReplicaDelta,
    /// Promotes upstream `critical` to high and `high` to medium. Declines
    /// for any other importance.
    UpstreamImportance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kinds: KindScope,
    pub path: PathPattern,
    pub outcome: Outcome,
}

impl FieldRule {
    pub fn applies_to(&self, kind: &str, path: &str) -> bool {
        self.kinds.matches(kind) && self.path.matches(path)
    }
}

/// Ordered field rules; the last entry is the upstream-importance fallback
pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "replica-count",
        kinds: KindScope::OneOf(WORKLOADS),
        path: PathPattern {
            all_of: &["replicas"],
            any_of: &[],
            none_of: &[],
        },
        outcome: Outcome::ReplicaDelta,
    },
    FieldRule {
        name: "update-strategy",
        kinds: KindScope::OneOf(WORKLOADS),
        path: PathPattern {
            all_of: &["strategy"],
            any_of: &[],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::Medium,
            category: RiskCategory::Availability,
            title: "Update strategy changed",
            description: "Update strategy modification may affect rollout behavior and availability during updates.",
        },
    },
    FieldRule {
        name: "service-port",
        kinds: KindScope::OneOf(&["Service"]),
        path: PathPattern {
            all_of: &[],
            any_of: &["port", "targetPort"],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::High,
            category: RiskCategory::Availability,
            title: "Service port changed",
            description: "Port changes may break connectivity. Ensure all clients are updated to use the new port.",
        },
    },
    FieldRule {
        name: "service-type",
        kinds: KindScope::OneOf(&["Service"]),
        path: PathPattern {
            all_of: &["type"],
            any_of: &[],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::High,
            category: RiskCategory::Availability,
            title: "Service type changed",
            description: "Service type change affects how the service is exposed. Verify external access requirements.",
        },
    },
    FieldRule {
        name: "network-policy",
        kinds: KindScope::OneOf(&["NetworkPolicy"]),
        path: PathPattern::ANY,
        outcome: Outcome::Fixed {
            level: RiskLevel::High,
            category: RiskCategory::Security,
            title: "Network policy modified",
            description: "Changes to network policies affect pod communication rules. Review security implications carefully.",
        },
    },
    FieldRule {
        name: "rbac",
        kinds: KindScope::OneOf(RBAC),
        path: PathPattern {
            all_of: &[],
            any_of: &["rules", "subjects"],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::High,
            category: RiskCategory::Security,
            title: "RBAC permissions changed",
            description: "Changes to roles or bindings affect access control. Verify permissions align with security requirements.",
        },
    },
    FieldRule {
        name: "service-account-token",
        kinds: KindScope::OneOf(&["ServiceAccount"]),
        path: PathPattern {
            all_of: &["automountServiceAccountToken"],
            any_of: &[],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::Medium,
            category: RiskCategory::Security,
            title: "Service account token mount changed",
            description: "Changes to token mounting affect pod authentication. Review security implications.",
        },
    },
    FieldRule {
        name: "container-image",
        kinds: KindScope::Any,
        path: PathPattern {
            all_of: &["image"],
            any_of: &[],
            none_of: &["imagePullPolicy"],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::Medium,
            category: RiskCategory::Other,
            title: "Container image changed",
            description: "Container image updated. Ensure the new image is tested and compatible.",
        },
    },
    FieldRule {
        name: "resource-requirements",
        kinds: KindScope::Any,
        path: PathPattern {
            all_of: &["resources"],
            any_of: &["requests", "limits"],
            none_of: &[],
        },
        outcome: Outcome::Fixed {
            level: RiskLevel::Medium,
            category: RiskCategory::Availability,
            title: "Resource requirements changed",
            description: "Changes to resource requests or limits may affect scheduling and performance.",
        },
    },
    FieldRule {
        name: "upstream-importance",
        kinds: KindScope::Any,
        path: PathPattern::ANY,
        outcome: Outcome::UpstreamImportance,
    },
];

/// Which kind table a resource rule consults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    AvailabilityCritical,
    SecuritySensitive,
}

impl KindClass {
    pub fn contains(&self, kind: &str) -> bool {
        match self {
            KindClass::AvailabilityCritical => AVAILABILITY_CRITICAL.contains(&kind),
            KindClass::SecuritySensitive => SECURITY_SENSITIVE.contains(&kind),
        }
    }
}

/// Rule evaluated once per added or removed resource
///
/// `{kind}` in the title and description is replaced by the resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRule {
    pub change_type: ChangeType,
    pub class: KindClass,
    pub level: RiskLevel,
    pub category: RiskCategory,
    pub title: &'static str,
    pub description: &'static str,
}

/// First matching entry per resource applies
pub static RESOURCE_RULES: &[ResourceRule] = &[
    ResourceRule {
        change_type: ChangeType::Added,
        class: KindClass::AvailabilityCritical,
        level: RiskLevel::Medium,
        category: RiskCategory::Availability,
        title: "{kind} added",
        description: "New {kind} resource created. Ensure this aligns with your deployment strategy.",
    },
    ResourceRule {
        change_type: ChangeType::Added,
        class: KindClass::SecuritySensitive,
        level: RiskLevel::Medium,
        category: RiskCategory::Security,
        title: "{kind} added",
        description: "New {kind} resource created. Review security implications.",
    },
    ResourceRule {
        change_type: ChangeType::Removed,
        class: KindClass::AvailabilityCritical,
        level: RiskLevel::High,
        category: RiskCategory::Availability,
        title: "{kind} removed",
        description: "This {kind} will be deleted. Ensure no workloads depend on it.",
    },
    ResourceRule {
        change_type: ChangeType::Removed,
        class: KindClass::SecuritySensitive,
        level: RiskLevel::Medium,
        category: RiskCategory::Security,
        title: "{kind} removed",
        description: "{kind} will be removed. Verify access control implications.",
    },
];
