//! Risk classification.
//!
//! [`assess_risk`] maps the resources of a structured diff to an
//! [`ImpactSummary`]. It is a pure function: no I/O, deterministic, and
//! total. A change no rule recognizes simply yields no signal.
//!
//! Each resource is checked once against [`RESOURCE_RULES`] (added or
//! removed critical kinds) and each of its changes against [`FIELD_RULES`]
//! (first match wins). The verdict is a strict ladder: any high signal makes
//! the comparison `high-risk` regardless of what else is present.

pub mod rules;

pub use rules::{
    FieldRule, KindClass, KindScope, Outcome, PathPattern, ResourceRule, AVAILABILITY_CRITICAL,
    FIELD_RULES, RESOURCE_RULES, SECURITY_SENSITIVE,
};

use crate::model::{
    Change, ImpactSummary, Importance, ResourceDiff, RiskCategory, RiskLevel, RiskSignal, Verdict,
};
use serde_json::Value;

/// Classify a list of resource differences
pub fn assess_risk(resources: &[ResourceDiff]) -> ImpactSummary {
    let mut availability_impact = Vec::new();
    let mut security_impact = Vec::new();
    let mut other_changes = Vec::new();

    for resource in resources {
        for signal in resource_signals(resource) {
            match signal.category {
                RiskCategory::Availability => availability_impact.push(signal),
                RiskCategory::Security => security_impact.push(signal),
                RiskCategory::Other => other_changes.push(signal),
            }
        }
    }

    let total_changed_resources = resources
        .iter()
        .filter(|r| r.change_type.is_change())
        .count();

    let mut summary = ImpactSummary {
        verdict: Verdict::NoChanges,
        availability_impact,
        security_impact,
        other_changes,
        total_high_risk: 0,
        total_medium_risk: 0,
        total_low_risk: 0,
        total_changed_resources,
    };

    let count = |level: RiskLevel| summary.signals().filter(|s| s.level == level).count();
    let (high, medium, low) = (
        count(RiskLevel::High),
        count(RiskLevel::Medium),
        count(RiskLevel::Low),
    );
    summary.total_high_risk = high;
    summary.total_medium_risk = medium;
    summary.total_low_risk = low;
    summary.verdict = verdict(total_changed_resources, high, medium);
    summary
}

fn verdict(changed: usize, high: usize, medium: usize) -> Verdict {
    if changed == 0 {
        Verdict::NoChanges
    } else if high > 0 {
        Verdict::HighRisk
    } else if medium > 0 {
        Verdict::MediumRisk
    } else {
        Verdict::LowRisk
    }
}

/// All signals for one resource: the resource-level one first, then one
/// per change in change order
pub fn resource_signals(resource: &ResourceDiff) -> Vec<RiskSignal> {
    let kind = resource.identity.kind.as_str();
    let label = resource.identity.label();
    let mut signals = Vec::new();

    if let Some(rule) = RESOURCE_RULES
        .iter()
        .find(|r| r.change_type == resource.change_type && r.class.contains(kind))
    {
        signals.push(RiskSignal {
            resource: label.clone(),
            kind: kind.to_string(),
            level: rule.level,
            category: rule.category,
            title: rule.title.replace("{kind}", kind),
            description: rule.description.replace("{kind}", kind),
            field: None,
            old_value: None,
            new_value: None,
        });
    }

    signals.extend(
        resource
            .changes
            .iter()
            .filter_map(|change| classify_change(&label, kind, change)),
    );
    signals
}

/// First field rule that produces a signal for this change
pub fn classify_change(resource: &str, kind: &str, change: &Change) -> Option<RiskSignal> {
    FIELD_RULES
        .iter()
        .filter(|rule| rule.applies_to(kind, &change.path))
        .find_map(|rule| evaluate(rule, resource, kind, change))
}

fn evaluate(rule: &FieldRule, resource: &str, kind: &str, change: &Change) -> Option<RiskSignal> {
    let signal = |level, category, title: String, description: String| RiskSignal {
        resource: resource.to_string(),
        kind: kind.to_string(),
        level,
        category,
        title,
        description,
        field: Some(change.path.clone()),
        old_value: change.before().cloned(),
        new_value: change.after().cloned(),
    };

    match rule.outcome {
        Outcome::Fixed {
            level,
            category,
            title,
            description,
        } => Some(signal(
            level,
            category,
            title.to_string(),
            description.to_string(),
        )),
        Outcome::ReplicaDelta => {
            let (old, new) = (change.before()?, change.after()?);
            let (old_n, new_n) = (old.as_f64()?, new.as_f64()?);
            if new_n < old_n {
                Some(signal(
                    RiskLevel::High,
                    RiskCategory::Availability,
                    "Replica count decreased".to_string(),
                    format!(
                        "Replica count changed from {} to {}. Reduced redundancy may impact availability during pod restarts or node failures.",
                        number(old),
                        number(new)
                    ),
                ))
            } else if new_n > old_n {
                Some(signal(
                    RiskLevel::Medium,
                    RiskCategory::Availability,
                    "Replica count increased".to_string(),
                    format!(
                        "Replica count changed from {} to {}. Increased redundancy improves availability but uses more resources.",
                        number(old),
                        number(new)
                    ),
                ))
            } else {
                None
            }
        }
        Outcome::UpstreamImportance => {
            let level = match change.importance? {
                Importance::Critical => RiskLevel::High,
                Importance::High => RiskLevel::Medium,
                Importance::Medium | Importance::Low => return None,
            };
            let category = match change.change_category.as_deref() {
                Some("security") => RiskCategory::Security,
                Some("availability") => RiskCategory::Availability,
                _ => RiskCategory::Other,
            };
            let description = change
                .semantic_type
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Significant change detected. Review carefully.".to_string());
            Some(signal(
                level,
                category,
                format!("{} changed", change.path),
                description,
            ))
        }
    }
}

fn number(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
