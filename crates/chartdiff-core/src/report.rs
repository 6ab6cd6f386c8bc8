//! Human-readable impact report.

use crate::model::{ImpactSummary, RiskLevel, RiskSignal, StructuredDiff, Verdict};

/// Render a Markdown report of a comparison
///
/// Informational only; the structured diff and impact summary remain the
/// authoritative outputs.
pub fn render_impact_report(diff: &StructuredDiff, impact: &ImpactSummary) -> String {
    let mut out = String::new();

    out.push_str("## Chart Impact Report\n\n");

    let left = diff.metadata.inputs.left.version.as_deref().unwrap_or("?");
    let right = diff.metadata.inputs.right.version.as_deref().unwrap_or("?");
    out.push_str(&format!(
        "**Comparison**: `{left}` → `{right}`  \n**Verdict**: {}\n\n",
        verdict_label(impact.verdict)
    ));

    out.push_str(&format!(
        "| Changed resources | High | Medium | Low |\n\
         |---|---|---|---|\n\
         | {} | {} | {} | {} |\n\n",
        impact.total_changed_resources,
        impact.total_high_risk,
        impact.total_medium_risk,
        impact.total_low_risk,
    ));

    if impact.verdict == Verdict::NoChanges {
        out.push_str("_No changes detected._\n");
        return out;
    }

    signal_section(&mut out, "Availability Impact", &impact.availability_impact);
    signal_section(&mut out, "Security Impact", &impact.security_impact);
    signal_section(&mut out, "Other Changes", &impact.other_changes);

    let changed: Vec<_> = diff
        .resources
        .iter()
        .filter(|r| r.change_type.is_change())
        .collect();
    if !changed.is_empty() {
        out.push_str("### Resources\n\n");
        out.push_str("| Resource | Namespace | Change | Fields |\n|---|---|---|---|\n");
        for resource in changed {
            let namespace = if resource.identity.namespace.is_empty() {
                "-"
            } else {
                resource.identity.namespace.as_str()
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                resource.identity.label(),
                namespace,
                resource.change_type.as_str(),
                resource.changes.len()
            ));
        }
        out.push('\n');
    }

    out
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::HighRisk => "High risk",
        Verdict::MediumRisk => "Medium risk",
        Verdict::LowRisk => "Low risk",
        Verdict::NoChanges => "No changes",
    }
}

fn signal_section(out: &mut String, heading: &str, signals: &[RiskSignal]) {
    if signals.is_empty() {
        return;
    }
    out.push_str(&format!("### {heading} ({})\n\n", signals.len()));
    for signal in signals {
        let level = match signal.level {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        };
        out.push_str(&format!(
            "- **[{level}] {}** `{}`: {}\n",
            signal.title, signal.resource, signal.description
        ));
        if let Some(field) = &signal.field {
            let old = signal
                .old_value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string());
            let new = signal
                .new_value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string());
            out.push_str(&format!("  - `{field}`: {old} → {new}\n"));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Change, DiffMetadata, InputSources, ResourceDiff, ResourceIdentity, SourceMetadata,
    };
    use crate::risk::assess_risk;
    use serde_json::json;

    fn diff_with(resources: Vec<ResourceDiff>) -> StructuredDiff {
        StructuredDiff {
            metadata: DiffMetadata {
                engine_version: "1.0.0".into(),
                compare_id: "cmp".into(),
                generated_at: "2024-01-01T00:00:00Z".into(),
                inputs: InputSources {
                    left: SourceMetadata::helm("1.0.0"),
                    right: SourceMetadata::helm("1.1.0"),
                },
                normalization_rules: None,
            },
            resources,
            stats: None,
        }
    }

    #[test]
    fn test_report_lists_signals_and_resources() {
        let diff = diff_with(vec![ResourceDiff::modified(
            ResourceIdentity::new("apps/v1", "Deployment", "prod", "web"),
            "a".into(),
            "b".into(),
            vec![Change::replace("spec.replicas", json!(4), json!(1))],
        )]);
        let impact = assess_risk(&diff.resources);

        let report = render_impact_report(&diff, &impact);

        assert!(report.contains("**Verdict**: High risk"));
        assert!(report.contains("### Availability Impact (1)"));
        assert!(report.contains("[HIGH] Replica count decreased"));
        assert!(report.contains("`spec.replicas`: 4 → 1"));
        assert!(report.contains("| Deployment/web | prod | modified | 1 |"));
        assert!(!report.contains("Security Impact"));
    }

    #[test]
    fn test_report_for_no_changes() {
        let diff = diff_with(Vec::new());
        let impact = assess_risk(&diff.resources);

        let report = render_impact_report(&diff, &impact);

        assert!(report.contains("_No changes detected._"));
        assert!(!report.contains("### Resources"));
    }
}
