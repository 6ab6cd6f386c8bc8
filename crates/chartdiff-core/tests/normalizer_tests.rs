#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chartdiff_core::diff::{ManifestDiffer, SemanticDiffer};
use chartdiff_core::model::{ChangeOp, ChangeType, Importance, InputSources, StructuredDiff};
use chartdiff_core::normalize::{normalize, parse_plain_diff, DiffSources};
use proptest::prelude::*;

const DYFF_OUTPUT: &str = "metadata.labels.helm.sh/chart  (v1/ServiceAccount/default/argocd-application-controller)
  ± value change
    - argo-cd-5.0.0
    + argo-cd-5.1.0

spec.replicas  (apps/v1/Deployment/argocd/argocd-server)
  ± value change
    - 2
    + 1

spec.template.spec.containers.argocd-server.image  (apps/v1/Deployment/argocd/argocd-server)
  ± value change
    - quay.io/argoproj/argocd:v2.4.0
    + quay.io/argoproj/argocd:v2.5.0
";

fn pinned_diff() -> StructuredDiff {
    SemanticDiffer::default()
        .compare(
            &common::deployment("web", 3, "nginx:1"),
            &common::deployment("web", 2, "nginx:1"),
            &InputSources::default(),
        )
        .unwrap()
}

// -----------------------------------------------------------------------------
// Scenario: priority order
// -----------------------------------------------------------------------------

#[test]
fn test_pinned_wins_over_primary_and_plain() {
    let mut pinned = pinned_diff();
    pinned.metadata.compare_id = "pinned".into();
    let mut primary = pinned_diff();
    primary.metadata.compare_id = "primary".into();

    let result = normalize(
        DiffSources {
            pinned: Some(pinned),
            primary: Some(primary),
            plain: Some(DYFF_OUTPUT),
        },
        None,
        None,
    )
    .unwrap();

    assert_eq!(result.metadata.compare_id, "pinned");
}

#[test]
fn test_primary_wins_over_plain() {
    let mut primary = pinned_diff();
    primary.metadata.compare_id = "primary".into();

    let result = normalize(
        DiffSources {
            pinned: None,
            primary: Some(primary),
            plain: Some(DYFF_OUTPUT),
        },
        None,
        None,
    )
    .unwrap();

    assert_eq!(result.metadata.compare_id, "primary");
}

#[test]
fn test_empty_primary_diff_is_kept() {
    // Identical renders: the differ's empty result is still a structured diff
    let manifest = common::deployment("web", 3, "nginx:1.25");
    let primary = SemanticDiffer::default()
        .compare(&manifest, &manifest, &InputSources::default())
        .unwrap();

    let result = normalize(DiffSources::from_primary(primary), None, None).unwrap();

    assert!(result.resources.is_empty());
    assert_eq!(result.metadata.engine_version, "1.0.0");
}

#[test]
fn test_nothing_present_is_none() {
    assert!(normalize(DiffSources::default(), Some("1.0"), Some("2.0")).is_none());
}

// -----------------------------------------------------------------------------
// Scenario: dyff-style plain text
// -----------------------------------------------------------------------------

#[test]
fn test_each_boundary_line_starts_a_resource() {
    let diff = parse_plain_diff(DYFF_OUTPUT, Some("5.0.0"), Some("5.1.0")).unwrap();

    // The two Deployment sections are separate blocks, as boundaries are per line
    assert_eq!(diff.resources.len(), 3);

    let sa = &diff.resources[0];
    assert_eq!(sa.identity.kind, "ServiceAccount");
    assert_eq!(sa.identity.namespace, "");
    assert_eq!(sa.identity.name, "argocd-application-controller");

    let deploy = &diff.resources[1];
    assert_eq!(deploy.identity.api_version, "apps/v1");
    assert_eq!(deploy.identity.namespace, "argocd");
    assert_eq!(deploy.change_type, ChangeType::Modified);
}

#[test]
fn test_block_with_change_lines_has_one_opaque_change() {
    let plain = "spec.replicas  (apps/v1/Deployment/prod/web)\n  - 3\n  + 2\n";

    let diff = parse_plain_diff(plain, None, None).unwrap();

    assert_eq!(diff.resources.len(), 1);
    let resource = &diff.resources[0];
    assert_eq!(resource.changes.len(), 1);

    let change = &resource.changes[0];
    assert_eq!(change.op(), ChangeOp::Replace);
    assert_eq!(change.path, "unknown");
    assert_eq!(change.importance, Some(Importance::Medium));
    assert!(change.before().is_none());
    assert!(change.after().is_none());

    let summary = resource.summary.as_ref().unwrap();
    assert_eq!(summary.total_changes, 2);
    assert_eq!(summary.categories.as_deref(), Some(&["general".to_string()][..]));
}

#[test]
fn test_no_boundaries_yields_generic_resource() {
    let diff = parse_plain_diff("- replicas: 3\n+ replicas: 2", Some("1.0"), None).unwrap();

    assert_eq!(diff.resources.len(), 1);
    let resource = &diff.resources[0];
    assert_eq!(resource.identity.kind, "Generic");
    assert_eq!(resource.identity.name, "comparison-result");
    assert_eq!(resource.change_type, ChangeType::Modified);
    assert!(resource.changes.is_empty());
    assert_eq!(resource.summary.as_ref().unwrap().total_changes, 1);

    assert_eq!(diff.metadata.inputs.left.version.as_deref(), Some("1.0"));
    assert_eq!(diff.metadata.inputs.right.version.as_deref(), Some("v2"));
}

#[test]
fn test_converted_metadata_and_stats() {
    let diff = parse_plain_diff(DYFF_OUTPUT, None, None).unwrap();

    assert_eq!(diff.metadata.engine_version, "1.0.0-converted");
    assert!(diff.metadata.compare_id.starts_with("converted-"));

    let stats = diff.stats.unwrap();
    assert_eq!(stats.resources.added, 0);
    assert_eq!(stats.resources.removed, 0);
    assert_eq!(stats.resources.modified, 3);
    assert_eq!(stats.changes.total, 3);
}

#[test]
fn test_lines_before_first_boundary_are_ignored() {
    let plain = "+ stray\n(v1/ConfigMap/default/cfg)\n  context";

    let diff = parse_plain_diff(plain, None, None).unwrap();

    assert_eq!(diff.resources.len(), 1);
    assert!(diff.resources[0].changes.is_empty());
}

// -----------------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_non_blank_input_always_yields_resources(text in "[ -~\\n]{0,200}") {
        let result = parse_plain_diff(&text, None, None);
        if text.trim().is_empty() {
            prop_assert!(result.is_none());
        } else {
            let diff = result.unwrap();
            prop_assert!(!diff.resources.is_empty());
            prop_assert_eq!(diff.stats.unwrap().resources.modified, diff.resources.len());
            prop_assert!(diff.resources.iter().all(|r| r.changes.len() <= 1));
        }
    }
}
