use chartdiff_core::errors::{ChartDiffError, Diagnostics, ExError, ExErrorKind};

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable code and outbound name
    let kinds = vec![
        (ExErrorKind::RepositoryClone, "ERR_REPOSITORY_CLONE", "RepositoryCloneError"),
        (ExErrorKind::VersionNotFound, "ERR_VERSION_NOT_FOUND", "VersionNotFoundError"),
        (ExErrorKind::ChartPathNotFound, "ERR_CHART_PATH_NOT_FOUND", "ChartPathNotFoundError"),
        (ExErrorKind::DependencyResolution, "ERR_DEPENDENCY_RESOLUTION", "DependencyResolutionError"),
        (ExErrorKind::TemplateRender, "ERR_TEMPLATE_RENDER", "TemplateRenderError"),
        (ExErrorKind::DiffComputation, "ERR_DIFF_COMPUTATION", "DiffComputationError"),
    ];

    for (kind, code, name) in kinds {
        assert_eq!(kind.code(), code);
        assert_eq!(kind.name(), name);
    }
}

#[test]
fn test_timeout_conversion() {
    let err = ChartDiffError::Timeout {
        program: "git".to_string(),
        timeout_secs: 15,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Timeout);
    assert_eq!(ex_err.code(), "ERR_TIMEOUT");
    assert_eq!(ex_err.op(), Some("git"));
    assert!(ex_err.message().contains("timed out after 15s"));
}

#[test]
fn test_output_limit_conversion() {
    let err = ChartDiffError::OutputLimit {
        program: "helm".to_string(),
        limit_bytes: 10 * 1024 * 1024,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::OutputLimitExceeded);
    assert!(ex_err.message().contains("10485760 bytes"));
}

#[test]
fn test_unparseable_manifest_is_recoverable() {
    let err = ChartDiffError::UnparseableManifest {
        side: "left".to_string(),
        reason: "1 document(s) could not be decoded".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::DiffComputation);
    assert!(ex_err.kind().is_recoverable());
}

#[test]
fn test_report_carries_ref_samples() {
    let err = ExError::new(ExErrorKind::VersionNotFound)
        .with_op("checkout")
        .with_version("v9.9.9")
        .with_message("Version/tag/branch \"v9.9.9\" not found in the repository.")
        .with_diagnostics(Diagnostics {
            available_tags: vec!["v1.0.0".into()],
            available_branches: vec!["origin/main".into()],
            ..Diagnostics::default()
        });

    let report = serde_json::to_value(err.to_report()).unwrap();

    assert_eq!(report["kind"], "VersionNotFoundError");
    assert_eq!(report["code"], "ERR_VERSION_NOT_FOUND");
    assert_eq!(report["diagnostics"]["availableTags"][0], "v1.0.0");
    assert_eq!(report["diagnostics"]["availableBranches"][0], "origin/main");
    assert!(report["diagnostics"].get("chartCandidates").is_none());
}

#[test]
fn test_report_omits_empty_diagnostics() {
    let err = ExError::new(ExErrorKind::TemplateRender)
        .with_message("template failed")
        .with_diagnostics(Diagnostics::default());

    let report = err.to_report();

    assert!(report.diagnostics.is_none());
}

#[test]
fn test_display_lists_chart_candidates() {
    let err = ExError::new(ExErrorKind::ChartPathNotFound)
        .with_message("Chart path not found: charts/web at version v1")
        .with_diagnostics(Diagnostics {
            chart_candidates: vec!["charts/api".into(), "charts/worker".into()],
            ..Diagnostics::default()
        });

    let text = err.to_string();

    assert!(text.contains("Charts found in repository:"));
    assert!(text.contains("  - charts/api"));
    assert!(!text.contains("Available tags"));
}

#[test]
fn test_source_chain() {
    let inner = ExError::new(ExErrorKind::Timeout).with_message("helm timed out");
    let outer = ExError::new(ExErrorKind::DependencyResolution)
        .with_message("dependency build failed")
        .with_source(inner);

    let source = std::error::Error::source(&outer).unwrap();
    assert!(source.to_string().contains("helm timed out"));
    assert_eq!(outer.source_error().unwrap().kind(), ExErrorKind::Timeout);
}
