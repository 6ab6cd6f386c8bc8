//! Path-based semantic enrichment of field changes.
//!
//! Paths are dotted accessors such as
//! `spec.template.spec.containers.0.image`. All rules are substring tests
//! on that path and are evaluated in the listed order.

use crate::model::Importance;

fn contains_any(path: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| path.contains(n))
}

/// Fine-grained meaning of a path, `None` when no rule recognizes it
pub fn semantic_type(path: &str) -> Option<&'static str> {
    let kind = if path.contains(".image") {
        "container.image"
    } else if path.contains(".env") {
        "container.env"
    } else if path.contains(".replicas") {
        "workload.replicas"
    } else if contains_any(path, &[".resources.limits.cpu", ".resources.requests.cpu"]) {
        "resources.cpu"
    } else if contains_any(
        path,
        &[".resources.limits.memory", ".resources.requests.memory"],
    ) {
        "resources.memory"
    } else if path.contains(".resources") {
        "resources.general"
    } else if path.contains(".ports") {
        "service.port"
    } else if path.contains(".rules") && path.contains("ingress") {
        "ingress.rule"
    } else if path.contains("metadata.annotations") {
        "metadata.annotation"
    } else if path.contains("metadata.labels") {
        "metadata.label"
    } else if contains_any(path, &[".volumeMounts", ".volumes"]) {
        "storage.volume"
    } else if path.contains(".securityContext") {
        "security.context"
    } else if path.contains(".serviceAccountName") {
        "security.serviceAccount"
    } else {
        return None;
    };
    Some(kind)
}

/// Coarse category of a path; `"unknown"` when nothing matches
pub fn change_category(path: &str) -> &'static str {
    if contains_any(path, &[".resources.limits", ".resources.requests"]) {
        "resources"
    } else if contains_any(
        path,
        &[".replicas", ".image", ".containers", ".initContainers"],
    ) {
        "workload"
    } else if contains_any(path, &[".ports", ".service", ".ingress"]) {
        "networking"
    } else if contains_any(
        path,
        &[".securityContext", ".serviceAccountName", ".imagePullSecrets"],
    ) {
        "security"
    } else if contains_any(path, &[".env", ".configMap", ".secret"]) {
        "config"
    } else if contains_any(
        path,
        &["metadata.labels", "metadata.annotations", "metadata.name"],
    ) {
        "metadata"
    } else if contains_any(
        path,
        &[".volumes", ".volumeMounts", ".persistentVolumeClaim"],
    ) {
        "storage"
    } else {
        "unknown"
    }
}

pub fn importance(path: &str) -> Importance {
    if contains_any(path, &[".image", ".replicas", ".securityContext"]) {
        Importance::High
    } else if contains_any(
        path,
        &[".resources.limits", ".resources.requests", ".env", ".ports"],
    ) {
        Importance::Medium
    } else if contains_any(path, &["metadata.labels", "metadata.annotations"]) {
        Importance::Low
    } else {
        Importance::Medium
    }
}

/// Impact flags; a path may collect several
pub fn flags(path: &str) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if path.contains(".image") {
        flags.extend(["runtime-impact", "rollout-trigger"]);
    }
    if path.contains(".replicas") {
        flags.extend(["scaling-change", "runtime-impact"]);
    }
    if contains_any(path, &[".resources.limits", ".resources.requests"]) {
        flags.push("runtime-impact");
    }
    if path.contains(".securityContext") {
        flags.extend(["security-impact", "breaking-change"]);
    }
    if path.contains(".ports") {
        flags.push("networking-change");
    }
    flags
}
