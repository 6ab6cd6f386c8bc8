use chartdiff_core::model::{Change, ResourceDiff, ResourceIdentity};

/// Render a minimal Deployment manifest
#[allow(dead_code)]
pub fn deployment(name: &str, replicas: u32, image: &str) -> String {
    format!(
        "apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}
  namespace: prod
  labels:
    app: {name}
spec:
  replicas: {replicas}
  strategy:
    type: RollingUpdate
  template:
    metadata:
      labels:
        app: {name}
    spec:
      containers:
        - name: {name}
          image: {image}
"
    )
}

/// Render a minimal Service manifest
#[allow(dead_code)]
pub fn service(name: &str, port: u16) -> String {
    format!(
        "apiVersion: v1
kind: Service
metadata:
  name: {name}
  namespace: prod
spec:
  type: ClusterIP
  ports:
    - port: {port}
      targetPort: http
"
    )
}

/// Join manifests into one rendered stream, the way `helm template` does
#[allow(dead_code)]
pub fn stream(documents: &[String]) -> String {
    documents
        .iter()
        .map(|d| format!("---\n# Source: app/templates/x.yaml\n{d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(dead_code)]
pub fn identity(kind: &str, name: &str) -> ResourceIdentity {
    ResourceIdentity::new("v1", kind, "", name)
}

#[allow(dead_code)]
pub fn modified(kind: &str, name: &str, changes: Vec<Change>) -> ResourceDiff {
    ResourceDiff::modified(identity(kind, name), "before".into(), "after".into(), changes)
}

#[allow(dead_code)]
pub fn added(kind: &str, name: &str) -> ResourceDiff {
    ResourceDiff::added(identity(kind, name), "after".into())
}

#[allow(dead_code)]
pub fn removed(kind: &str, name: &str) -> ResourceDiff {
    ResourceDiff::removed(identity(kind, name), "before".into())
}
