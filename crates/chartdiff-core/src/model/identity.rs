use serde::{Deserialize, Deserializer, Serialize};

/// Identity of one deployable unit across both compared versions.
///
/// `namespace` is the empty string for cluster-scoped kinds. A `null`
/// namespace from an external producer is normalized to `""` on ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentity {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ResourceIdentity {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
            uid: None,
        }
    }

    /// Reviewer-facing label, `Kind/name`
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }

    /// Ordering key used for deterministic output: apiVersion, kind, namespace, name
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (&self.api_version, &self.kind, &self.namespace, &self.name)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
