//! Correlation types for comparison tracking
//!
//! A `RequestId` names one comparison end to end: it keys the scratch
//! workspace, tags every log line and becomes the `compareId` of the
//! structured diff returned to the caller. Because it doubles as a directory
//! name, only ids made of `[A-Za-z0-9_-]` (at most 64 chars) can exist.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_ID_LEN: usize = 64;

/// Unique identifier for a single comparison request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a caller-supplied id, or `None` if it is not a safe path segment
    pub fn parse(s: &str) -> Option<Self> {
        is_path_segment(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TryFrom<String> for RequestId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_path_segment(&value) {
            Ok(Self(value))
        } else {
            Err(format!("invalid request id: {:?}", value))
        }
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one comparison
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self { request_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(RequestId::parse(id1.as_str()).is_some());
    }

    #[test]
    fn test_parse_rejects_path_components() {
        assert!(RequestId::parse("cmp-1_a").is_some());
        assert!(RequestId::parse("").is_none());
        assert!(RequestId::parse("..").is_none());
        assert!(RequestId::parse("a/b").is_none());
        assert!(RequestId::parse(&"x".repeat(65)).is_none());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::parse("cmp-1").unwrap();
        assert_eq!(format!("{}", id), "cmp-1");
    }

    #[test]
    fn test_deserialization_validates() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);

        assert!(serde_json::from_str::<RequestId>("\"../etc\"").is_err());
    }
}
