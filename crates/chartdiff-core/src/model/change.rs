//! Field-level change records.
//!
//! The operation and its before/after values form one tagged sum type
//! ([`Delta`]), so an `add` cannot carry a `before` and a `remove` cannot
//! carry an `after`. Every value is optional: synthetic changes from the
//! plain-text fallback carry none, external producers omit null values, and
//! consumers treat a missing value as unknown rather than as a zero value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream importance assigned by the producing differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

/// JSON type of the changed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    Number,
    Array,
    Object,
    Null,
    Unknown,
}

impl ValueType {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => ValueType::Null,
            Some(Value::String(_)) => ValueType::String,
            Some(Value::Bool(_)) => ValueType::Boolean,
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => ValueType::Integer,
            Some(Value::Number(_)) => ValueType::Number,
            Some(Value::Array(_)) => ValueType::Array,
            Some(Value::Object(_)) => ValueType::Object,
        }
    }
}

/// One segment of a tokenized path: a map key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathToken {
    Index(i64),
    Key(String),
}

impl PathToken {
    /// Split a dotted path; integer-looking segments become indices
    pub fn tokenize(path: &str) -> Vec<PathToken> {
        if path.is_empty() {
            return Vec::new();
        }
        path.split('.')
            .map(|part| match part.parse::<i64>() {
                Ok(idx) => PathToken::Index(idx),
                Err(_) => PathToken::Key(part.to_string()),
            })
            .collect()
    }
}

/// Operation tag of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOp {
    Add,
    Remove,
    Replace,
}

impl ChangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Add => "add",
            ChangeOp::Remove => "remove",
            ChangeOp::Replace => "replace",
        }
    }
}

/// The operation together with the values it is allowed to carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Delta {
    Add {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<Value>,
    },
    Remove {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<Value>,
    },
    Replace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        before: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<Value>,
    },
}

/// A single field-level delta inside one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(flatten)]
    pub delta: Delta,
    pub path: String,
    #[serde(default)]
    pub path_tokens: Vec<PathToken>,
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

impl Change {
    fn with_delta(delta: Delta, path: impl Into<String>) -> Self {
        let path = path.into();
        let value_type = match &delta {
            Delta::Add { after } => ValueType::of(after.as_ref()),
            Delta::Remove { before } => ValueType::of(before.as_ref()),
            Delta::Replace { before, after } => ValueType::of(after.as_ref().or(before.as_ref())),
        };
        Self {
            delta,
            path_tokens: PathToken::tokenize(&path),
            path,
            value_type,
            semantic_type: None,
            change_category: None,
            importance: None,
            flags: Vec::new(),
        }
    }

    pub fn add(path: impl Into<String>, after: Value) -> Self {
        Self::with_delta(Delta::Add { after: Some(after) }, path)
    }

    pub fn remove(path: impl Into<String>, before: Value) -> Self {
        Self::with_delta(Delta::Remove { before: Some(before) }, path)
    }

    pub fn replace(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::with_delta(
            Delta::Replace {
                before: Some(before),
                after: Some(after),
            },
            path,
        )
    }

    /// Replace whose values are unknown, as produced by the plain-text fallback
    pub fn opaque(path: impl Into<String>) -> Self {
        let mut change = Self::with_delta(
            Delta::Replace {
                before: None,
                after: None,
            },
            path,
        );
        change.value_type = ValueType::String;
        change
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.change_category = Some(category.into());
        self
    }

    pub fn with_semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn op(&self) -> ChangeOp {
        match self.delta {
            Delta::Add { .. } => ChangeOp::Add,
            Delta::Remove { .. } => ChangeOp::Remove,
            Delta::Replace { .. } => ChangeOp::Replace,
        }
    }

    /// Value before the change; `None` means absent or unknown
    pub fn before(&self) -> Option<&Value> {
        match &self.delta {
            Delta::Add { .. } => None,
            Delta::Remove { before } => before.as_ref(),
            Delta::Replace { before, .. } => before.as_ref(),
        }
    }

    /// Value after the change; `None` means absent or unknown
    pub fn after(&self) -> Option<&Value> {
        match &self.delta {
            Delta::Add { after } => after.as_ref(),
            Delta::Remove { .. } => None,
            Delta::Replace { after, .. } => after.as_ref(),
        }
    }
}
