use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of one risk signal. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Availability,
    Security,
    Other,
}

/// One reviewable concern derived from a resource event or a single change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSignal {
    /// `Kind/name` of the resource
    pub resource: String,
    pub kind: String,
    pub level: RiskLevel,
    pub category: RiskCategory,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Overall rollup of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    HighRisk,
    MediumRisk,
    LowRisk,
    NoChanges,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::HighRisk => "high-risk",
            Verdict::MediumRisk => "medium-risk",
            Verdict::LowRisk => "low-risk",
            Verdict::NoChanges => "no-changes",
        }
    }
}

/// Risk signals grouped by category plus the overall verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub verdict: Verdict,
    pub availability_impact: Vec<RiskSignal>,
    pub security_impact: Vec<RiskSignal>,
    pub other_changes: Vec<RiskSignal>,
    pub total_high_risk: usize,
    pub total_medium_risk: usize,
    pub total_low_risk: usize,
    pub total_changed_resources: usize,
}

impl ImpactSummary {
    /// All signals in category order: availability, security, other
    pub fn signals(&self) -> impl Iterator<Item = &RiskSignal> {
        self.availability_impact
            .iter()
            .chain(self.security_impact.iter())
            .chain(self.other_changes.iter())
    }
}
