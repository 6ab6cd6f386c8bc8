//! Shared diff model.
//!
//! The canonical data contract exchanged between the differ, the diff
//! normalizer, the risk classifier and callers. Every type serializes to
//! the camelCase JSON shape consumed by the presentation layer.
//!
//! All values are created once per comparison and never mutated afterwards.

pub mod change;
pub mod identity;
pub mod resource;
pub mod risk;
pub mod structured;

pub use change::{Change, ChangeOp, Delta, Importance, PathToken, ValueType};
pub use identity::ResourceIdentity;
pub use resource::{ChangeType, ResourceDiff, ResourceSummary};
pub use risk::{ImpactSummary, RiskCategory, RiskLevel, RiskSignal, Verdict};
pub use structured::{
    ChangeStats, DiffMetadata, DiffStats, InputSources, ResourceStats, SourceMetadata,
    StructuredDiff,
};
