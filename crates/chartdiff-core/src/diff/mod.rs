//! Manifest differs.
//!
//! Produces a [`StructuredDiff`](crate::model::StructuredDiff) from two
//! rendered manifest streams, or a plain line-oriented diff when the
//! structured path is unavailable.
//!
//! ## Entry points
//!
//! ```
//! use chartdiff_core::diff::{ManifestDiffer, SemanticDiffer};
//! use chartdiff_core::model::InputSources;
//!
//! let left = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\ndata:\n  a: \"1\"\n";
//! let right = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\ndata:\n  a: \"2\"\n";
//!
//! let diff = SemanticDiffer::default()
//!     .compare(left, right, &InputSources::default())
//!     .unwrap();
//! assert_eq!(diff.resources.len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: resources are emitted in `(apiVersion, kind, namespace, name)`
//!   order and fields in sorted key order.
//! - **Tolerance**: blank, invalid and identity-less documents are skipped,
//!   not treated as errors. Only a stream where nothing could be parsed fails.
//! - **Hash invariants**: `added` carries only `afterHash`, `removed` only
//!   `beforeHash`, `modified` carries both.

pub mod dyff_filter;
pub mod engine;
pub mod line_diff;
pub mod manifest;
pub mod semantic;

pub use dyff_filter::filter_metadata_sections;
pub use engine::{DiffOptions, ManifestDiffer, SemanticDiffer, ENGINE_VERSION};
pub use line_diff::line_diff;
pub use manifest::{parse_stream, ManifestDocument, ParsedStream};
