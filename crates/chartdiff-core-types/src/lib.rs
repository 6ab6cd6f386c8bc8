//! Core types shared across chartdiff facilities
//!
//! This crate provides foundational types used by the error, logging and
//! pipeline layers:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId};
pub use sensitive::{redact_userinfo, Sensitive};
