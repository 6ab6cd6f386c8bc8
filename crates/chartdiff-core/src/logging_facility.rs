//! Structured logging facility for chartdiff
//!
//! - Single initialization point via `init(profile)`
//! - Structured boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use chartdiff_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! The engine layer owns the start/end events of public operations. Core and
//! store code only emit `tracing::debug!` / `tracing::warn!` details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
