//! Public pipeline operations.
//!
//! ## Logging Ownership
//!
//! Each operation here owns its lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (process, git, helm, store, core) use only `tracing::debug!`
//! and `tracing::warn!`.

pub mod compare;
pub mod render;
pub mod versions;
