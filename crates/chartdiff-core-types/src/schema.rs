//! Canonical schema constants for structured logging
//!
//! Field names written by the boundary macros. `tracing` needs literal field
//! identifiers at the call site, so these constants are for readers of the
//! events (the test capture layer and log assertions).

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_REPOSITORY: &str = "repository";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
