//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across every crate that logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Entity identifiers
pub const FIELD_RESOURCE: &str = "resource";
pub const FIELD_ATTRIBUTE: &str = "attribute";
pub const FIELD_RULE: &str = "rule";
pub const FIELD_PATH: &str = "path";

// Collection sizes
pub const FIELD_FINDINGS_LEN: &str = "findings_len";
pub const FIELD_REPORTS_LEN: &str = "reports_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SKIPPED: &str = "skipped";
