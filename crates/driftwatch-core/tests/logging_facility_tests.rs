#![allow(clippy::unwrap_used, clippy::expect_used)]

use driftwatch_core::errors::{DriftError, ExError, ExErrorKind};
use driftwatch_core::logging_facility::test_capture::init_test_capture;
use driftwatch_core::{log_op_end, log_op_error, log_op_skip, log_op_start};
use driftwatch_core::{Analytics, MemoryReportStore};
use driftwatch_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_SKIPPED, EVENT_START};
use serde_json::json;

#[test]
fn test_log_op_start_and_end_macros() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_end_unique_1";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 42, findings_len = 3);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[1].field("duration_ms"), Some("42"));
    assert_eq!(events[1].field("findings_len"), Some("3"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_2";

    let err = ExError::new(ExErrorKind::NotFound).with_message("rules.yaml");
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field("err_code"), Some("ERR_NOT_FOUND"));
}

#[test]
fn test_log_op_skip_converts_domain_errors() {
    let capture = init_test_capture();
    let op_name = "test_log_op_skip_unique_3";

    let err = DriftError::UnknownRuleType {
        rule: "regex_rule".to_string(),
        rule_type: "regex".to_string(),
    };
    log_op_skip!(op_name, err);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_SKIPPED));
    assert_eq!(events[0].level, tracing::Level::WARN);
    assert_eq!(events[0].field("err_code"), Some("ERR_UNKNOWN_RULE_TYPE"));
}

#[test]
fn test_malformed_report_name_is_logged_as_skip() {
    let capture = init_test_capture();

    // Given a current report whose name has no separator
    let current = MemoryReportStore::new("current")
        .with("unique-skip-marker-4.json", json!({}));
    let previous = MemoryReportStore::new("previous");

    // When the diff pass runs
    let analytics = Analytics::load(&current, &previous).unwrap();
    let pass = analytics.check_diff_projects();

    // Then the report is excluded and a skip event names it
    assert!(pass.index.current.is_empty());
    let skipped = capture.count_events(|e| {
        e.op.as_deref() == Some("check_diff_projects")
            && e.event.as_deref() == Some(EVENT_SKIPPED)
            && e.field("err_code") == Some("ERR_INVALID_IDENTIFIER")
            && e
                .field("message")
                .is_some_and(|m| m.contains("unique-skip-marker-4"))
    });
    assert_eq!(skipped, 1);
    capture.assert_event_exists("check_diff_projects", EVENT_START);
    capture.assert_event_exists("check_diff_projects", EVENT_END);
}
