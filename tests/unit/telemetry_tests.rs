/*!
 * Tests for the operation tracers
 */

use serde_json::json;

use roundtrip::errors::{OrchestrationError, ProviderError};
use roundtrip::telemetry::{LogTracer, OperationError, OperationTracer, RecordingTracer, TraceEvent};

use crate::common;

#[test]
fn test_logTracer_shouldAcceptEveryCall() {
    common::init_logging();
    let tracer = LogTracer::new();

    let ok = tracer.start_operation("op", json!({ "text_length": 5 }));
    tracer.complete_operation(ok, json!({ "final_text_length": 3 }));

    let failed = tracer.start_operation("op", json!({}));
    let error = ProviderError::EmptyResponse("nothing".to_string());
    tracer.error_operation(failed, (&error).into(), "step marked as failed");
}

#[test]
fn test_recordingTracer_errorEvent_shouldCarryPayload() {
    let tracer = RecordingTracer::new();
    let handle = tracer.start_operation("multi_translation_process", json!({ "repeat_count": 3 }));
    let error = OrchestrationError::InvalidState("bad".to_string());

    tracer.error_operation(handle, OperationError::from(&error), "multi-step translation aborted");

    let events = tracer.events();
    assert_eq!(events.len(), 2);
    match &events[1] {
        TraceEvent::Errored { input, error_type, resolution, .. } => {
            assert_eq!(input["repeat_count"], 3);
            assert_eq!(error_type, "InvalidState");
            assert_eq!(resolution, "multi-step translation aborted");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_recordingTracer_summary_shouldListClosedOperations() {
    let tracer = RecordingTracer::new();
    let first = tracer.start_operation("first", json!({}));
    let second = tracer.start_operation("second", json!({}));
    tracer.complete_operation(first, json!({}));
    tracer.error_operation(second, OperationError::new("boom", "ApiError"), "aborted");

    let summary = tracer.summary();
    let lines: Vec<&str> = summary.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("first"));
    assert!(lines[1].contains("ApiError"));

    tracer.clear();
    assert!(tracer.events().is_empty());
}

#[test]
fn test_operationIds_shouldBeUnique() {
    let tracer = RecordingTracer::new();
    let a = tracer.start_operation("op", json!({}));
    let b = tracer.start_operation("op", json!({}));

    assert_ne!(a.id(), b.id());

    tracer.complete_operation(a, json!({}));
    tracer.complete_operation(b, json!({}));
    assert!(tracer.unbalanced_operations().is_empty());
}
