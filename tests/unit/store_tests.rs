/*!
 * Tests for the step state store through its public API
 */

use roundtrip::translation::{RunStatus, StepOutput, StepStateStore, StepStatus};

fn output(final_text: &str) -> StepOutput {
    StepOutput {
        intermediate_text: format!("[es] {}", final_text),
        intermediate_language: "es".to_string(),
        final_text: final_text.to_string(),
    }
}

#[test]
fn test_fullLifecycle_shouldReportEachPhase() {
    let mut store = StepStateStore::default();
    assert!(store.run().is_empty());
    assert_eq!(store.run().overall_status, RunStatus::Idle);

    let generation = store.initialize("Hello", 2).unwrap();
    assert_eq!(store.run().steps.len(), 2);
    assert_eq!(store.progress(), 0.0);

    assert_eq!(store.begin_step(generation, 0).unwrap(), "Hello");
    assert_eq!(store.run().current_step().map(|s| s.id), Some(1));
    assert_eq!(store.run().overall_status, RunStatus::Running);

    store.complete_step(generation, 0, output("one")).unwrap();
    assert_eq!(store.progress(), 0.5);
    assert_eq!(store.run().current_index, None);

    assert_eq!(store.begin_step(generation, 1).unwrap(), "one");
    store.complete_step(generation, 1, output("two")).unwrap();

    assert_eq!(store.finish_run(generation).unwrap(), "two");
    let run = store.snapshot();
    assert_eq!(run.overall_status, RunStatus::Completed);
    assert_eq!(run.final_text.as_deref(), Some("two"));
    assert!(run.steps.iter().all(|s| s.status == StepStatus::Completed));
    assert_eq!(store.progress(), 1.0);
}

#[test]
fn test_failedRun_shouldKeepReasonAndIndex() {
    let mut store = StepStateStore::default();
    let generation = store.initialize("Hello", 3).unwrap();

    store.begin_step(generation, 0).unwrap();
    store.fail_step(generation, 0, "backend down").unwrap();

    let run = store.snapshot();
    let failure = run.failure.clone().unwrap();
    assert_eq!(failure.step_index, 0);
    assert_eq!(failure.reason, "backend down");
    assert!(run.final_text.is_none());
    assert!(store.begin_step(generation, 1).is_err());
}

#[test]
fn test_snapshot_shouldSerializeForDisplay() {
    let mut store = StepStateStore::default();
    let generation = store.initialize("Hello", 1).unwrap();
    store.begin_step(generation, 0).unwrap();

    let json = serde_json::to_value(store.snapshot()).unwrap();

    assert_eq!(json["overall_status"], "running");
    assert_eq!(json["current_index"], 0);
    assert_eq!(json["steps"][0]["status"], "in_progress");
    assert_eq!(json["steps"][0]["input_text"], "Hello");
}

#[test]
fn test_reset_shouldInvalidateEveryOutstandingGeneration() {
    let mut store = StepStateStore::default();
    let first = store.initialize("Hello", 2).unwrap();
    let second = store.initialize("Bonjour", 2).unwrap();
    store.reset();

    for generation in [first, second] {
        let error = store.begin_step(generation, 0).unwrap_err();
        assert!(error.is_stale());
    }
    assert!(store.run().is_empty());
    assert!(!store.is_running());
}
