/*!
 * Integration tests for resetting or replacing a run while a step is in flight.
 */

use std::sync::Arc;
use std::time::Duration;

use roundtrip::providers::mock::MockGateway;
use roundtrip::telemetry::{RecordingTracer, TraceEvent};
use roundtrip::translation::orchestrator::{RUN_OPERATION, STEP_OPERATION};
use roundtrip::translation::{Orchestrator, OrchestratorConfig, RunStatus, StepStatus};

use crate::common::{self, GatedGateway};

#[tokio::test]
async fn test_reset_midRun_shouldDiscardLateResponse() {
    let gateway = GatedGateway::new();
    let (orchestrator, tracer) = common::orchestrator_with(gateway.clone());

    let runner = orchestrator.clone();
    let task = tokio::spawn(async move { runner.run("Hello", 3).await });

    gateway.wait_entered().await;
    orchestrator.reset();
    let after_reset = orchestrator.snapshot();
    assert!(after_reset.is_empty());
    assert!(!orchestrator.is_running());

    // Deliver the response the reset run was waiting for
    gateway.release();
    let outcome = task.await.unwrap().unwrap();

    assert!(outcome.is_abandoned());
    assert_eq!(orchestrator.snapshot(), after_reset);
    assert_eq!(gateway.calls(), 1);
    assert!(tracer.unbalanced_operations().is_empty());

    let resolutions: Vec<String> = tracer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TraceEvent::Errored { resolution, .. } => Some(resolution),
            _ => None,
        })
        .collect();
    assert_eq!(resolutions.len(), 2);
    assert!(resolutions.iter().all(|r| r.contains("discarded")));
}

#[tokio::test]
async fn test_reset_duringStepDelay_shouldAbandonBeforeNextStep() {
    common::init_logging();
    let gateway = MockGateway::working();
    let tracer = RecordingTracer::new();
    let orchestrator = Orchestrator::new(
        Arc::new(gateway.clone()),
        Arc::new(tracer.clone()),
        OrchestratorConfig::immediate().with_step_delay(Duration::from_millis(300)),
    );

    let runner = orchestrator.clone();
    let task = tokio::spawn(async move { runner.run("Hello", 3).await });

    tokio::time::sleep(Duration::from_millis(100)).await;

    // Between steps: still running, step 1 done, nothing in progress
    let paused = orchestrator.snapshot();
    assert_eq!(paused.overall_status, RunStatus::Running);
    assert_eq!(paused.steps[0].status, StepStatus::Completed);
    assert!(paused.steps.iter().all(|s| s.status != StepStatus::InProgress));
    assert_eq!(orchestrator.current_step(), None);
    assert!(orchestrator.is_running());

    orchestrator.reset();
    let outcome = task.await.unwrap().unwrap();

    assert!(outcome.is_abandoned());
    assert_eq!(gateway.calls(), 1);
    let run = orchestrator.snapshot();
    assert!(run.is_empty());
    assert_eq!(run.overall_status, RunStatus::Idle);
    assert!(!orchestrator.is_running());
    assert!(tracer.unbalanced_operations().is_empty());
    assert_eq!(tracer.events_for(STEP_OPERATION).len(), 2);
}

#[tokio::test]
async fn test_reset_midRunWithLateFailure_shouldNotMarkAnything() {
    let gateway = GatedGateway::wrapping(MockGateway::failing());
    let (orchestrator, tracer) = common::orchestrator_with(gateway.clone());

    let runner = orchestrator.clone();
    let task = tokio::spawn(async move { runner.run("Hello", 2).await });

    gateway.wait_entered().await;
    orchestrator.reset();
    gateway.release();

    let outcome = task.await.unwrap().unwrap();

    assert!(outcome.is_abandoned());
    let run = orchestrator.snapshot();
    assert!(run.is_empty());
    assert_eq!(run.overall_status, RunStatus::Idle);
    assert!(run.failure.is_none());
    assert!(tracer.unbalanced_operations().is_empty());
}

#[tokio::test]
async fn test_newRun_whileOldRunInFlight_shouldWin() {
    let gateway = GatedGateway::new();
    let (orchestrator, tracer) = common::orchestrator_with(gateway.clone());

    let first_runner = orchestrator.clone();
    let first = tokio::spawn(async move { first_runner.run("Hello", 2).await });
    gateway.wait_entered().await;

    let second_runner = orchestrator.clone();
    let second = tokio::spawn(async move { second_runner.run("Bonjour", 1).await });
    gateway.wait_entered().await;

    gateway.release();
    gateway.release();

    let first_outcome = first.await.unwrap().unwrap();
    let second_outcome = second.await.unwrap().unwrap();

    assert!(first_outcome.is_abandoned());
    assert_eq!(second_outcome.final_text(), Some("[ja] Bonjour"));

    let run = orchestrator.snapshot();
    assert_eq!(run.steps.len(), 1);
    assert_eq!(run.steps[0].input_text, "Bonjour");
    assert_eq!(run.steps[0].status, StepStatus::Completed);
    assert_eq!(run.overall_status, RunStatus::Completed);
    assert!(!orchestrator.is_running());
    assert!(tracer.unbalanced_operations().is_empty());
    assert_eq!(tracer.events_for(RUN_OPERATION).len(), 4);
    assert_eq!(tracer.events_for(STEP_OPERATION).len(), 4);
}

#[tokio::test]
async fn test_reset_afterCompletion_shouldReturnToIdle() {
    let (orchestrator, _tracer) = common::orchestrator_with(MockGateway::working());
    orchestrator.run("Hello", 2).await.unwrap();

    orchestrator.reset();

    let run = orchestrator.snapshot();
    assert!(run.is_empty());
    assert_eq!(run.overall_status, RunStatus::Idle);
    assert!(run.final_text.is_none());
    assert_eq!(orchestrator.progress(), 0.0);
    assert_eq!(orchestrator.current_step(), None);
}

#[tokio::test]
async fn test_run_afterReset_shouldStartCleanly() {
    let gateway = GatedGateway::new();
    let (orchestrator, _tracer) = common::orchestrator_with(gateway.clone());

    let runner = orchestrator.clone();
    let abandoned = tokio::spawn(async move { runner.run("Hello", 3).await });
    gateway.wait_entered().await;
    orchestrator.reset();
    gateway.release();
    assert!(abandoned.await.unwrap().unwrap().is_abandoned());

    let runner = orchestrator.clone();
    let fresh = tokio::spawn(async move { runner.run("Hola", 1).await });
    gateway.wait_entered().await;
    assert!(orchestrator.is_running());
    gateway.release();

    let outcome = fresh.await.unwrap().unwrap();
    assert_eq!(outcome.final_text(), Some("[ja] Hola"));
    assert_eq!(orchestrator.snapshot().steps[0].input_text, "Hola");
}
