/*!
 * Multi-step translation orchestrator.
 *
 * Drives a run of N round trips where each step translates the previous
 * step's final text:
 * 1. Validate the request (nothing is traced or stored for a rejected one)
 * 2. Open the run operation and initialize the step store
 * 3. For each step: begin it, call the gateway, record the result, close the step operation
 * 4. Close the run operation with the final text or the first failure
 *
 * The store is shared with callers so they can poll progress or reset it
 * while a run is in flight. A reset bumps the store generation; the run loop
 * then finds its own generation stale, drops whatever it was holding, and
 * returns `RunOutcome::Abandoned`.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::OrchestrationConfig;
use crate::errors::{OrchestrationError, ProviderError};
use crate::telemetry::{OperationHandle, OperationTracer};

use super::gateway::{RoundTrip, TranslationGateway};
use super::step::Run;
use super::store::{DEFAULT_MAX_REPEAT_COUNT, DEFAULT_MIN_REPEAT_COUNT, StepStateStore};

/// Operation name of a whole run
pub const RUN_OPERATION: &str = "multi_translation_process";

/// Operation name of a single step
pub const STEP_OPERATION: &str = "multi_translation_step";

const STEP_FAILED_RESOLUTION: &str = "step marked as failed; remaining steps skipped";
const RUN_FAILED_RESOLUTION: &str = "multi-step translation aborted";
const DISCARDED_RESOLUTION: &str = "run was reset or replaced; result discarded";

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause after each successful step that has a successor
    pub step_delay: Duration,

    /// Smallest accepted repeat count
    pub min_repeat_count: usize,

    /// Largest accepted repeat count
    pub max_repeat_count: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(500),
            min_repeat_count: DEFAULT_MIN_REPEAT_COUNT,
            max_repeat_count: DEFAULT_MAX_REPEAT_COUNT,
        }
    }
}

impl OrchestratorConfig {
    /// Default bounds with no pause between steps
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Set the pause between steps.
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Set the accepted repeat count range.
    pub fn with_bounds(mut self, min_repeat_count: usize, max_repeat_count: usize) -> Self {
        self.min_repeat_count = min_repeat_count;
        self.max_repeat_count = max_repeat_count;
        self
    }
}

impl From<&OrchestrationConfig> for OrchestratorConfig {
    fn from(config: &OrchestrationConfig) -> Self {
        Self {
            step_delay: Duration::from_millis(config.step_delay_ms),
            min_repeat_count: config.min_repeat_count,
            max_repeat_count: config.max_repeat_count,
        }
    }
}

/// How a run that was not rejected ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step completed
    Completed {
        /// Final text of the last step
        final_text: String,
    },
    /// The run was reset or replaced while in flight
    Abandoned,
}

impl RunOutcome {
    /// Final text of a completed run
    pub fn final_text(&self) -> Option<&str> {
        match self {
            Self::Completed { final_text } => Some(final_text),
            Self::Abandoned => None,
        }
    }

    /// Whether the run was superseded
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

/// How the step loop ended
enum LoopEnd {
    Finished(String),
    Failed(OrchestrationError),
    Superseded(OrchestrationError),
}

impl LoopEnd {
    fn from_store_error(error: OrchestrationError) -> Self {
        if error.is_stale() {
            Self::Superseded(error)
        } else {
            Self::Failed(error)
        }
    }
}

/// Clears the running indicator when the run loop exits, however it exits
struct RunnerGuard {
    store: Arc<Mutex<StepStateStore>>,
    generation: u64,
}

impl Drop for RunnerGuard {
    fn drop(&mut self) {
        self.store.lock().release_runner(self.generation);
    }
}

/// Sequential multi-step translation orchestrator.
///
/// Cloning is cheap and every clone shares the same store, so one clone can
/// run while another polls `snapshot()` or calls `reset()`.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    gateway: Arc<dyn TranslationGateway>,
    tracer: Arc<dyn OperationTracer>,
    store: Arc<Mutex<StepStateStore>>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the given gateway and tracer.
    pub fn new(
        gateway: Arc<dyn TranslationGateway>,
        tracer: Arc<dyn OperationTracer>,
        config: OrchestratorConfig,
    ) -> Self {
        let store = StepStateStore::new(config.min_repeat_count, config.max_repeat_count);
        Self {
            gateway,
            tracer,
            store: Arc::new(Mutex::new(store)),
            config,
        }
    }

    /// Get the orchestrator configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Translate `input_text` through `count` chained round trips.
    ///
    /// Returns `InvalidInput` without side effects for blank text or an
    /// out-of-range count, and `GatewayFailure` naming the 1-based step when
    /// a gateway call fails. A run that gets reset mid-flight returns
    /// `RunOutcome::Abandoned`.
    pub async fn run(&self, input_text: &str, count: usize) -> Result<RunOutcome, OrchestrationError> {
        self.store.lock().validate(input_text, count)?;

        let text_length = input_text.chars().count();
        let run_span = self.tracer.start_operation(
            RUN_OPERATION,
            json!({
                "original_text": input_text,
                "text_length": text_length,
                "repeat_count": count,
            }),
        );

        let initialized = self.store.lock().initialize(input_text, count);
        let generation = match initialized {
            Ok(generation) => generation,
            Err(e) => {
                self.tracer.error_operation(run_span, (&e).into(), RUN_FAILED_RESOLUTION);
                return Err(e);
            }
        };

        self.store.lock().claim_runner(generation);
        let _runner = RunnerGuard {
            store: Arc::clone(&self.store),
            generation,
        };

        info!("Starting {}-step translation (run {}, {} chars)", count, generation, text_length);

        match self.drive_steps(generation, count).await {
            LoopEnd::Finished(final_text) => {
                self.tracer.complete_operation(
                    run_span,
                    json!({
                        "total_steps": count,
                        "final_text": final_text,
                        "final_text_length": final_text.chars().count(),
                    }),
                );
                info!("Run {} completed after {} steps", generation, count);
                Ok(RunOutcome::Completed { final_text })
            }
            LoopEnd::Failed(error) => {
                self.tracer.error_operation(run_span, (&error).into(), RUN_FAILED_RESOLUTION);
                warn!("Run {} failed: {}", generation, error);
                Err(error)
            }
            LoopEnd::Superseded(error) => {
                self.tracer.error_operation(run_span, (&error).into(), DISCARDED_RESOLUTION);
                info!("Run {} abandoned: {}", generation, error);
                Ok(RunOutcome::Abandoned)
            }
        }
    }

    async fn drive_steps(&self, generation: u64, count: usize) -> LoopEnd {
        for index in 0..count {
            let begun = self.store.lock().begin_step(generation, index);
            let step_input = match begun {
                Ok(text) => text,
                Err(e) => return LoopEnd::from_store_error(e),
            };

            let step_id = index + 1;
            let step_span = self.tracer.start_operation(
                STEP_OPERATION,
                json!({
                    "step_id": step_id,
                    "original_text": step_input,
                    "text_length": step_input.chars().count(),
                }),
            );
            debug!("Step {}/{} started", step_id, count);

            let translated = self.gateway.translate(&step_input).await.and_then(check_round_trip);

            match translated {
                Ok(round_trip) => {
                    if let Err(end) = self.record_success(generation, index, round_trip, step_span) {
                        return end;
                    }
                }
                Err(provider_error) => {
                    return self.record_failure(generation, index, provider_error, step_span);
                }
            }

            if index + 1 < count && !self.config.step_delay.is_zero() {
                tokio::time::sleep(self.config.step_delay).await;
            }
        }

        let finished = self.store.lock().finish_run(generation);
        match finished {
            Ok(final_text) => LoopEnd::Finished(final_text),
            Err(e) => LoopEnd::from_store_error(e),
        }
    }

    fn record_success(
        &self,
        generation: u64,
        index: usize,
        round_trip: RoundTrip,
        step_span: OperationHandle,
    ) -> Result<(), LoopEnd> {
        let output = json!({
            "step_id": index + 1,
            "intermediate_language": round_trip.intermediate_language,
            "intermediate_text_length": round_trip.intermediate_text.chars().count(),
            "final_text_length": round_trip.final_text.chars().count(),
        });

        let applied = self.store.lock().complete_step(generation, index, round_trip.into());
        match applied {
            Ok(()) => {
                self.tracer.complete_operation(step_span, output);
                Ok(())
            }
            Err(e) => {
                let resolution = if e.is_stale() { DISCARDED_RESOLUTION } else { STEP_FAILED_RESOLUTION };
                self.tracer.error_operation(step_span, (&e).into(), resolution);
                Err(LoopEnd::from_store_error(e))
            }
        }
    }

    fn record_failure(
        &self,
        generation: u64,
        index: usize,
        provider_error: ProviderError,
        step_span: OperationHandle,
    ) -> LoopEnd {
        let step_id = index + 1;
        let marked = self.store.lock().fail_step(generation, index, provider_error.to_string());
        match marked {
            Ok(()) => {
                self.tracer.error_operation(step_span, (&provider_error).into(), STEP_FAILED_RESOLUTION);
                warn!("Step {} failed: {}", step_id, provider_error);
                LoopEnd::Failed(OrchestrationError::GatewayFailure {
                    step: step_id,
                    source: provider_error,
                })
            }
            Err(e) => {
                let resolution = if e.is_stale() { DISCARDED_RESOLUTION } else { STEP_FAILED_RESOLUTION };
                self.tracer.error_operation(step_span, (&provider_error).into(), resolution);
                LoopEnd::from_store_error(e)
            }
        }
    }

    /// Clear the run; an in-flight run will discard its pending result.
    pub fn reset(&self) {
        let generation = self.store.lock().reset();
        debug!("Orchestrator reset (generation {})", generation);
    }

    /// Fraction of completed steps in the current run.
    pub fn progress(&self) -> f64 {
        self.store.lock().progress()
    }

    /// Copy of the current run.
    pub fn snapshot(&self) -> Run {
        self.store.lock().snapshot()
    }

    /// Whether a run loop is driving the current run.
    pub fn is_running(&self) -> bool {
        self.store.lock().is_running()
    }

    /// 1-based id of the step currently executing.
    pub fn current_step(&self) -> Option<usize> {
        self.store.lock().run().current_step().map(|s| s.id)
    }
}

/// Reject round trips that cannot feed the next step
fn check_round_trip(round_trip: RoundTrip) -> Result<RoundTrip, ProviderError> {
    if round_trip.final_text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse(
            "gateway returned an empty final text".to_string(),
        ));
    }
    Ok(round_trip)
}
