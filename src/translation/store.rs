/*!
 * Step state store.
 *
 * Holds the current run and is the only place its steps change state. Every
 * mutation is tagged with the generation returned by `initialize`; a call
 * carrying any other generation is rejected with `StaleGeneration`, which is
 * how late results from a reset or replaced run are kept out of the new one.
 */

use log::debug;

use crate::errors::OrchestrationError;

use super::step::{Run, RunFailure, RunStatus, StepOutput, StepStatus};

/// Default lower bound for the repeat count
pub const DEFAULT_MIN_REPEAT_COUNT: usize = 1;

/// Default upper bound for the repeat count
pub const DEFAULT_MAX_REPEAT_COUNT: usize = 10;

type Result<T> = std::result::Result<T, OrchestrationError>;

/// Owner of the active run
#[derive(Debug)]
pub struct StepStateStore {
    /// Current run generation
    generation: u64,
    /// The run itself
    run: Run,
    /// Smallest accepted repeat count
    min_count: usize,
    /// Largest accepted repeat count
    max_count: usize,
    /// Generation currently being driven by a run loop
    runner: Option<u64>,
}

impl Default for StepStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REPEAT_COUNT, DEFAULT_MAX_REPEAT_COUNT)
    }
}

impl StepStateStore {
    /// Create an empty store accepting repeat counts in `[min_count, max_count]`.
    ///
    /// A run always has at least one step, so `min_count` is raised to 1.
    pub fn new(min_count: usize, max_count: usize) -> Self {
        let min_count = min_count.max(1);
        Self {
            generation: 0,
            run: Run::empty(0),
            min_count,
            max_count: max_count.max(min_count),
            runner: None,
        }
    }

    /// Accepted repeat count range
    pub fn bounds(&self) -> (usize, usize) {
        (self.min_count, self.max_count)
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check a run request without touching any state
    pub fn validate(&self, input_text: &str, count: usize) -> Result<()> {
        if input_text.trim().is_empty() {
            return Err(OrchestrationError::InvalidInput(
                "input text must not be blank".to_string(),
            ));
        }
        if count < self.min_count || count > self.max_count {
            return Err(OrchestrationError::InvalidInput(format!(
                "repeat count {} is outside the allowed range {}..={}",
                count, self.min_count, self.max_count
            )));
        }
        Ok(())
    }

    /// Start a new run of `count` pending steps and return its generation
    pub fn initialize(&mut self, input_text: &str, count: usize) -> Result<u64> {
        self.validate(input_text, count)?;

        self.generation += 1;
        self.run = Run::new(self.generation, input_text, count);
        debug!("Initialized run {} with {} steps", self.generation, count);

        Ok(self.generation)
    }

    /// Move step `index` from pending to in progress and return its input text
    pub fn begin_step(&mut self, generation: u64, index: usize) -> Result<String> {
        self.check_generation(generation)?;

        if !matches!(self.run.overall_status, RunStatus::Idle | RunStatus::Running) {
            return Err(OrchestrationError::InvalidState(format!(
                "cannot begin step {} while the run is {}",
                index + 1,
                self.run.overall_status
            )));
        }

        let next = self
            .run
            .steps
            .iter()
            .take_while(|s| s.status == StepStatus::Completed)
            .count();
        if index != next {
            return Err(OrchestrationError::InvalidState(format!(
                "step {} is not the next step to run (expected step {})",
                index + 1,
                next + 1
            )));
        }

        let step = self.run.steps.get_mut(index).ok_or_else(|| {
            OrchestrationError::InvalidState(format!("run has no step {}", index + 1))
        })?;
        if step.status != StepStatus::Pending {
            return Err(OrchestrationError::InvalidState(format!(
                "step {} is already {}",
                step.id, step.status
            )));
        }

        step.status = StepStatus::InProgress;
        let input_text = step.input_text.clone();
        self.run.current_index = Some(index);
        self.run.overall_status = RunStatus::Running;

        Ok(input_text)
    }

    /// Record a successful step and hand its final text to the next step
    pub fn complete_step(&mut self, generation: u64, index: usize, output: StepOutput) -> Result<()> {
        self.check_generation(generation)?;
        self.check_in_progress(index)?;

        let next_input = output.final_text.clone();
        let step = &mut self.run.steps[index];
        step.intermediate_text = output.intermediate_text;
        step.intermediate_language = output.intermediate_language;
        step.final_text = output.final_text;
        step.status = StepStatus::Completed;

        if let Some(next) = self.run.steps.get_mut(index + 1) {
            next.input_text = next_input;
        }
        self.run.current_index = None;

        Ok(())
    }

    /// Mark step `index` failed; the run fails with it
    pub fn fail_step(&mut self, generation: u64, index: usize, reason: impl Into<String>) -> Result<()> {
        self.check_generation(generation)?;
        self.check_in_progress(index)?;

        self.run.steps[index].status = StepStatus::Failed;
        self.run.overall_status = RunStatus::Failed;
        self.run.current_index = None;
        self.run.failure = Some(RunFailure {
            step_index: index,
            reason: reason.into(),
        });

        Ok(())
    }

    /// Mark a run whose steps all completed as completed and return its final text
    pub fn finish_run(&mut self, generation: u64) -> Result<String> {
        self.check_generation(generation)?;

        if self.run.overall_status != RunStatus::Running {
            return Err(OrchestrationError::InvalidState(format!(
                "cannot finish a run that is {}",
                self.run.overall_status
            )));
        }
        if self.run.completed_count() != self.run.steps.len() {
            return Err(OrchestrationError::InvalidState(format!(
                "only {} of {} steps completed",
                self.run.completed_count(),
                self.run.steps.len()
            )));
        }

        let final_text = self
            .run
            .steps
            .last()
            .map(|s| s.final_text.clone())
            .unwrap_or_default();
        self.run.overall_status = RunStatus::Completed;
        self.run.current_index = None;
        self.run.final_text = Some(final_text.clone());

        Ok(final_text)
    }

    /// Drop the current run and start a new, empty generation
    pub fn reset(&mut self) -> u64 {
        self.generation += 1;
        self.run = Run::empty(self.generation);
        self.runner = None;
        debug!("Store reset to generation {}", self.generation);
        self.generation
    }

    /// Record that a run loop is driving `generation`
    pub fn claim_runner(&mut self, generation: u64) {
        if generation == self.generation {
            self.runner = Some(generation);
        }
    }

    /// Clear the running indicator if it still belongs to `generation`
    pub fn release_runner(&mut self, generation: u64) {
        if self.runner == Some(generation) {
            self.runner = None;
        }
        if generation == self.generation {
            self.run.current_index = None;
        }
    }

    /// Whether a run loop is driving the current generation
    pub fn is_running(&self) -> bool {
        self.runner.is_some_and(|g| g == self.generation)
    }

    /// Fraction of completed steps
    pub fn progress(&self) -> f64 {
        self.run.progress()
    }

    /// Borrow the current run
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Clone the current run for presentation
    pub fn snapshot(&self) -> Run {
        self.run.clone()
    }

    fn check_generation(&self, generation: u64) -> Result<()> {
        if generation != self.generation {
            return Err(OrchestrationError::StaleGeneration {
                expected: generation,
                current: self.generation,
            });
        }
        Ok(())
    }

    fn check_in_progress(&self, index: usize) -> Result<()> {
        match self.run.steps.get(index) {
            Some(step) if step.status == StepStatus::InProgress => Ok(()),
            Some(step) => Err(OrchestrationError::InvalidState(format!(
                "step {} is {}, not in progress",
                step.id, step.status
            ))),
            None => Err(OrchestrationError::InvalidState(format!(
                "run has no step {}",
                index + 1
            ))),
        }
    }
}
