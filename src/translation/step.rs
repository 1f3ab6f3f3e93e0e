/*!
 * Run and step records for multi-step translation.
 *
 * A run is an ordered list of steps whose outputs chain into each other:
 * the final text of step `i` becomes the input text of step `i + 1`.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a single translation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step has not started yet
    Pending,
    /// Step is waiting on the gateway
    InProgress,
    /// Step finished and produced a final text
    Completed,
    /// Gateway call failed for this step
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::InProgress => write!(f, "in_progress"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing running; either empty or freshly initialized
    #[default]
    Idle,
    /// A step is being executed or the run is between steps
    Running,
    /// Every step completed
    Completed,
    /// A step failed and the run stopped
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One link in the translation chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStep {
    /// 1-based position in the run
    pub id: usize,
    /// Text fed into this step
    pub input_text: String,
    /// Rendering in the intermediate language (empty until completed)
    pub intermediate_text: String,
    /// Code of the intermediate language (empty until completed)
    pub intermediate_language: String,
    /// Back-translated result (empty until completed)
    pub final_text: String,
    /// Lifecycle status
    pub status: StepStatus,
}

impl TranslationStep {
    /// Create a pending step
    pub fn pending(id: usize, input_text: impl Into<String>) -> Self {
        Self {
            id,
            input_text: input_text.into(),
            intermediate_text: String::new(),
            intermediate_language: String::new(),
            final_text: String::new(),
            status: StepStatus::Pending,
        }
    }
}

/// Output recorded on a step when it completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Rendering in the intermediate language
    pub intermediate_text: String,
    /// Code of the intermediate language
    pub intermediate_language: String,
    /// Back-translated result
    pub final_text: String,
}

/// Where and why a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// 0-based index of the failing step
    pub step_index: usize,
    /// Human-readable failure reason
    pub reason: String,
}

/// Snapshot of a multi-step run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// Run-sequence number this snapshot belongs to
    pub generation: u64,
    /// Ordered steps, length fixed at initialization
    pub steps: Vec<TranslationStep>,
    /// Index of the step currently executing
    pub current_index: Option<usize>,
    /// Overall status
    pub overall_status: RunStatus,
    /// Final text, only set once the run completed
    pub final_text: Option<String>,
    /// Failure details, only set once the run failed
    pub failure: Option<RunFailure>,
}

impl Run {
    /// Build a fresh run of `count` pending steps seeded with `input_text`
    pub fn new(generation: u64, input_text: &str, count: usize) -> Self {
        Self {
            generation,
            steps: (1..=count)
                .map(|id| TranslationStep::pending(id, input_text))
                .collect(),
            ..Default::default()
        }
    }

    /// An empty idle run
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    /// Whether the run has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of completed steps
    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    /// Fraction of completed steps in `[0.0, 1.0]`
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.steps.len() as f64
    }

    /// Progress as a percentage
    pub fn completion_percentage(&self) -> f64 {
        self.progress() * 100.0
    }

    /// The step currently executing, if any
    pub fn current_step(&self) -> Option<&TranslationStep> {
        self.current_index.and_then(|i| self.steps.get(i))
    }

    /// Get a human-readable status string
    pub fn status_display(&self) -> String {
        match self.overall_status {
            RunStatus::Idle if self.steps.is_empty() => "Not started".to_string(),
            RunStatus::Idle => format!("Ready ({} steps)", self.steps.len()),
            RunStatus::Running => match self.current_index {
                Some(i) => format!(
                    "Running step {}/{} ({:.0}%)",
                    i + 1,
                    self.steps.len(),
                    self.completion_percentage()
                ),
                None => format!("Running ({:.0}%)", self.completion_percentage()),
            },
            RunStatus::Completed => "Completed".to_string(),
            RunStatus::Failed => match &self.failure {
                Some(failure) => format!("Failed at step {}: {}", failure.step_index + 1, failure.reason),
                None => "Failed".to_string(),
            },
        }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[run {}] {}", self.generation, self.status_display())
    }
}
