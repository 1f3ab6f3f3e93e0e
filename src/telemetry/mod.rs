/*!
 * Operation tracing.
 *
 * Named operations are bracketed by exactly one start and one close call:
 * - `start_operation` returns an `OperationHandle` holding a monotonic start time
 * - `complete_operation` closes it with an output payload
 * - `error_operation` closes it with an error and a resolution note
 *
 * Both close calls take the handle by value, so a handle cannot be closed twice.
 */

use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::{OrchestrationError, ProviderError};

pub mod log_tracer;
pub mod recording;

pub use log_tracer::LogTracer;
pub use recording::RecordingTracer;

/// Open operation returned by `start_operation`
#[derive(Debug)]
pub struct OperationHandle {
    id: String,
    operation: String,
    started_at: Instant,
    input: Value,
}

impl OperationHandle {
    /// Open a new operation starting now
    pub fn new(operation: impl Into<String>, input: Value) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            id: id[..12].to_string(),
            operation: operation.into(),
            started_at: Instant::now(),
            input,
        }
    }

    /// Short operation id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Input payload given at start
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// Time since the operation started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Error details recorded by `error_operation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    /// Display message of the error
    pub message: String,
    /// Short name of the error kind
    pub kind: String,
}

impl OperationError {
    /// Build from a message and kind name
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
        }
    }
}

impl From<&ProviderError> for OperationError {
    fn from(error: &ProviderError) -> Self {
        Self::new(error.to_string(), error.kind())
    }
}

impl From<&OrchestrationError> for OperationError {
    fn from(error: &OrchestrationError) -> Self {
        Self::new(error.to_string(), error.kind())
    }
}

/// One recorded tracer call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// `start_operation` was called
    Started {
        operation_id: String,
        operation: String,
        input: Value,
    },
    /// `complete_operation` was called
    Completed {
        operation_id: String,
        operation: String,
        duration_ms: u64,
        input: Value,
        output: Value,
    },
    /// `error_operation` was called
    Errored {
        operation_id: String,
        operation: String,
        duration_ms: u64,
        input: Value,
        error: String,
        error_type: String,
        resolution: String,
    },
}

impl TraceEvent {
    /// Event for a freshly started operation
    pub fn started(handle: &OperationHandle) -> Self {
        Self::Started {
            operation_id: handle.id.clone(),
            operation: handle.operation.clone(),
            input: handle.input.clone(),
        }
    }

    /// Event closing `handle` successfully
    pub fn completed(handle: OperationHandle, output: Value) -> Self {
        let duration_ms = duration_ms(handle.elapsed());
        Self::Completed {
            operation_id: handle.id,
            operation: handle.operation,
            duration_ms,
            input: handle.input,
            output,
        }
    }

    /// Event closing `handle` with an error
    pub fn errored(handle: OperationHandle, error: OperationError, resolution: &str) -> Self {
        let duration_ms = duration_ms(handle.elapsed());
        Self::Errored {
            operation_id: handle.id,
            operation: handle.operation,
            duration_ms,
            input: handle.input,
            error: error.message,
            error_type: error.kind,
            resolution: resolution.to_string(),
        }
    }

    /// Id of the operation this event belongs to
    pub fn operation_id(&self) -> &str {
        match self {
            Self::Started { operation_id, .. }
            | Self::Completed { operation_id, .. }
            | Self::Errored { operation_id, .. } => operation_id,
        }
    }

    /// Name of the operation this event belongs to
    pub fn operation(&self) -> &str {
        match self {
            Self::Started { operation, .. }
            | Self::Completed { operation, .. }
            | Self::Errored { operation, .. } => operation,
        }
    }

    /// Whether this event closes an operation
    pub fn is_close(&self) -> bool {
        !matches!(self, Self::Started { .. })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Records start, completion and failure of named operations
pub trait OperationTracer: Send + Sync + Debug {
    /// Open an operation
    fn start_operation(&self, name: &str, input: Value) -> OperationHandle;

    /// Close an operation successfully
    fn complete_operation(&self, handle: OperationHandle, output: Value);

    /// Close an operation with an error and a note on how it was handled
    fn error_operation(&self, handle: OperationHandle, error: OperationError, resolution: &str);
}
