/*!
 * Tracer that writes every operation event through the `log` facade.
 */

use log::{Level, error, info, log_enabled};
use serde_json::Value;

use super::{OperationError, OperationHandle, OperationTracer, TraceEvent};

/// Log target used for operation records
pub const TRACE_TARGET: &str = "roundtrip::trace";

/// Writes start/complete at info level and errors at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl LogTracer {
    /// Create a new log tracer
    pub fn new() -> Self {
        Self
    }

    /// Write an already built event
    pub fn write(event: &TraceEvent) {
        let rendered = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
        match event {
            TraceEvent::Started { operation, .. } => {
                info!(target: TRACE_TARGET, "Start: {} {}", operation, rendered);
            }
            TraceEvent::Completed { operation, duration_ms, .. } => {
                info!(target: TRACE_TARGET, "Complete: {} ({}ms) {}", operation, duration_ms, rendered);
            }
            TraceEvent::Errored { operation, duration_ms, .. } => {
                error!(target: TRACE_TARGET, "Error: {} ({}ms) {}", operation, duration_ms, rendered);
            }
        }
    }
}

impl OperationTracer for LogTracer {
    fn start_operation(&self, name: &str, input: Value) -> OperationHandle {
        let handle = OperationHandle::new(name, input);
        if log_enabled!(target: TRACE_TARGET, Level::Info) {
            Self::write(&TraceEvent::started(&handle));
        }
        handle
    }

    fn complete_operation(&self, handle: OperationHandle, output: Value) {
        if log_enabled!(target: TRACE_TARGET, Level::Info) {
            Self::write(&TraceEvent::completed(handle, output));
        }
    }

    fn error_operation(&self, handle: OperationHandle, error: OperationError, resolution: &str) {
        Self::write(&TraceEvent::errored(handle, error, resolution));
    }
}
