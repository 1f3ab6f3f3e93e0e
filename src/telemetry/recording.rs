/*!
 * In-memory tracer.
 *
 * Keeps every event so callers can inspect or summarize them afterwards,
 * optionally forwarding each one to the log as well.
 */

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::log_tracer::LogTracer;
use super::{OperationError, OperationHandle, OperationTracer, TraceEvent};

/// Tracer that records events in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingTracer {
    events: Arc<Mutex<Vec<TraceEvent>>>,
    forward_to_log: bool,
}

impl RecordingTracer {
    /// Create an empty recording tracer
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write every event to the log
    pub fn with_log_output(mut self) -> Self {
        self.forward_to_log = true;
        self
    }

    /// All events recorded so far, in call order
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Events belonging to operations named `operation`
    pub fn events_for(&self, operation: &str) -> Vec<TraceEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.operation() == operation)
            .cloned()
            .collect()
    }

    /// Number of `start_operation` calls
    pub fn started_count(&self) -> usize {
        self.events.lock().iter().filter(|e| !e.is_close()).count()
    }

    /// Number of close calls of either kind
    pub fn closed_count(&self) -> usize {
        self.events.lock().iter().filter(|e| e.is_close()).count()
    }

    /// Operation ids that were not closed exactly once after being started
    pub fn unbalanced_operations(&self) -> Vec<String> {
        let mut balance: HashMap<String, i64> = HashMap::new();
        let mut order = Vec::new();
        for event in self.events.lock().iter() {
            let entry = balance.entry(event.operation_id().to_string()).or_insert_with(|| {
                order.push(event.operation_id().to_string());
                0
            });
            *entry += if event.is_close() { -1 } else { 1 };
        }
        order
            .into_iter()
            .filter(|id| balance.get(id).copied().unwrap_or_default() != 0)
            .collect()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// One line per closed operation with its outcome and duration
    pub fn summary(&self) -> String {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Completed { operation, duration_ms, .. } => {
                    Some(format!("{:<28} ok     {:>6}ms", operation, duration_ms))
                }
                TraceEvent::Errored { operation, duration_ms, error_type, .. } => {
                    Some(format!("{:<28} error  {:>6}ms  {}", operation, duration_ms, error_type))
                }
                TraceEvent::Started { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn record(&self, event: TraceEvent) {
        if self.forward_to_log {
            LogTracer::write(&event);
        }
        self.events.lock().push(event);
    }
}

impl OperationTracer for RecordingTracer {
    fn start_operation(&self, name: &str, input: Value) -> OperationHandle {
        let handle = OperationHandle::new(name, input);
        self.record(TraceEvent::started(&handle));
        handle
    }

    fn complete_operation(&self, handle: OperationHandle, output: Value) {
        self.record(TraceEvent::completed(handle, output));
    }

    fn error_operation(&self, handle: OperationHandle, error: OperationError, resolution: &str) {
        self.record(TraceEvent::errored(handle, error, resolution));
    }
}
