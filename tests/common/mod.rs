/*!
 * Common test utilities for the roundtrip test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Notify;

use roundtrip::errors::ProviderError;
use roundtrip::providers::mock::MockGateway;
use roundtrip::telemetry::RecordingTracer;
use roundtrip::translation::{Orchestrator, OrchestratorConfig, RoundTrip, TranslationGateway};

/// Route library logs through env_logger when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Orchestrator with no step delay over `gateway`, plus the tracer it records into
pub fn orchestrator_with<G>(gateway: G) -> (Orchestrator, RecordingTracer)
where
    G: TranslationGateway + 'static,
{
    init_logging();
    let tracer = RecordingTracer::new();
    let orchestrator = Orchestrator::new(
        Arc::new(gateway),
        Arc::new(tracer.clone()),
        OrchestratorConfig::immediate(),
    );
    (orchestrator, tracer)
}

/// Gateway that parks every call until the test releases it.
///
/// Lets a test observe the run while a step is in flight, reset it, and then
/// deliver the late response.
#[derive(Debug, Clone)]
pub struct GatedGateway {
    entered: Arc<Notify>,
    released: Arc<Notify>,
    inner: MockGateway,
}

impl GatedGateway {
    /// Gate a working mock
    pub fn new() -> Self {
        Self::wrapping(MockGateway::working())
    }

    /// Gate an arbitrary mock
    pub fn wrapping(inner: MockGateway) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            released: Arc::new(Notify::new()),
            inner,
        }
    }

    /// Wait until a call is parked at the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked call through
    pub fn release(&self) {
        self.released.notify_one();
    }

    /// Calls that reached the inner mock
    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl TranslationGateway for GatedGateway {
    async fn translate(&self, text: &str) -> Result<RoundTrip, ProviderError> {
        self.entered.notify_one();
        self.released.notified().await;
        self.inner.translate(text).await
    }
}
