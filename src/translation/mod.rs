/*!
 * Multi-step round-trip translation.
 *
 * This module contains the run model and the machinery driving it. It is
 * split into several submodules:
 *
 * - `step`: Run and step records with their statuses
 * - `store`: Generation-guarded step state store
 * - `gateway`: The round-trip translation seam
 * - `round_trip`: Gateway composed from a single-leg translator
 * - `orchestrator`: The sequential run loop
 */

// Re-export main types for easier usage
pub use self::gateway::{RoundTrip, TranslationGateway};
pub use self::orchestrator::{Orchestrator, OrchestratorConfig, RunOutcome};
pub use self::round_trip::RoundTripGateway;
pub use self::step::{Run, RunFailure, RunStatus, StepOutput, StepStatus, TranslationStep};
pub use self::store::StepStateStore;

// Submodules
pub mod gateway;
pub mod orchestrator;
pub mod round_trip;
pub mod step;
pub mod store;
