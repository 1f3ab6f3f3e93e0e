/*!
 * # roundtrip - Multi-step round-trip translation
 *
 * A Rust library that repeatedly sends text through an intermediate language
 * and back, chaining each step's output into the next step's input.
 *
 * ## Features
 *
 * - Sequential runs of 1 to 10 round trips with observable per-step state
 * - Reset at any time; late results of a superseded run are discarded
 * - Balanced operation tracing for every run and step
 * - Gateways for a remote backend, Google Translate, and a local mock
 * - ISO 639-1 and ISO 639-3 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Run model and orchestration:
 *   - `translation::store`: Generation-guarded step state store
 *   - `translation::orchestrator`: Sequential run loop
 *   - `translation::round_trip`: Round trips composed from single-leg translators
 * - `telemetry`: Operation tracer contract and implementations
 * - `language_catalog`: Intermediate language catalogue and ISO code utilities
 * - `providers`: Client implementations for the translation services
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod language_catalog;
pub mod providers;
pub mod telemetry;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, OrchestrationError, ProviderError};
pub use language_catalog::{Language, LanguageCatalog, get_language_name, language_codes_match};
pub use telemetry::{LogTracer, OperationTracer, RecordingTracer};
pub use translation::{Orchestrator, OrchestratorConfig, Run, RunOutcome, TranslationGateway};
