/*!
 * Error types for the roundtrip application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend answered but produced nothing usable
    #[error("Empty translation result: {0}")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Short, stable name of the error variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed(_) => "RequestFailed",
            Self::ParseError(_) => "ParseError",
            Self::ApiError { .. } => "ApiError",
            Self::ConnectionError(_) => "ConnectionError",
            Self::EmptyResponse(_) => "EmptyResponse",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the step state store and the orchestrator
#[derive(Error, Debug)]
pub enum OrchestrationError {
    /// Blank input text or a repeat count outside the configured bounds
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The gateway failed on the given 1-based step; the run stopped there
    #[error("Translation step {step} failed: {source}")]
    GatewayFailure {
        /// 1-based id of the failing step
        step: usize,
        /// Underlying gateway error
        #[source]
        source: ProviderError,
    },

    /// A transition was requested that the current run state does not allow
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A mutation was attempted on behalf of a run that has been reset or replaced
    #[error("Stale run generation {expected} (current generation is {current})")]
    StaleGeneration {
        /// Generation the caller believed was active
        expected: u64,
        /// Generation actually active in the store
        current: u64,
    },
}

impl OrchestrationError {
    /// Short, stable name of the error variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::GatewayFailure { .. } => "GatewayFailure",
            Self::InvalidState(_) => "InvalidState",
            Self::StaleGeneration { .. } => "StaleGeneration",
        }
    }

    /// Whether this error only reflects a superseded run
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleGeneration { .. })
    }

    /// 1-based id of the failing step, for gateway failures
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            Self::GatewayFailure { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the orchestrator
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
