/*!
 * Translation gateway seam.
 *
 * A gateway takes text and returns a full round trip: the text rendered in
 * some intermediate language and then translated back into the target
 * language. How it gets there (remote backend, local composition of two
 * translator calls, scripted mock) is up to the implementation.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

use super::step::StepOutput;

/// Result of one round trip through an intermediate language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// Text that was submitted
    pub original_text: String,
    /// Rendering in the intermediate language
    pub intermediate_text: String,
    /// Code of the intermediate language
    pub intermediate_language: String,
    /// Translation back into the target language
    pub final_text: String,
}

impl From<RoundTrip> for StepOutput {
    fn from(round_trip: RoundTrip) -> Self {
        Self {
            intermediate_text: round_trip.intermediate_text,
            intermediate_language: round_trip.intermediate_language,
            final_text: round_trip.final_text,
        }
    }
}

/// Something that can perform a round trip translation
#[async_trait]
pub trait TranslationGateway: Send + Sync + Debug {
    /// Translate `text` through an intermediate language and back
    async fn translate(&self, text: &str) -> Result<RoundTrip, ProviderError>;
}
