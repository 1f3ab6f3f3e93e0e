/*!
 * Provider implementations for the translation services.
 *
 * Two seams live here:
 * - `TextTranslator`: a single-leg translation into one language (Google, mock)
 * - `TranslationGateway` implementations that produce a whole round trip
 *   (remote backend, mock)
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for single-leg text translators
///
/// Implementations translate text into one target language and are composed
/// into round trips by `RoundTripGateway`.
#[async_trait]
pub trait TextTranslator: Send + Sync + Debug {
    /// Translate `text` into `target_language` (ISO 639-1 code)
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;
}

pub mod backend;
pub mod google;
pub mod mock;
