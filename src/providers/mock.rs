/*!
 * Mock provider implementations for testing and offline runs.
 *
 * `MockGateway` simulates a round-trip backend with different behaviours:
 * - `MockGateway::working()` - Always succeeds, tagging the text with the languages
 * - `MockGateway::fixed(..)` - Always returns the same round trip
 * - `MockGateway::fail_on_call(n)` - Fails on the nth call only
 * - `MockGateway::failing()` - Always fails with an error
 * - `MockGateway::slow(ms)` - Succeeds after a delay
 * - `MockGateway::empty()` - Answers with an empty final text
 *
 * `MockTranslator` answers single-leg translations with fixed phrases.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::gateway::{RoundTrip, TranslationGateway};

use super::TextTranslator;

/// Intermediate language used by the working mock
pub const MOCK_INTERMEDIATE_LANGUAGE: &str = "fr";

/// Behavior mode for the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds, prefixing the text with the language codes
    Working,
    /// Always returns the given round trip fields
    Fixed {
        intermediate_text: String,
        intermediate_language: String,
        final_text: String,
    },
    /// Fails on the given 1-based call, succeeds otherwise
    FailOnCall { call: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds after sleeping
    Slow { delay_ms: u64 },
    /// Returns an empty final text
    Empty,
}

/// Mock gateway for testing orchestration behavior
#[derive(Debug, Clone)]
pub struct MockGateway {
    /// Behavior mode
    behavior: MockBehavior,
    /// Calls made so far, shared between clones
    call_count: Arc<AtomicUsize>,
}

impl MockGateway {
    /// Create a new mock gateway with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock gateway
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always returns the same round trip
    pub fn fixed(
        intermediate_text: impl Into<String>,
        intermediate_language: impl Into<String>,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(MockBehavior::Fixed {
            intermediate_text: intermediate_text.into(),
            intermediate_language: intermediate_language.into(),
            final_text: final_text.into(),
        })
    }

    /// Create a mock that fails on the given 1-based call
    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall { call })
    }

    /// Create a failing mock gateway that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that returns an empty final text
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Round trip produced by the working behaviour
    pub fn tagged_round_trip(text: &str) -> RoundTrip {
        RoundTrip {
            original_text: text.to_string(),
            intermediate_text: format!("[{}] {}", MOCK_INTERMEDIATE_LANGUAGE, text),
            intermediate_language: MOCK_INTERMEDIATE_LANGUAGE.to_string(),
            final_text: format!("[ja] {}", text),
        }
    }
}

#[async_trait]
impl TranslationGateway for MockGateway {
    async fn translate(&self, text: &str) -> Result<RoundTrip, ProviderError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        match &self.behavior {
            MockBehavior::Working => Ok(Self::tagged_round_trip(text)),

            MockBehavior::Fixed {
                intermediate_text,
                intermediate_language,
                final_text,
            } => Ok(RoundTrip {
                original_text: text.to_string(),
                intermediate_text: intermediate_text.clone(),
                intermediate_language: intermediate_language.clone(),
                final_text: final_text.clone(),
            }),

            MockBehavior::FailOnCall { call: failing_call } => {
                if call == *failing_call {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure on call {}", call),
                    })
                } else {
                    Ok(Self::tagged_round_trip(text))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Self::tagged_round_trip(text))
            }

            MockBehavior::Empty => Ok(RoundTrip {
                original_text: text.to_string(),
                intermediate_text: String::new(),
                intermediate_language: MOCK_INTERMEDIATE_LANGUAGE.to_string(),
                final_text: String::new(),
            }),
        }
    }
}

/// Single-leg translator answering with fixed phrases
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    failing: bool,
}

impl MockTranslator {
    /// Create a translator that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a translator that always errors
    pub fn failing() -> Self {
        Self { failing: true }
    }

    /// Phrase returned for a target language
    pub fn phrase_for(text: &str, target_language: &str) -> String {
        match target_language {
            "en" => "Hello world".to_string(),
            "es" => "Hola mundo".to_string(),
            "fr" => "Bonjour le monde".to_string(),
            "de" => "Hallo Welt".to_string(),
            "ja" => "こんにちは世界".to_string(),
            other => format!("Translated to {}: {}", other, text),
        }
    }
}

#[async_trait]
impl TextTranslator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        if self.failing {
            return Err(ProviderError::RequestFailed(format!(
                "Simulated translation failure into {}",
                target_language
            )));
        }
        Ok(Self::phrase_for(text, target_language))
    }
}
