/*!
 * Local round-trip gateway.
 *
 * Composes two calls to a `TextTranslator`: one into a randomly chosen
 * intermediate language from the catalogue, and one back into the target
 * language.
 */

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::language_catalog::LanguageCatalog;
use crate::providers::TextTranslator;

use super::gateway::{RoundTrip, TranslationGateway};

/// Default language every round trip comes back to
pub const DEFAULT_TARGET_LANGUAGE: &str = "ja";

/// Gateway built from a single-leg translator and a language catalogue
#[derive(Debug)]
pub struct RoundTripGateway {
    translator: Arc<dyn TextTranslator>,
    catalog: LanguageCatalog,
    target_language: String,
    rng: Mutex<StdRng>,
}

impl RoundTripGateway {
    /// Create a gateway returning to `target_language`
    pub fn new(
        translator: Arc<dyn TextTranslator>,
        catalog: LanguageCatalog,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            catalog,
            target_language: target_language.into(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Use a seeded generator so the intermediate languages are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Language every round trip comes back to
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    fn pick_intermediate_language(&self) -> String {
        let mut rng = self.rng.lock();
        self.catalog.choose_random(&mut *rng).to_string()
    }
}

#[async_trait]
impl TranslationGateway for RoundTripGateway {
    async fn translate(&self, text: &str) -> Result<RoundTrip, ProviderError> {
        let intermediate_language = self.pick_intermediate_language();
        info!("Translating via intermediate language '{}'", intermediate_language);

        let intermediate_text = self.translator.translate(text, &intermediate_language).await?;
        debug!(
            "Intermediate leg done: {} chars in '{}'",
            intermediate_text.chars().count(),
            intermediate_language
        );

        let final_text = self
            .translator
            .translate(&intermediate_text, &self.target_language)
            .await?;
        debug!(
            "Return leg done: {} chars in '{}'",
            final_text.chars().count(),
            self.target_language
        );

        Ok(RoundTrip {
            original_text: text.to_string(),
            intermediate_text,
            intermediate_language,
            final_text,
        })
    }
}
