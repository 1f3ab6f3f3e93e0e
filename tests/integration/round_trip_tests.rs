/*!
 * Integration tests running the orchestrator over the local round-trip gateway.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use roundtrip::errors::ProviderError;
use roundtrip::language_catalog::{Language, LanguageCatalog};
use roundtrip::providers::TextTranslator;
use roundtrip::providers::mock::MockTranslator;
use roundtrip::translation::round_trip::DEFAULT_TARGET_LANGUAGE;
use roundtrip::translation::{RoundTripGateway, RunStatus, StepStatus};

use crate::common;

/// Translator that remembers every leg it was asked for
#[derive(Debug, Default, Clone)]
struct LegRecorder {
    legs: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl TextTranslator for LegRecorder {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        self.legs.lock().push((text.to_string(), target_language.to_string()));
        Ok(format!("{}:{}", target_language, text))
    }
}

fn single_language_catalog(code: &str, name: &str) -> LanguageCatalog {
    LanguageCatalog::from_languages(vec![Language {
        code: code.to_string(),
        name: name.to_string(),
        native_name: name.to_string(),
        countries: Vec::new(),
        is_official: true,
    }])
}

#[tokio::test]
async fn test_mockTranslatorRun_shouldEndInJapanesePhrase() {
    let gateway = RoundTripGateway::new(
        Arc::new(MockTranslator::new()),
        LanguageCatalog::default(),
        DEFAULT_TARGET_LANGUAGE,
    )
    .with_seed(3);
    let (orchestrator, tracer) = common::orchestrator_with(gateway);

    let outcome = orchestrator.run("Hello", 2).await.unwrap();

    assert_eq!(outcome.final_text(), Some("こんにちは世界"));
    let run = orchestrator.snapshot();
    assert_eq!(run.overall_status, RunStatus::Completed);
    assert_eq!(run.steps[1].input_text, "こんにちは世界");
    for step in &run.steps {
        assert!(LanguageCatalog::default().get(&step.intermediate_language).is_some());
        assert_eq!(step.status, StepStatus::Completed);
    }
    assert!(tracer.unbalanced_operations().is_empty());
}

#[tokio::test]
async fn test_roundTrip_shouldTranslateThroughThenBack() {
    let recorder = LegRecorder::default();
    let gateway = RoundTripGateway::new(
        Arc::new(recorder.clone()),
        single_language_catalog("ko", "Korean"),
        "de",
    );
    let (orchestrator, _tracer) = common::orchestrator_with(gateway);

    let outcome = orchestrator.run("Hi", 2).await.unwrap();

    let legs = recorder.legs.lock().clone();
    assert_eq!(
        legs,
        vec![
            ("Hi".to_string(), "ko".to_string()),
            ("ko:Hi".to_string(), "de".to_string()),
            ("de:ko:Hi".to_string(), "ko".to_string()),
            ("ko:de:ko:Hi".to_string(), "de".to_string()),
        ]
    );
    assert_eq!(outcome.final_text(), Some("de:ko:de:ko:Hi"));
    let first = &orchestrator.snapshot().steps[0];
    assert_eq!(first.intermediate_language, "ko");
    assert_eq!(first.intermediate_text, "ko:Hi");
}

#[tokio::test]
async fn test_failingTranslator_shouldFailFirstStep() {
    let gateway = RoundTripGateway::new(
        Arc::new(MockTranslator::failing()),
        LanguageCatalog::default(),
        DEFAULT_TARGET_LANGUAGE,
    );
    let (orchestrator, _tracer) = common::orchestrator_with(gateway);

    let error = orchestrator.run("Hello", 3).await.unwrap_err();

    assert_eq!(error.failed_step(), Some(1));
    let run = orchestrator.snapshot();
    assert_eq!(run.steps[0].status, StepStatus::Failed);
    assert!(run.failure.unwrap().reason.contains("Simulated translation failure"));
}
