/*!
 * Intermediate language catalogue and ISO language code utilities.
 *
 * The catalogue lists the languages a round trip may pass through. It is
 * loaded from a JSON file of the form `{ "languages": [ ... ] }` and falls
 * back to a small built-in list when the file is missing or unreadable.
 */

use anyhow::{Context, Result, anyhow};
use isolang::Language as IsoLanguage;
use log::{debug, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Code used when the catalogue is empty
pub const FALLBACK_LANGUAGE: &str = "en";

/// One candidate intermediate language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// ISO 639-1 code
    pub code: String,
    /// English name
    pub name: String,
    /// Name in the language itself
    #[serde(default)]
    pub native_name: String,
    /// Countries where the language is spoken
    #[serde(default)]
    pub countries: Vec<String>,
    /// Whether the language has official status
    #[serde(default)]
    pub is_official: bool,
}

impl Language {
    fn builtin(code: &str, name: &str, native_name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            countries: Vec::new(),
            is_official: true,
        }
    }
}

static DEFAULT_LANGUAGES: Lazy<Vec<Language>> = Lazy::new(|| {
    vec![
        Language::builtin("en", "English", "English"),
        Language::builtin("es", "Spanish", "Español"),
        Language::builtin("fr", "French", "Français"),
        Language::builtin("de", "German", "Deutsch"),
    ]
});

/// On-disk layout of the catalogue file
#[derive(Debug, Serialize, Deserialize)]
struct LanguageData {
    languages: Vec<Language>,
}

/// Set of languages a round trip can pass through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.clone(),
        }
    }
}

impl LanguageCatalog {
    /// Build a catalogue from a list, dropping entries with invalid codes
    pub fn from_languages(languages: Vec<Language>) -> Self {
        let languages = languages
            .into_iter()
            .filter(|lang| match validate_language_code(&lang.code) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping catalogue entry '{}': {}", lang.name, e);
                    false
                }
            })
            .collect();
        Self { languages }
    }

    /// Load a catalogue file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open language file: {}", path.display()))?;
        let data: LanguageData = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse language file: {}", path.display()))?;

        let catalog = Self::from_languages(data.languages);
        debug!("Loaded {} languages from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Load a catalogue file, falling back to the built-in list on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                warn!("Language file {} has no usable entries, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{:#}, using default languages", e);
                Self::default()
            }
        }
    }

    /// All languages
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Number of languages
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Whether the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Look up a language by code
    pub fn get(&self, code: &str) -> Option<&Language> {
        self.languages
            .iter()
            .find(|lang| language_codes_match(&lang.code, code))
    }

    /// Pick a random language code, or `FALLBACK_LANGUAGE` when empty
    pub fn choose_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.languages
            .choose(rng)
            .map(|lang| lang.code.as_str())
            .unwrap_or(FALLBACK_LANGUAGE)
    }
}

/// Check that a code is a known ISO 639-1 or ISO 639-3 code
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 where one exists
pub fn normalize_language_code(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => code1.trim().eq_ignore_ascii_case(code2.trim()),
    }
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}

fn lookup(code: &str) -> Option<IsoLanguage> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => IsoLanguage::from_639_1(&normalized),
        3 => IsoLanguage::from_639_3(&normalized),
        _ => None,
    }
}
