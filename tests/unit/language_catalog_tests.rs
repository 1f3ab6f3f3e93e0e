/*!
 * Tests for loading the intermediate language catalogue
 */

use roundtrip::language_catalog::LanguageCatalog;

use crate::common;

const LANGUAGES_JSON: &str = r#"{
    "languages": [
        { "code": "it", "name": "Italian", "nativeName": "Italiano", "countries": ["IT", "CH"], "isOfficial": true },
        { "code": "ko", "name": "Korean", "nativeName": "한국어", "countries": ["KR"], "isOfficial": true }
    ]
}"#;

#[test]
fn test_load_shouldReadCamelCaseFields() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "languages.json", LANGUAGES_JSON).unwrap();

    let catalog = LanguageCatalog::load(&path).unwrap();

    assert_eq!(catalog.len(), 2);
    let korean = catalog.get("ko").unwrap();
    assert_eq!(korean.native_name, "한국어");
    assert_eq!(korean.countries, vec!["KR".to_string()]);
    assert!(korean.is_official);
}

#[test]
fn test_loadOrDefault_missingFile_shouldUseBuiltInLanguages() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("missing.json");

    let catalog = LanguageCatalog::load_or_default(Some(&path));

    assert_eq!(catalog, LanguageCatalog::default());
}

#[test]
fn test_loadOrDefault_malformedFile_shouldUseBuiltInLanguages() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "languages.json", "[1, 2").unwrap();

    let catalog = LanguageCatalog::load_or_default(Some(&path));

    assert_eq!(catalog.len(), 4);
    assert!(catalog.get("de").is_some());
}

#[test]
fn test_loadOrDefault_emptyList_shouldUseBuiltInLanguages() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "languages.json", r#"{ "languages": [] }"#).unwrap();

    assert_eq!(LanguageCatalog::load_or_default(Some(&path)), LanguageCatalog::default());
    assert_eq!(LanguageCatalog::load_or_default(None), LanguageCatalog::default());
}
