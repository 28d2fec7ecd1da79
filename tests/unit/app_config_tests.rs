/*!
 * Tests for app configuration
 */

use dualsub::app_config::{
    create_default_config_file, CatalogsConfig, Config, LogLevel, OutputConfig, StorageBackend,
};

use crate::common;

fn valid_config() -> Config {
    Config {
        main_language: "en".to_string(),
        translation_language: "es".to_string(),
        merge_threshold_ms: 500,
        max_translation_candidates: 4,
        catalogs: CatalogsConfig {
            primary_endpoint: "http://primary.local".to_string(),
            fallback_endpoint: "http://fallback.local".to_string(),
            fallback_landing_url: "http://fallback.local/landing".to_string(),
            japanese_endpoint: None,
        },
        output: OutputConfig::default(),
        log_level: LogLevel::Info,
    }
}

/// Test default config creation and reload round trip
#[test]
fn test_create_default_config_file_withPath_shouldRoundTrip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let created = create_default_config_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.main_language, created.main_language);
    assert_eq!(loaded.translation_language, created.translation_language);
    assert_eq!(loaded.merge_threshold_ms, 500);
    assert_eq!(loaded.max_translation_candidates, 4);
    assert_eq!(loaded.log_level, LogLevel::Info);
}

/// Test omitted fields take their defaults
#[test]
fn test_from_file_withMinimalJson_shouldApplyDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    let minimal = r#"{
        "main_language": "en",
        "translation_language": "fr",
        "catalogs": {
            "primary_endpoint": "http://primary.local",
            "fallback_endpoint": "http://fallback.local",
            "fallback_landing_url": "http://fallback.local/landing"
        }
    }"#;
    std::fs::write(&path, minimal).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.merge_threshold_ms, 500);
    assert_eq!(config.max_translation_candidates, 4);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.catalogs.japanese_endpoint, None);
    assert_eq!(config.output.storage, StorageBackend::Local);
    assert!(!config.output.directory.is_empty());
}

/// Test validation accepts a sane configuration
#[test]
fn test_validate_withValidConfig_shouldPass() {
    assert!(valid_config().validate().is_ok());
}

/// Test validation rejects unusable language codes
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = valid_config();
    config.main_language = "klingon".to_string();
    assert!(config.validate().is_err());
}

/// Test validation rejects a zero merge threshold
#[test]
fn test_validate_withZeroThreshold_shouldFail() {
    let mut config = valid_config();
    config.merge_threshold_ms = 0;
    assert!(config.validate().is_err());
}

/// Test validation rejects zero translation candidates
#[test]
fn test_validate_withZeroCandidates_shouldFail() {
    let mut config = valid_config();
    config.max_translation_candidates = 0;
    assert!(config.validate().is_err());
}

/// Test validation rejects a missing primary endpoint
#[test]
fn test_validate_withEmptyPrimaryEndpoint_shouldFail() {
    let mut config = valid_config();
    config.catalogs.primary_endpoint = String::new();
    assert!(config.validate().is_err());
}
