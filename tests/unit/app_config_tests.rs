/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::fs;

use vertrans::app_config::{Config, LogLevel, ProviderConfig, VerificationProvider};
use vertrans::verification::{VerifierOptions, VerifyModule};

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ko");
    assert_eq!(config.verification.provider, VerificationProvider::Ollama);
    assert_eq!(config.verification.modules, VerifyModule::ALL.to_vec());
    assert_eq!(config.verification.weights.formula, 0.35);
    assert_eq!(config.verification.min_enrich_chars, 100);
    assert_eq!(config.verification.domain_suffix, "mathematics");
    assert_eq!(config.knowledge_base.endpoint, "https://en.wikipedia.org/w/api.php");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that a missing config file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.target_language, "ko");

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.verification.get_model(), config.verification.get_model());
    Ok(())
}

/// Test that a partial config file keeps defaults for everything else
#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"target_language": "ja", "verification": {"modules": ["formula", "logic"], "research_interval_ms": 250}}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.verification.modules, vec![VerifyModule::Formula, VerifyModule::Logic]);
    assert_eq!(config.verification.module_interval_ms, 300);

    let options = VerifierOptions::from(&config);
    assert!(options.is_enabled(VerifyModule::Logic));
    assert!(!options.is_enabled(VerifyModule::Research));
    assert_eq!(options.research_interval.as_millis(), 250);
    Ok(())
}

/// Test that an unreadable config is reported
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ nope")?;
    assert!(Config::load_or_create(&path).is_err());
    assert_eq!(fs::read_to_string(&path)?, "{ nope");
    Ok(())
}

/// Test configuration validation
#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.verification.provider = VerificationProvider::Anthropic;
    assert!(config.validate().is_err());
    config.verification.active_provider_config_mut().api_key = "test-key".to_string();
    assert!(config.validate().is_ok());
}

/// Test provider defaults
#[test]
fn test_providerConfig_new_shouldUseProviderDefaults() {
    let anthropic = ProviderConfig::new(VerificationProvider::Anthropic);
    assert_eq!(anthropic.provider_type, "anthropic");
    assert_eq!(anthropic.endpoint, "https://api.anthropic.com");

    let ollama = ProviderConfig::new(VerificationProvider::Ollama);
    assert_eq!(ollama.endpoint, "http://localhost:11434");
}
