use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::knowledge::{KnowledgeBase, WikipediaClient};
use crate::providers::Provider;
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::verification::aggregate::ScoreWeights;
use crate::verification::glossary::{Glossary, GlossaryEntry};
use crate::verification::model::VerifyModule;

/// Application configuration module
/// This module handles loading, validating and saving the verification
/// settings. Every field has a default so a partial `conf.json` is valid.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the original text (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language of the translation (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Verification settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Knowledge base used for corroboration and enrichment
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Terminology pairs; when absent, the built-in mathematics glossary for
    /// Korean targets and no glossary otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary: Option<Vec<GlossaryEntry>>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider backing the judgments
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationProvider {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Anthropic messages API
    Anthropic,
}

impl VerificationProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    /// Lowercase identifier used in `available_providers`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for VerificationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Connection settings for one provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model used for formula, semantic and logic judgments
    #[serde(default)]
    pub model: String,

    /// API key (Anthropic only)
    #[serde(default)]
    pub api_key: String,

    /// Service URL
    #[serde(default)]
    pub endpoint: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries for server errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ProviderConfig {
    /// Provider config with defaults for `provider`
    pub fn new(provider: VerificationProvider) -> Self {
        let (model, endpoint) = match provider {
            VerificationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint()),
            VerificationProvider::Anthropic => (default_anthropic_model(), default_anthropic_endpoint()),
        };
        Self {
            provider_type: provider.as_str().to_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Verification settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerificationConfig {
    /// Active provider
    #[serde(default)]
    pub provider: VerificationProvider,

    /// Configured providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Model for research and enrichment judgments (defaults to the main model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_model: Option<String>,

    /// Enabled modules, in run order
    #[serde(default = "default_modules")]
    pub modules: Vec<VerifyModule>,

    /// Aggregation weights
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Sampling temperature for judgments
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single judgment call, in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Minimum interval between knowledge-base lookups
    #[serde(default = "default_research_interval_ms")]
    pub research_interval_ms: u64,

    /// Pause between verification modules
    #[serde(default = "default_module_interval_ms")]
    pub module_interval_ms: u64,

    /// Originals shorter than this are not enriched
    #[serde(default = "default_min_enrich_chars")]
    pub min_enrich_chars: usize,

    /// Appended to a concept when its first lookup misses
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            provider: VerificationProvider::default(),
            available_providers: default_available_providers(),
            research_model: None,
            modules: default_modules(),
            weights: ScoreWeights::default(),
            temperature: default_temperature(),
            call_timeout_secs: default_call_timeout_secs(),
            research_interval_ms: default_research_interval_ms(),
            module_interval_ms: default_module_interval_ms(),
            min_enrich_chars: default_min_enrich_chars(),
            domain_suffix: default_domain_suffix(),
        }
    }
}

impl VerificationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider: VerificationProvider) -> Option<&ProviderConfig> {
        self.available_providers
            .iter()
            .find(|p| p.provider_type.eq_ignore_ascii_case(provider.as_str()))
    }

    /// Mutable access to the active provider configuration, inserting defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider = self.provider;
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type.eq_ignore_ascii_case(provider.as_str()))
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .filter(|p| !p.model.is_empty())
            .map(|p| p.model.clone())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).model)
    }

    /// Model for research and enrichment judgments
    pub fn get_research_model(&self) -> String {
        self.research_model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.get_model())
    }

    /// API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .filter(|p| !p.endpoint.is_empty())
            .map(|p| p.endpoint.clone())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).endpoint)
    }
}

/// Knowledge-base (MediaWiki) settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KnowledgeBaseConfig {
    /// `api.php` endpoint
    #[serde(default = "default_kb_endpoint")]
    pub endpoint: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_kb_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: default_kb_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_kb_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(VerificationProvider::Ollama),
        ProviderConfig::new(VerificationProvider::Anthropic),
    ]
}

fn default_modules() -> Vec<VerifyModule> {
    VerifyModule::ALL.to_vec()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.1
}

fn default_call_timeout_secs() -> u64 {
    180
}

fn default_research_interval_ms() -> u64 {
    1000
}

fn default_module_interval_ms() -> u64 {
    300
}

fn default_min_enrich_chars() -> usize {
    100
}

fn default_domain_suffix() -> String {
    "mathematics".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:14b".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_kb_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    format!("vertrans/{} (translation verification)", env!("CARGO_PKG_VERSION"))
}

fn default_kb_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load `path`, or write and return the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .context(format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, json)
            .context(format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.source_language)
            .context("Invalid source language")?;
        crate::language_utils::validate_language_code(&self.target_language)
            .context("Invalid target language")?;

        if self.verification.provider == VerificationProvider::Anthropic
            && self.verification.get_api_key().is_empty()
        {
            return Err(anyhow!("API key is required for Anthropic provider"));
        }

        self.verification.weights.validate()?;

        if let Some(entries) = &self.glossary {
            if let Some(entry) = entries.iter().find(|e| e.source.trim().is_empty() || e.target.trim().is_empty()) {
                return Err(anyhow!("Glossary entries need both terms: {:?}", entry));
            }
        }

        if self.knowledge_base.timeout_secs == 0 || self.verification.call_timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be greater than zero"));
        }

        Ok(())
    }

    /// Glossary used by the semantic check
    pub fn glossary(&self) -> Glossary {
        match &self.glossary {
            Some(entries) => Glossary::from_entries(entries.clone()),
            None if crate::language_utils::normalize_to_part2t(&self.target_language)
                .is_ok_and(|code| code == "kor") =>
            {
                Glossary::builtin_mathematics()
            }
            None => Glossary::default(),
        }
    }

    /// Build the configured LLM provider
    pub fn build_provider(&self) -> Result<Arc<dyn Provider>> {
        let settings = self
            .verification
            .get_active_provider_config()
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(self.verification.provider));
        let endpoint = self.verification.get_endpoint();

        let provider: Arc<dyn Provider> = match self.verification.provider {
            VerificationProvider::Ollama => Arc::new(Ollama::new(
                endpoint,
                settings.timeout_secs,
                settings.max_retries,
                settings.retry_backoff_ms,
            )),
            VerificationProvider::Anthropic => {
                if settings.api_key.is_empty() {
                    return Err(anyhow!("API key is required for Anthropic provider"));
                }
                Arc::new(Anthropic::new(settings.api_key, endpoint, settings.timeout_secs))
            }
        };
        Ok(provider)
    }

    /// Build the configured knowledge base
    pub fn build_knowledge_base(&self) -> Arc<dyn KnowledgeBase> {
        Arc::new(WikipediaClient::new(
            self.knowledge_base.endpoint.clone(),
            &self.knowledge_base.user_agent,
            self.knowledge_base.timeout_secs,
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            verification: VerificationConfig::default(),
            knowledge_base: KnowledgeBaseConfig::default(),
            glossary: None,
            log_level: LogLevel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaultConfig_shouldValidate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_language, "ko");
        assert_eq!(config.verification.get_model(), "qwen3:14b");
        assert_eq!(config.verification.modules.len(), 4);
    }

    #[test]
    fn test_partialJson_shouldFillDefaults() {
        let config: Config = serde_json::from_str(r#"{"target_language": "ja"}"#).unwrap();
        assert_eq!(config.source_language, "en");
        assert_eq!(config.verification.research_interval_ms, 1000);
        assert_eq!(config.verification.module_interval_ms, 300);
        assert_eq!(config.knowledge_base.timeout_secs, 10);
        assert!(config.glossary.is_none());
    }

    #[test]
    fn test_validate_withAnthropicAndNoKey_shouldFail() {
        let mut config = Config::default();
        config.verification.provider = VerificationProvider::Anthropic;
        assert!(config.validate().is_err());

        config.verification.active_provider_config_mut().api_key = "sk-test".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_withInvalidLanguage_shouldFail() {
        let config = Config {
            target_language: "klingon".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_withZeroWeights_shouldFail() {
        let mut config = Config::default();
        config.verification.weights = ScoreWeights {
            formula: 0.0,
            semantic: 0.0,
            logic: 0.0,
            research: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknownModuleName_shouldFailToParse() {
        let result: Result<Config, _> =
            serde_json::from_str(r#"{"verification": {"modules": ["formula", "style"]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_researchModel_shouldFallBackToMainModel() {
        let mut config = VerificationConfig::default();
        assert_eq!(config.get_research_model(), config.get_model());

        config.research_model = Some("deepseek-r1:7b".to_string());
        assert_eq!(config.get_research_model(), "deepseek-r1:7b");
    }

    #[test]
    fn test_providerFromStr_shouldParseCaseInsensitively() {
        assert_eq!("Anthropic".parse::<VerificationProvider>().unwrap(), VerificationProvider::Anthropic);
        assert!("openai".parse::<VerificationProvider>().is_err());
    }

    #[test]
    fn test_customGlossary_shouldReplaceBuiltin() {
        let config: Config =
            serde_json::from_str(r#"{"glossary": [{"source": "sheaf", "target": "층"}]}"#).unwrap();
        assert_eq!(config.glossary().len(), 1);
        assert!(Config::default().glossary().len() > 50);
    }

    #[test]
    fn test_glossary_withNonKoreanTarget_shouldBeEmpty() {
        let config = Config {
            target_language: "ja".to_string(),
            ..Config::default()
        };
        assert!(config.glossary().is_empty());

        let config = Config {
            target_language: "kor".to_string(),
            ..Config::default()
        };
        assert!(config.glossary().len() > 50);
    }

    #[test]
    fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.json");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(created.target_language, loaded.target_language);
        assert_eq!(loaded.verification.provider, VerificationProvider::Ollama);
    }
}
