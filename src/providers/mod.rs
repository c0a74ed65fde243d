/*!
 * Provider implementations for LLM inference services.
 *
 * This module contains client implementations for the judgment models:
 * - Ollama: Local LLM server (default)
 * - Anthropic: Anthropic API integration
 * - Mock: scripted provider for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Provider-agnostic completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Full prompt text
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of output tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new request with the default sampling parameters
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output budget
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Provider-agnostic completion response
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Raw generated text, possibly with reasoning markup
    pub text: String,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the provider
    pub completion_tokens: Option<u64>,
}

impl CompletionResponse {
    /// Create a response carrying only text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider and that `model` is usable
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
