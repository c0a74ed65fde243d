use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Extra `num_predict` budget for models that spend tokens on a thinking block
const THINKING_TOKEN_BUDGET: u32 = 3000;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Top-k sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    /// Penalty applied to repeated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_penalty: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Installed model list from `/api/tags`
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: Some(false),
        }
    }

    /// Set the sampling parameters used for verification judgments
    pub fn judgment_options(mut self, temperature: f32, num_predict: u32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
            top_p: Some(0.9),
            top_k: Some(40),
            repeat_penalty: Some(1.1),
            num_predict: Some(num_predict),
        });
        self
    }
}

impl From<&CompletionRequest> for GenerationRequest {
    fn from(request: &CompletionRequest) -> Self {
        let mut budget = request.max_tokens;
        if request.model.to_lowercase().contains("qwen3") {
            budget += THINKING_TOKEN_BUDGET;
        }
        GenerationRequest::new(request.model.clone(), request.prompt.clone())
            .judgment_options(request.temperature, budget)
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    ///
    /// `timeout_secs` bounds every HTTP call; judgments on large local models
    /// can take minutes, so the default in the config is generous.
    pub fn new(url: impl Into<String>, timeout_secs: u64, max_retries: u32, backoff_base_ms: u64) -> Self {
        let url = url.into();
        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", url.trim_end_matches('/'))
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response
                            .text()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
                        return Self::parse_generation(&body);
                    } else if status.is_server_error() {
                        // Server error - can retry
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            error_text,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    } else {
                        // Client error - don't retry
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Ollama API error ({}): {}", status, error_text);
                        if status.as_u16() == 404 {
                            return Err(ProviderError::ModelNotFound(error_text));
                        }
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }
                }
                Err(e) => {
                    // Timeouts are not retried; the caller already budgeted for one call
                    if e.is_timeout() {
                        return Err(ProviderError::RequestFailed(format!("timed out: {}", e)));
                    }
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// Parse a `/api/generate` body, accepting both a single object and
    /// JSONL output from a server that ignored `stream: false`.
    pub(crate) fn parse_generation(body: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(parsed);
        }

        let mut full_response = String::new();
        let mut last: Option<GenerationResponse> = None;
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            if let Ok(chunk) = serde_json::from_str::<GenerationResponse>(line) {
                full_response.push_str(&chunk.response);
                last = Some(chunk);
            }
        }

        match last {
            Some(mut final_chunk) => {
                final_chunk.response = full_response;
                final_chunk.done = true;
                Ok(final_chunk)
            }
            None => {
                let preview: String = body.chars().take(500).collect();
                error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
                Err(ProviderError::ParseError("response contains invalid JSON".to_string()))
            }
        }
    }

    /// List the models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Cannot connect to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Failed to list models".to_string(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let generation = GenerationRequest::from(&request);
        debug!("Ollama generate with model {} ({} prompt chars)", request.model, request.prompt.len());
        let response = self.generate(&generation).await?;

        Ok(CompletionResponse {
            text: response.response.trim().to_string(),
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        let models = self.list_models().await?;
        if models.iter().any(|m| m == model) {
            Ok(())
        } else {
            let available: Vec<&str> = models.iter().take(5).map(String::as_str).collect();
            Err(ProviderError::ModelNotFound(format!(
                "'{}' not found. Available: {}",
                model,
                available.join(", ")
            )))
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
