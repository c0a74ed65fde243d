/*!
 * Structured judgments from an LLM provider.
 *
 * A judgment is one completion call bounded by a timeout. Reasoning blocks
 * (`<think>...</think>`) are removed and the first JSON object in the answer
 * is decoded into the caller's type. Every failure comes back as a
 * `JudgeError`; callers map it to their own neutral default.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::JudgeError;
use crate::providers::{CompletionRequest, Provider};

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Opening braces tried before giving up on an answer
const MAX_JSON_CANDIDATES: usize = 16;

/// Remove reasoning blocks and surrounding whitespace
pub fn strip_reasoning(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

/// Decode the first JSON object of type `T` found in `text`
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, JudgeError> {
    let text = strip_reasoning(text);
    if text.is_empty() {
        return Err(JudgeError::Empty);
    }

    if let Some(fenced) = JSON_FENCE.captures(&text).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<T>(fenced.as_str()) {
            return Ok(value);
        }
    }

    // Stream-decode from each opening brace so trailing prose is ignored
    for (start, _) in text.match_indices('{').take(MAX_JSON_CANDIDATES) {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<T>();
        if let Some(Ok(value)) = stream.next() {
            return Ok(value);
        }
    }

    let preview: String = text.chars().take(120).collect();
    Err(JudgeError::Malformed(preview))
}

/// LLM-backed judge bound to one model
#[derive(Debug, Clone)]
pub struct Judge {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl Judge {
    /// Judge using `model` with temperature 0.1 and a 180 s call bound
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            timeout: Duration::from_secs(180),
        }
    }

    /// Default sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Upper bound on each call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same provider and settings, different model
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Free-text answer at the default temperature
    pub async fn ask_text(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError> {
        self.ask_text_at(prompt, self.temperature, max_tokens).await
    }

    /// Free-text answer at `temperature`, reasoning removed
    pub async fn ask_text_at(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String, JudgeError> {
        let request = CompletionRequest::new(self.model.clone(), prompt)
            .temperature(temperature)
            .max_tokens(max_tokens);

        debug!("Judgment prompt ({} chars) to {}", prompt.chars().count(), self.model);

        let response = match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("{} call failed: {}", self.provider.name(), e);
                return Err(JudgeError::Provider(e));
            }
            Err(_) => {
                warn!("{} call timed out after {}s", self.provider.name(), self.timeout.as_secs());
                return Err(JudgeError::Timeout(self.timeout.as_secs()));
            }
        };

        let text = strip_reasoning(&response.text);
        debug!("Judgment answer: {}", text.chars().take(200).collect::<String>());
        if text.is_empty() {
            return Err(JudgeError::Empty);
        }
        Ok(text)
    }

    /// Structured answer decoded into `T`
    pub async fn ask<T: DeserializeOwned>(&self, prompt: &str, max_tokens: u32) -> Result<T, JudgeError> {
        let text = self.ask_text(prompt, max_tokens).await?;
        parse_structured(&text).inspect_err(|e| debug!("Unusable judgment: {}", e))
    }
}
