/*!
 * Mock provider implementation for testing.
 *
 * The mock answers prompts from a script of `(needle, response)` rules: the
 * first rule whose needle occurs in the prompt wins. Other behaviors simulate
 * outages, empty answers, intermittent failures and slow responses.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Answers from the script
    Scripted,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Answers from the script after a delay (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing verification behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Ordered answer rules
    rules: Vec<(String, String)>,
    /// Answer when no rule matches
    fallback: String,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, in order
    received: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            rules: Vec::new(),
            fallback: String::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a scripted provider with no rules (every prompt gets the fallback)
    pub fn scripted() -> Self {
        Self::new(MockBehavior::Scripted)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Answer `response` to any prompt containing `needle`
    pub fn on(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Answer used when no rule matches
    pub fn otherwise(mut self, response: impl Into<String>) -> Self {
        self.fallback = response.into();
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.received.lock().iter().map(|r| r.prompt.clone()).collect()
    }

    /// Number of received prompts containing `needle`
    pub fn prompts_containing(&self, needle: &str) -> usize {
        self.received.lock().iter().filter(|r| r.prompt.contains(needle)).count()
    }

    fn scripted_answer(&self, prompt: &str) -> String {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Scripted => Ok(CompletionResponse::from_text(self.scripted_answer(&request.prompt))),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(CompletionResponse::from_text(self.scripted_answer(&request.prompt)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated provider failure".to_string(),
            )),

            MockBehavior::Empty => Ok(CompletionResponse::from_text("")),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(CompletionResponse::from_text(self.scripted_answer(&request.prompt)))
            }
        }
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
