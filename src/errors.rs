/*!
 * Error types for the vertrans application.
 *
 * This module contains custom error types for the external collaborators
 * (LLM providers, knowledge base) and for the application layer,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The requested model is not installed on the provider
    #[error("Model not available: {0}")]
    ModelNotFound(String),
}

/// Errors that can occur when querying the knowledge base
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Knowledge base request failed: {0}")]
    RequestFailed(String),

    /// Non-success HTTP status
    #[error("Knowledge base responded with status {0}")]
    Status(u16),

    /// Body could not be decoded
    #[error("Failed to parse knowledge base response: {0}")]
    ParseError(String),
}

/// Errors produced when asking a model for a judgment.
///
/// Every variant means "no result": callers substitute their documented
/// neutral default instead of propagating.
#[derive(Error, Debug)]
pub enum JudgeError {
    /// The provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The call did not finish within the configured bound
    #[error("Judgment timed out after {0} seconds")]
    Timeout(u64),

    /// The model answered with nothing usable
    #[error("Empty response from model")]
    Empty,

    /// The answer did not contain the expected structure
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the knowledge base
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    /// Invalid section record
    #[error("Section error: {0}")]
    Section(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Section(error.to_string())
    }
}

impl From<reqwest::Error> for KnowledgeBaseError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
