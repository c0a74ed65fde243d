/*!
 * Tests for error types and conversions
 */

use vertrans::errors::{AppError, JudgeError, KnowledgeBaseError, ProviderError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_judgeError_fromProviderError_shouldWrapMessage() {
    let error: JudgeError = ProviderError::ConnectionError("Host unreachable".to_string()).into();
    assert!(matches!(error, JudgeError::Provider(_)));
    assert_eq!(error.to_string(), "Provider error: Connection error: Host unreachable");
}

#[test]
fn test_judgeError_timeout_shouldDisplaySeconds() {
    assert_eq!(JudgeError::Timeout(180).to_string(), "Judgment timed out after 180 seconds");
    assert_eq!(JudgeError::Empty.to_string(), "Empty response from model");
}

#[test]
fn test_knowledgeBaseError_status_shouldDisplayCode() {
    let error = KnowledgeBaseError::Status(503);
    assert_eq!(error.to_string(), "Knowledge base responded with status 503");
}

#[test]
fn test_appError_fromConversions_shouldPickVariant() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(AppError::from(json), AppError::Section(_)));

    let kb: AppError = KnowledgeBaseError::ParseError("bad".to_string()).into();
    assert_eq!(kb.to_string(), "Knowledge base error: Failed to parse knowledge base response: bad");

    let other = AppError::from(anyhow::anyhow!("boom"));
    assert_eq!(other.to_string(), "Unknown error: boom");
}
