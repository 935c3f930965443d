//! Predictor port: Trait for the remote inference service.
//!
//! This trait abstracts the HTTP transport from the screening use case.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::PredictionRequest;

/// Failures of a single call to the inference service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout. Please check your internet connection and try again.")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("API Error: {status}{} - {body}", reason_segment(.status_text))]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("Invalid response from prediction service: {0}")]
    Decode(String),

    /// Connection, DNS, TLS or other transport failure.
    #[error("Could not reach prediction service: {0}")]
    Transport(String),
}

/// Non-standard codes have no reason phrase; leave no gap for it.
fn reason_segment(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(" {status_text}")
    }
}

impl ApiError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Trait for calls to the inference service.
///
/// Implementations make exactly one attempt per call; retrying is the
/// caller's decision.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Submit a feature vector and return the decoded response unmodified.
    ///
    /// # Errors
    /// Returns `ApiError::Timeout` when the deadline elapses, `ApiError::Status`
    /// for non-success responses.
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, ApiError>;

    /// Check whether the service is reachable and healthy.
    ///
    /// # Errors
    /// Returns the transport failure if the service cannot be reached.
    async fn health(&self) -> Result<bool, ApiError>;

    /// Base URL of the service, for display and logging.
    fn endpoint(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_with_reason() {
        let err = ApiError::Status {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            body: "warming up".to_string(),
        };
        assert_eq!(err.to_string(), "API Error: 503 Service Unavailable - warming up");
    }

    #[test]
    fn test_status_message_without_reason() {
        let err = ApiError::Status {
            status: 599,
            status_text: String::new(),
            body: "upstream".to_string(),
        };
        assert_eq!(err.to_string(), "API Error: 599 - upstream");
        assert!(!err.is_timeout());
    }
}
