//! # Cardioscreen
//!
//! Heart-disease risk screening client for a remote inference service.
//!
//! This crate provides:
//! - Typed encoding of the 13 clinical screening fields into the service's
//!   numeric feature vector
//! - Advisory range validation and form-completion progress
//! - A single-attempt, deadline-bounded HTTP prediction client
//! - Terminal UI for entering values and reading the result
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core screening types (form, features, validation, assessment)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (reqwest, log sanitizing)
//! - `application`: The screening use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, FeatureVector, FormField, FormValues, RiskLevel};

/// Result type for Cardioscreen operations
pub type Result<T> = std::result::Result<T, CardioscreenError>;

/// Main error type for Cardioscreen
#[derive(Debug, thiserror::Error)]
pub enum CardioscreenError {
    #[error("A prediction is already in progress")]
    Busy,

    #[error("Please fill in all required fields correctly ({} field(s) need attention)", .0.len())]
    Validation(Vec<domain::FieldIssue>),

    #[error("Invalid form data: {0}")]
    Mapping(#[from] domain::MappingError),

    #[error(transparent)]
    Api(#[from] ports::ApiError),
}

impl CardioscreenError {
    /// Message shown to the user for a failed submission.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ports::ApiError::Timeout) => self.to_string(),
            Self::Api(_) => format!(
                "Failed to get prediction. Please check your API connection and try again. Error: {self}"
            ),
            Self::Validation(_) => {
                "Please fill in all required fields correctly. Check the highlighted fields above."
                    .to_string()
            }
            Self::Busy | Self::Mapping(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_is_distinct() {
        let timeout = CardioscreenError::Api(ports::ApiError::Timeout).user_message();
        assert!(timeout.starts_with("Request timeout"));

        let transport =
            CardioscreenError::Api(ports::ApiError::Transport("refused".into())).user_message();
        assert!(transport.starts_with("Failed to get prediction"));
        assert!(transport.ends_with("refused"));
    }

    #[test]
    fn test_status_detail_in_message() {
        let err = CardioscreenError::Api(ports::ApiError::Status {
            status: 500,
            status_text: "Internal Server Error".into(),
            body: "model error".into(),
        });
        assert!(err
            .user_message()
            .ends_with("API Error: 500 Internal Server Error - model error"));
    }
}
