//! reqwest adapter for the inference service.
//!
//! One POST per prediction, bounded by a deadline. Expiry drops the
//! in-flight future, which cancels the request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::{AppConfig, HEALTH_PATH, PREDICT_PATH};
use crate::domain::PredictionRequest;
use crate::ports::{ApiError, Predictor};

/// HTTP client for `POST <endpoint>/predict`.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: Client,
    base_url: String,
    timeout: Duration,
    log_payloads: bool,
}

impl HttpPredictor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
            timeout,
            log_payloads: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_endpoint.clone(), config.request_timeout)
            .with_payload_logging(config.log_payloads)
    }

    /// Point the client at a different service.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    #[must_use]
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn with_deadline<T, Fut>(&self, fut: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Prediction service did not answer in time"
                );
                Err(ApiError::Timeout)
            }
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn classify(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, ApiError> {
        let url = self.url_for(PREDICT_PATH);
        tracing::info!(url = %url, "Making prediction request");
        if self.log_payloads {
            match serde_json::to_string(request) {
                Ok(payload) => tracing::debug!(%payload, "Request payload"),
                Err(e) => tracing::debug!("Request payload not serializable: {}", e),
            }
        }

        let result = self
            .with_deadline(async {
                let response = self
                    .client
                    .post(&url)
                    .json(request)
                    .send()
                    .await
                    .map_err(classify)?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.map_err(classify)?;
                    return Err(ApiError::Status {
                        status: status.as_u16(),
                        status_text: status.canonical_reason().unwrap_or_default().to_string(),
                        body,
                    });
                }

                let body = response.text().await.map_err(classify)?;
                serde_json::from_str::<Value>(&body).map_err(|e| ApiError::Decode(e.to_string()))
            })
            .await;

        match &result {
            Ok(value) if self.log_payloads => {
                tracing::debug!(response = %value, "Prediction response")
            }
            Ok(_) => tracing::debug!("Prediction response received"),
            Err(e) => tracing::error!("Prediction error: {}", e),
        }
        result
    }

    async fn health(&self) -> Result<bool, ApiError> {
        let url = self.url_for(HEALTH_PATH);
        self.with_deadline(async {
            let response = self.client.get(&url).send().await.map_err(classify)?;
            Ok(response.status().is_success())
        })
        .await
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
