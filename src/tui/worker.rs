//! Background submission worker.
//!
//! The prediction request runs on the app's tokio runtime so the TUI main
//! loop stays responsive while the service (possibly cold-starting)
//! answers. Outcomes come back over a channel polled each frame.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use zeroize::Zeroize;

use crate::application::ScreeningService;
use crate::domain::{Assessment, FormValues};
use crate::ports::{ApiError, Predictor};
use crate::CardioscreenError;

/// Final outcome of a submission.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Complete(Assessment),
    Failed { message: String, timed_out: bool },
}

const UNEXPECTED_FAILURE: &str =
    "Failed to get prediction. An unexpected error occurred, please try again.";

/// Handle to a running submission.
pub struct SubmissionHandle {
    outcome_rx: Receiver<SubmissionOutcome>,
    started_at: Instant,
}

impl SubmissionHandle {
    /// Try to receive the outcome (non-blocking).
    ///
    /// A task that ended without reporting (it panicked) is a failure.
    #[must_use]
    pub fn try_recv(&self) -> Option<SubmissionOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("Submission task ended without reporting an outcome");
                Some(SubmissionOutcome::Failed {
                    message: UNEXPECTED_FAILURE.to_string(),
                    timed_out: false,
                })
            }
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Reachability of the inference service, as last probed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Checking,
    Healthy,
    Unhealthy(String),
}

/// Handle to a running health probe.
pub struct HealthHandle {
    status_rx: Receiver<HealthStatus>,
}

impl HealthHandle {
    #[must_use]
    pub fn try_recv(&self) -> Option<HealthStatus> {
        match self.status_rx.try_recv() {
            Ok(status) => Some(status),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(HealthStatus::Unhealthy(
                "health check did not complete".to_string(),
            )),
        }
    }
}

pub struct SubmissionWorker;

impl SubmissionWorker {
    /// Spawn a submission on the runtime.
    pub fn spawn<P>(
        runtime: &Handle,
        service: Arc<ScreeningService<P>>,
        mut form: FormValues,
    ) -> SubmissionHandle
    where
        P: Predictor + 'static,
    {
        let (tx, rx) = mpsc::channel();

        runtime.spawn(async move {
            let result = service.submit(&form).await;
            form.zeroize();
            let outcome = match result {
                Ok(assessment) => SubmissionOutcome::Complete(assessment),
                Err(e) => {
                    tracing::error!("Error making prediction: {}", e);
                    SubmissionOutcome::Failed {
                        timed_out: matches!(e, CardioscreenError::Api(ApiError::Timeout)),
                        message: e.user_message(),
                    }
                }
            };
            let _ = tx.send(outcome);
        });

        SubmissionHandle {
            outcome_rx: rx,
            started_at: Instant::now(),
        }
    }

    /// Probe the health endpoint on the runtime.
    pub fn check_health<P>(runtime: &Handle, service: Arc<ScreeningService<P>>) -> HealthHandle
    where
        P: Predictor + 'static,
    {
        let (tx, rx) = mpsc::channel();

        runtime.spawn(async move {
            let status = match service.check_health().await {
                Ok(true) => HealthStatus::Healthy,
                Ok(false) => HealthStatus::Unhealthy("service reported unhealthy".to_string()),
                Err(e) => HealthStatus::Unhealthy(e.to_string()),
            };
            tracing::info!(?status, "Health check finished");
            let _ = tx.send(status);
        });

        HealthHandle { status_rx: rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionRequest, ValidationRules};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct TimeoutPredictor;

    #[async_trait]
    impl Predictor for TimeoutPredictor {
        async fn predict(&self, _request: &PredictionRequest) -> Result<Value, ApiError> {
            Err(ApiError::Timeout)
        }

        async fn health(&self) -> Result<bool, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }

        fn endpoint(&self) -> &str {
            "http://stub"
        }
    }

    struct LowRiskPredictor;

    #[async_trait]
    impl Predictor for LowRiskPredictor {
        async fn predict(&self, _request: &PredictionRequest) -> Result<Value, ApiError> {
            Ok(json!({"prediction": 0}))
        }

        async fn health(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        fn endpoint(&self) -> &str {
            "http://stub"
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime")
    }

    fn wait<T>(rx: impl Fn() -> Option<T>) -> T {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(v) = rx() {
                return v;
            }
            assert!(Instant::now() < deadline, "worker did not report in time");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_timeout_is_reported_as_such() {
        let rt = runtime();
        let service = Arc::new(ScreeningService::new(
            Arc::new(TimeoutPredictor),
            ValidationRules::default(),
        ));

        let handle = SubmissionWorker::spawn(rt.handle(), service, FormValues::sample());
        match wait(|| handle.try_recv()) {
            SubmissionOutcome::Failed { message, timed_out } => {
                assert!(timed_out);
                assert!(message.starts_with("Request timeout"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_completed_submission() {
        let rt = runtime();
        let service = Arc::new(ScreeningService::new(
            Arc::new(LowRiskPredictor),
            ValidationRules::default(),
        ));

        let handle = SubmissionWorker::spawn(rt.handle(), service.clone(), FormValues::sample());
        match wait(|| handle.try_recv()) {
            SubmissionOutcome::Complete(assessment) => assert!(!assessment.is_elevated()),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let rx = SubmissionWorker::check_health(rt.handle(), service);
        assert_eq!(wait(|| rx.try_recv()), HealthStatus::Healthy);
    }

    #[test]
    fn test_unreachable_health() {
        let rt = runtime();
        let service = Arc::new(ScreeningService::new(
            Arc::new(TimeoutPredictor),
            ValidationRules::default(),
        ));
        let rx = SubmissionWorker::check_health(rt.handle(), service);
        assert!(matches!(wait(|| rx.try_recv()), HealthStatus::Unhealthy(_)));
    }

    #[test]
    fn test_task_that_never_reports_is_a_failure() {
        let (tx, rx) = mpsc::channel::<SubmissionOutcome>();
        let handle = SubmissionHandle {
            outcome_rx: rx,
            started_at: Instant::now(),
        };
        assert!(handle.try_recv().is_none());

        drop(tx);
        match handle.try_recv() {
            Some(SubmissionOutcome::Failed { message, timed_out }) => {
                assert!(!timed_out);
                assert!(message.starts_with("Failed to get prediction"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_panicking_predictor_does_not_hang() {
        struct PanickingPredictor;

        #[async_trait]
        impl Predictor for PanickingPredictor {
            async fn predict(&self, _request: &PredictionRequest) -> Result<Value, ApiError> {
                panic!("decoder blew up");
            }

            async fn health(&self) -> Result<bool, ApiError> {
                panic!("decoder blew up");
            }

            fn endpoint(&self) -> &str {
                "http://stub"
            }
        }

        let rt = runtime();
        let service = Arc::new(ScreeningService::new(
            Arc::new(PanickingPredictor),
            ValidationRules::default(),
        ));

        let handle = SubmissionWorker::spawn(rt.handle(), service.clone(), FormValues::sample());
        assert!(matches!(
            wait(|| handle.try_recv()),
            SubmissionOutcome::Failed { timed_out: false, .. }
        ));
        assert!(!service.is_submitting());

        let health = SubmissionWorker::check_health(rt.handle(), service);
        assert!(matches!(wait(|| health.try_recv()), HealthStatus::Unhealthy(_)));
    }
}
