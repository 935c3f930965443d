//! Screening service: validate, encode, predict, interpret.
//!
//! One submission at a time: a second `submit` while a request is pending
//! is refused rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::{validate_form, Assessment, FeatureVector, FormValues, ValidationRules};
use crate::ports::Predictor;
use crate::{CardioscreenError, Result};

/// Service for running a risk screening against the inference service.
pub struct ScreeningService<P>
where
    P: Predictor,
{
    predictor: Arc<P>,
    rules: ValidationRules,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission finishes, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<P> ScreeningService<P>
where
    P: Predictor,
{
    /// Create a new screening service.
    pub fn new(predictor: Arc<P>, rules: ValidationRules) -> Self {
        Self {
            predictor,
            rules,
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.predictor.endpoint()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one screening submission.
    ///
    /// # Errors
    /// Returns `Busy` if another submission is pending, `Validation` with
    /// every rejected field, or the classified service failure.
    pub async fn submit(&self, form: &FormValues) -> Result<Assessment> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Submission refused: a prediction is already in progress");
            return Err(CardioscreenError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if let Err(issues) = validate_form(form, &self.rules) {
            tracing::info!(invalid_fields = issues.len(), "Form failed validation");
            return Err(CardioscreenError::Validation(issues));
        }

        let request = FeatureVector::from_form(form)?.into_request();

        tracing::info!("Submitting screening to {}", self.predictor.endpoint());
        let response = self.predictor.predict(&request).await?;
        let assessment = Assessment::from_response(response);

        tracing::info!(
            "Screening complete: risk={}, confidence={}",
            assessment.risk_level,
            assessment.confidence_display().as_deref().unwrap_or("n/a")
        );

        Ok(assessment)
    }

    /// Probe the service health endpoint.
    ///
    /// # Errors
    /// Returns the transport failure if the service cannot be reached.
    pub async fn check_health(&self) -> Result<bool> {
        Ok(self.predictor.health().await?)
    }
}
