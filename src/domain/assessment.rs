//! Interpretation of the inference service's response.
//!
//! The response shape belongs to the service, so it is read defensively:
//! the risk flag may be a number, a boolean or a numeric string, and the
//! confidence score may arrive as `probability` or `confidence`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No elevated risk indicated
    Low,
    /// Elevated risk of heart disease
    Elevated,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => {
                "Our analysis indicates a lower risk of heart disease. Continue maintaining a \
                 healthy lifestyle with regular exercise, balanced diet, and routine check-ups."
            }
            Self::Elevated => {
                "Our analysis indicates an elevated risk of heart disease. Please consult with a \
                 healthcare professional for proper evaluation and personalized advice."
            }
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Elevated => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Elevated => write!(f, "HIGH"),
        }
    }
}

pub const MEDICAL_DISCLAIMER: &str = "This prediction is based on machine learning analysis and \
is for educational and informational purposes only. It should NOT be considered a medical \
diagnosis or replace professional medical advice. Always consult with qualified healthcare \
professionals for proper medical evaluation, diagnosis, and treatment.";

/// Interpreted prediction, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: RiskLevel,

    /// Model confidence in `(0, 1]`, if the service reported one
    pub confidence: Option<f64>,

    /// Response exactly as returned by the service
    pub raw: Value,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Interpret a decoded service response.
    #[must_use]
    pub fn from_response(raw: Value) -> Self {
        let risk_level = match raw.get("prediction").and_then(as_number) {
            Some(v) if v > 0.0 => RiskLevel::Elevated,
            _ => RiskLevel::Low,
        };
        // The first key with a usable (non-zero, non-empty) value is the one
        // reported; a negative or unparsable score is hidden, not skipped.
        let confidence = ["probability", "confidence"]
            .into_iter()
            .filter_map(|key| raw.get(key))
            .find(|v| is_reported(v))
            .and_then(as_number)
            .filter(|p| p.is_finite() && *p > 0.0);

        Self {
            risk_level,
            confidence,
            raw,
            created_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.risk_level == RiskLevel::Elevated
    }

    /// Confidence formatted as a percentage with one decimal, e.g. `82.0%`.
    #[must_use]
    pub fn confidence_display(&self) -> Option<String> {
        self.confidence.map(|p| format!("{:.1}%", p * 100.0))
    }
}

/// Numeric reading of a response value. Services may send numbers,
/// booleans or numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn is_reported(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_elevated_with_probability() {
        let a = Assessment::from_response(json!({"prediction": 1, "probability": 0.82}));
        assert_eq!(a.risk_level, RiskLevel::Elevated);
        assert_eq!(a.confidence_display().as_deref(), Some("82.0%"));
        assert_eq!(a.risk_level.to_string(), "HIGH");
    }

    #[test]
    fn test_low_without_confidence() {
        let a = Assessment::from_response(json!({"prediction": 0}));
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert!(a.confidence.is_none());
        assert!(a.confidence_display().is_none());
    }

    #[test]
    fn test_confidence_key_fallback() {
        let a = Assessment::from_response(json!({"prediction": 0, "confidence": 0.64}));
        assert_eq!(a.confidence_display().as_deref(), Some("64.0%"));

        // A zero probability does not shadow a usable confidence.
        let a = Assessment::from_response(json!({"prediction": 1, "probability": 0, "confidence": 0.9}));
        assert_eq!(a.confidence_display().as_deref(), Some("90.0%"));

        let a = Assessment::from_response(json!({"prediction": 1, "probability": 0.7, "confidence": 0.9}));
        assert_eq!(a.confidence_display().as_deref(), Some("70.0%"));
    }

    #[test]
    fn test_prediction_shapes() {
        assert!(Assessment::from_response(json!({"prediction": true})).is_elevated());
        assert!(Assessment::from_response(json!({"prediction": 2})).is_elevated());
        assert!(!Assessment::from_response(json!({"prediction": false})).is_elevated());
        assert!(!Assessment::from_response(json!({"prediction": "0"})).is_elevated());
        assert!(!Assessment::from_response(json!({"prediction": "none"})).is_elevated());
        assert!(!Assessment::from_response(json!({})).is_elevated());
    }

    #[test]
    fn test_numeric_strings_are_read() {
        let a = Assessment::from_response(json!({"prediction": "1", "probability": "0.82"}));
        assert_eq!(a.risk_level, RiskLevel::Elevated);
        assert_eq!(a.confidence_display().as_deref(), Some("82.0%"));

        let a = Assessment::from_response(json!({"prediction": " 0 ", "confidence": " 0.5"}));
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.confidence_display().as_deref(), Some("50.0%"));
    }

    #[test]
    fn test_negative_probability_is_hidden() {
        let a = Assessment::from_response(json!({"prediction": 1, "probability": -0.5, "confidence": 0.9}));
        assert!(a.confidence.is_none());

        let a = Assessment::from_response(json!({"prediction": 1, "probability": null, "confidence": 0.9}));
        assert_eq!(a.confidence_display().as_deref(), Some("90.0%"));
    }

    #[test]
    fn test_raw_response_is_kept() {
        let raw = json!({"prediction": 1, "model": "rf-v2"});
        let a = Assessment::from_response(raw.clone());
        assert_eq!(a.raw, raw);
    }
}
