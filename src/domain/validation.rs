//! Client-side field validation.
//!
//! These checks drive inline form feedback only. The inference service is
//! the authority on which inputs it accepts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::form::{FieldKind, FormField, FormValues};

/// Inclusive numeric bounds for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Static bounds table keyed by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    bounds: BTreeMap<FormField, Bounds>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new()
            .with(FormField::Age, Bounds::new(1.0, 120.0))
            .with(FormField::RestingBloodPressure, Bounds::new(80.0, 200.0))
            .with(FormField::SerumCholesterol, Bounds::new(100.0, 600.0))
            .with(FormField::MaxHeartRate, Bounds::new(60.0, 220.0))
            .with(FormField::StDepression, Bounds::new(0.0, 10.0))
            .with(FormField::NumMajorVessels, Bounds::new(0.0, 4.0))
    }
}

impl ValidationRules {
    /// An empty table: only required-ness and option membership are checked.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounds: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: FormField, bounds: Bounds) -> Self {
        self.bounds.insert(field, bounds);
        self
    }

    #[must_use]
    pub fn bounds(&self, field: FormField) -> Option<Bounds> {
        self.bounds.get(&field).copied()
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("{label} must be a number")]
    NotANumber { label: &'static str },

    #[error("Please select a valid option")]
    UnknownOption,

    #[error("{label} must be between {} and {}{}", .bounds.min, .bounds.max, unit_suffix(.unit))]
    OutOfRange {
        label: &'static str,
        bounds: Bounds,
        unit: Option<&'static str>,
    },
}

fn unit_suffix(unit: &Option<&'static str>) -> String {
    unit.map(|u| format!(" {u}")).unwrap_or_default()
}

/// A rejected field together with its reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: FormField,
    pub error: FieldError,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.error)
    }
}

/// Label used in range messages, matching how the form words each bound.
fn range_wording(field: FormField) -> (&'static str, Option<&'static str>) {
    match field {
        FormField::Age => ("Age", None),
        FormField::RestingBloodPressure => ("Blood pressure", Some("mm Hg")),
        FormField::SerumCholesterol => ("Cholesterol", Some("mg/dl")),
        FormField::MaxHeartRate => ("Heart rate", Some("bpm")),
        FormField::StDepression => ("ST Depression", None),
        FormField::NumMajorVessels => ("Number of vessels", None),
        other => (other.label(), None),
    }
}

/// Validate one field's current value.
///
/// # Errors
/// Returns the reason the value is unacceptable.
pub fn validate_field(
    field: FormField,
    value: &str,
    rules: &ValidationRules,
) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return if field.is_required() {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }

    let number = match field.kind() {
        FieldKind::Choice(options) => {
            return if options.contains(&value) {
                Ok(())
            } else {
                Err(FieldError::UnknownOption)
            };
        }
        FieldKind::Integer => value.parse::<i64>().ok().map(|v| v as f64),
        FieldKind::Decimal => value.parse::<f64>().ok().filter(|v| v.is_finite()),
    };

    let (label, unit) = range_wording(field);
    let number = number.ok_or(FieldError::NotANumber { label })?;

    match rules.bounds(field) {
        Some(bounds) if !bounds.contains(number) => Err(FieldError::OutOfRange {
            label,
            bounds,
            unit,
        }),
        _ => Ok(()),
    }
}

/// Validate every field of the form.
///
/// # Errors
/// Returns all rejected fields in form order.
pub fn validate_form(form: &FormValues, rules: &ValidationRules) -> Result<(), Vec<FieldIssue>> {
    let issues: Vec<FieldIssue> = FormField::ALL
        .into_iter()
        .filter_map(|field| {
            validate_field(field, form.value_or_empty(field), rules)
                .err()
                .map(|error| FieldIssue { field, error })
        })
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Completion progress of the form: how many required fields hold a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormProgress {
    pub completed: usize,
    pub total: usize,
}

impl FormProgress {
    #[must_use]
    pub fn of(form: &FormValues, rules: &ValidationRules) -> Self {
        let required = FormField::ALL.iter().filter(|f| f.is_required());
        let completed = required
            .clone()
            .filter(|field| {
                let value = form.value_or_empty(**field);
                !value.trim().is_empty() && validate_field(**field, value, rules).is_ok()
            })
            .count();
        Self {
            completed,
            total: required.count(),
        }
    }

    /// Completion ratio in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for FormProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} fields completed", self.completed, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn test_required() {
        assert_eq!(
            validate_field(FormField::Age, "", &rules()),
            Err(FieldError::Required)
        );
        assert_eq!(
            validate_field(FormField::Sex, "   ", &rules()),
            Err(FieldError::Required)
        );
        assert_eq!(FieldError::Required.to_string(), "This field is required");
    }

    #[test]
    fn test_age_bounds() {
        assert!(validate_field(FormField::Age, "1", &rules()).is_ok());
        assert!(validate_field(FormField::Age, "120", &rules()).is_ok());

        let low = validate_field(FormField::Age, "0", &rules()).expect_err("below min");
        assert_eq!(low.to_string(), "Age must be between 1 and 120");

        let high = validate_field(FormField::Age, "121", &rules()).expect_err("above max");
        assert!(high.to_string().contains("120"));
    }

    #[test]
    fn test_unit_in_message() {
        let err = validate_field(FormField::RestingBloodPressure, "79", &rules())
            .expect_err("below min");
        assert_eq!(
            err.to_string(),
            "Blood pressure must be between 80 and 200 mm Hg"
        );

        let err = validate_field(FormField::SerumCholesterol, "601", &rules())
            .expect_err("above max");
        assert_eq!(
            err.to_string(),
            "Cholesterol must be between 100 and 600 mg/dl"
        );
    }

    #[test]
    fn test_decimal_bounds() {
        assert!(validate_field(FormField::StDepression, "0", &rules()).is_ok());
        assert!(validate_field(FormField::StDepression, "6.2", &rules()).is_ok());
        let err = validate_field(FormField::StDepression, "10.5", &rules()).expect_err("above");
        assert_eq!(err.to_string(), "ST Depression must be between 0 and 10");
    }

    #[test]
    fn test_every_bound_edge() {
        let rules = rules();
        for field in FormField::ALL {
            let Some(bounds) = rules.bounds(field) else {
                continue;
            };
            assert!(validate_field(field, &bounds.min.to_string(), &rules).is_ok());
            assert!(validate_field(field, &bounds.max.to_string(), &rules).is_ok());
            assert!(validate_field(field, &(bounds.min - 1.0).to_string(), &rules).is_err());
            assert!(validate_field(field, &(bounds.max + 1.0).to_string(), &rules).is_err());
        }
    }

    #[test]
    fn test_non_numeric_and_unknown_option() {
        assert_eq!(
            validate_field(FormField::MaxHeartRate, "fast", &rules()),
            Err(FieldError::NotANumber { label: "Heart rate" })
        );
        assert_eq!(
            validate_field(FormField::ChestPain, "sharp", &rules()),
            Err(FieldError::UnknownOption)
        );
        assert!(validate_field(FormField::ChestPain, "atypical", &rules()).is_ok());
    }

    #[test]
    fn test_unbounded_rules_accept_any_number() {
        assert!(validate_field(FormField::Age, "900", &ValidationRules::new()).is_ok());
    }

    #[test]
    fn test_validate_form_reports_in_form_order() {
        let form = FormValues::sample()
            .with(FormField::Thalassemia, "")
            .with(FormField::Age, "0");
        let issues = validate_form(&form, &rules()).expect_err("two issues");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, FormField::Age);
        assert_eq!(issues[1].field, FormField::Thalassemia);
        assert_eq!(issues[1].to_string(), "Thalassemia: This field is required");

        assert!(validate_form(&FormValues::sample(), &rules()).is_ok());
    }

    #[test]
    fn test_progress_counts_only_valid_fields() {
        let empty = FormProgress::of(&FormValues::new(), &rules());
        assert_eq!(empty.completed, 0);
        assert_eq!(empty.total, 13);

        let partial = FormValues::new()
            .with(FormField::Age, "45")
            .with(FormField::Sex, "female")
            .with(FormField::SerumCholesterol, "50");
        let progress = FormProgress::of(&partial, &rules());
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.to_string(), "2 of 13 fields completed");

        let full = FormProgress::of(&FormValues::sample(), &rules());
        assert!(full.is_complete());
        assert!((full.ratio() - 1.0).abs() < f64::EPSILON);
    }
}
