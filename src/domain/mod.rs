//! Domain layer: Core screening types and logic.
//!
//! Pure Rust types with no I/O. Form capture, feature encoding, field
//! validation and result interpretation all live here.

mod assessment;
mod features;
mod form;
mod validation;

pub use assessment::{Assessment, RiskLevel, MEDICAL_DISCLAIMER};
pub use features::{
    ChestPain, ExerciseAngina, FastingBloodSugar, FeatureVector, MappingError,
    PredictionRequest, RestingEcg, Sex, StSlope, Thalassemia, FEATURE_KEYS,
};
pub use form::{FieldKind, FormField, FormValues};
pub use validation::{
    validate_field, validate_form, Bounds, FieldError, FieldIssue, FormProgress, ValidationRules,
};
