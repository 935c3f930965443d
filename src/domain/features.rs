//! Feature encoding for the heart-disease inference service.
//!
//! The service expects the 13 features of the Cleveland heart-disease
//! dataset as numbers. Categorical form values map to integer codes through
//! closed enums, so an unmapped option cannot reach the payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::form::{FormField, FormValues};

/// Declares a categorical form field as a closed enum of
/// `Variant => ("form value", code)` entries.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => ($value:literal, $code:literal) ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in option order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Accepted form option values, in option order.
            pub const FORM_VALUES: &'static [&'static str] = &[$( $value ),+];

            /// Resolve a form option value.
            #[must_use]
            pub fn from_form_value(value: &str) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// The option value used by the form.
            #[must_use]
            pub fn form_value(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }

            /// Integer code expected by the inference service.
            #[must_use]
            pub fn code(&self) -> u8 {
                match self {
                    $( Self::$variant => $code, )+
                }
            }
        }
    };
}

categorical! {
    /// Biological sex.
    Sex {
        Female => ("female", 0),
        Male => ("male", 1),
    }
}

categorical! {
    /// Chest pain type (`cp`).
    ChestPain {
        TypicalAngina => ("typical", 0),
        AtypicalAngina => ("atypical", 1),
        NonAnginal => ("non-anginal", 2),
        Asymptomatic => ("asymptomatic", 3),
    }
}

categorical! {
    /// Fasting blood sugar above 120 mg/dl (`fbs`).
    FastingBloodSugar {
        AtMost120 => ("less_than_120", 0),
        Above120 => ("greater_than_120", 1),
    }
}

categorical! {
    /// Resting electrocardiogram result (`restecg`).
    RestingEcg {
        Normal => ("normal", 0),
        Abnormal => ("abnormal", 1),
    }
}

categorical! {
    /// Exercise-induced angina (`exang`).
    ExerciseAngina {
        No => ("no", 0),
        Yes => ("yes", 1),
    }
}

categorical! {
    /// Slope of the peak exercise ST segment (`slope`).
    StSlope {
        Upsloping => ("upsloping", 0),
        Flat => ("flat", 1),
        Downsloping => ("downsloping", 2),
    }
}

categorical! {
    /// Thallium stress test result (`thal`). Codes start at 1.
    Thalassemia {
        Normal => ("normal", 1),
        Carrier => ("carrier", 2),
        Deficient => ("deficient", 3),
    }
}

/// Why a form could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{0} is missing")]
    Missing(FormField),

    #[error("{field}: '{value}' is not a valid number")]
    InvalidNumber { field: FormField, value: String },

    #[error("{field}: '{value}' is not one of the allowed options")]
    UnknownOption { field: FormField, value: String },
}

/// Feature keys in the order the model was trained on.
pub const FEATURE_KEYS: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Numeric feature vector sent to the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years
    pub age: i32,
    /// 1 = male, 0 = female
    pub sex: u8,
    /// Chest pain type, 0-3
    pub cp: u8,
    /// Resting systolic blood pressure, mm Hg
    pub trestbps: i32,
    /// Serum cholesterol, mg/dl
    pub chol: i32,
    /// Fasting blood sugar > 120 mg/dl
    pub fbs: u8,
    /// Resting ECG, 0-1
    pub restecg: u8,
    /// Maximum heart rate achieved, bpm
    pub thalach: i32,
    /// Exercise-induced angina
    pub exang: u8,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    /// Peak exercise ST slope, 0-2
    pub slope: u8,
    /// Major vessels coloured by fluoroscopy
    pub ca: i32,
    /// Thallium stress result, 1-3
    pub thal: u8,
}

/// Request body for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub features: FeatureVector,
}

impl FeatureVector {
    /// Encode raw form values.
    ///
    /// # Errors
    /// Returns the first field that is missing, fails to parse, or holds an
    /// option outside its table, in form order.
    pub fn from_form(form: &FormValues) -> Result<Self, MappingError> {
        Ok(Self {
            age: parse_int(form, FormField::Age)?,
            sex: choice(form, FormField::Sex, Sex::from_form_value)?.code(),
            cp: choice(form, FormField::ChestPain, ChestPain::from_form_value)?.code(),
            trestbps: parse_int(form, FormField::RestingBloodPressure)?,
            chol: parse_int(form, FormField::SerumCholesterol)?,
            fbs: choice(form, FormField::FastingBloodSugar, FastingBloodSugar::from_form_value)?
                .code(),
            restecg: choice(form, FormField::RestingEcg, RestingEcg::from_form_value)?.code(),
            thalach: parse_int(form, FormField::MaxHeartRate)?,
            exang: choice(form, FormField::ExerciseAngina, ExerciseAngina::from_form_value)?
                .code(),
            oldpeak: parse_decimal(form, FormField::StDepression)?,
            slope: choice(form, FormField::SlopeStSegment, StSlope::from_form_value)?.code(),
            ca: parse_int(form, FormField::NumMajorVessels)?,
            thal: choice(form, FormField::Thalassemia, Thalassemia::from_form_value)?.code(),
        })
    }

    /// Wrap into the request body shape.
    #[must_use]
    pub fn into_request(self) -> PredictionRequest {
        PredictionRequest { features: self }
    }
}

fn raw(form: &FormValues, field: FormField) -> Result<&str, MappingError> {
    match form.get(field).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MappingError::Missing(field)),
    }
}

fn parse_int(form: &FormValues, field: FormField) -> Result<i32, MappingError> {
    let value = raw(form, field)?;
    value.parse().map_err(|_| MappingError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_decimal(form: &FormValues, field: FormField) -> Result<f64, MappingError> {
    let value = raw(form, field)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MappingError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn choice<T>(
    form: &FormValues,
    field: FormField,
    lookup: fn(&str) -> Option<T>,
) -> Result<T, MappingError> {
    let value = raw(form, field)?;
    lookup(value).ok_or_else(|| MappingError::UnknownOption {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_codes() {
        assert_eq!(Sex::from_form_value("male").map(|v| v.code()), Some(1));
        assert_eq!(Sex::from_form_value("female").map(|v| v.code()), Some(0));
        assert_eq!(
            ChestPain::from_form_value("asymptomatic").map(|v| v.code()),
            Some(3)
        );
        assert_eq!(
            ChestPain::from_form_value("non-anginal").map(|v| v.code()),
            Some(2)
        );
        assert_eq!(
            Thalassemia::from_form_value("carrier").map(|v| v.code()),
            Some(2)
        );
        assert_eq!(
            FastingBloodSugar::from_form_value("greater_than_120").map(|v| v.code()),
            Some(1)
        );
        assert_eq!(StSlope::from_form_value("downsloping").map(|v| v.code()), Some(2));
    }

    #[test]
    fn test_form_values_cover_every_variant() {
        for v in ChestPain::ALL {
            assert_eq!(ChestPain::from_form_value(v.form_value()), Some(*v));
        }
        for v in Thalassemia::ALL {
            assert_eq!(Thalassemia::from_form_value(v.form_value()), Some(*v));
        }
        assert_eq!(StSlope::FORM_VALUES.len(), StSlope::ALL.len());
    }

    #[test]
    fn test_sample_form_maps_to_full_vector() {
        let features = FeatureVector::from_form(&FormValues::sample()).expect("Should map");
        assert_eq!(features.age, 58);
        assert_eq!(features.sex, 1);
        assert_eq!(features.cp, 3);
        assert_eq!(features.restecg, 1);
        assert_eq!(features.exang, 1);
        assert!((features.oldpeak - 1.8).abs() < f64::EPSILON);
        assert_eq!(features.thal, 2);

        let json = serde_json::to_value(features.clone().into_request()).expect("Should serialize");
        let map = json["features"].as_object().expect("features object");
        assert_eq!(map.len(), 13);
        for key in FEATURE_KEYS {
            assert!(map[key].is_number(), "{key} should be numeric");
        }
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let form = FormValues::sample().with(FormField::Thalassemia, "fixed");
        assert_eq!(
            FeatureVector::from_form(&form),
            Err(MappingError::UnknownOption {
                field: FormField::Thalassemia,
                value: "fixed".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_and_unparsable_numbers() {
        let form = FormValues::sample().with(FormField::Age, "  ");
        assert_eq!(
            FeatureVector::from_form(&form),
            Err(MappingError::Missing(FormField::Age))
        );

        let form = FormValues::sample().with(FormField::SerumCholesterol, "high");
        assert!(matches!(
            FeatureVector::from_form(&form),
            Err(MappingError::InvalidNumber {
                field: FormField::SerumCholesterol,
                ..
            })
        ));

        let form = FormValues::sample().with(FormField::StDepression, "NaN");
        assert!(FeatureVector::from_form(&form).is_err());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let form = FormValues::sample()
            .with(FormField::Age, " 47 ")
            .with(FormField::Sex, "female ");
        let features = FeatureVector::from_form(&form).expect("Should map");
        assert_eq!(features.age, 47);
        assert_eq!(features.sex, 0);
    }
}
