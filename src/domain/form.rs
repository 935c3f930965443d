//! Screening form fields and the raw values captured from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::features::{
    ChestPain, ExerciseAngina, FastingBloodSugar, RestingEcg, Sex, StSlope, Thalassemia,
};

/// How a field's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number (age, blood pressure, ...)
    Integer,
    /// Floating-point number (ST depression)
    Decimal,
    /// One of a closed set of option values
    Choice(&'static [&'static str]),
}

/// The 13 clinical fields of the screening form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Age,
    Sex,
    ChestPain,
    RestingBloodPressure,
    SerumCholesterol,
    FastingBloodSugar,
    #[serde(rename = "restingECG")]
    RestingEcg,
    MaxHeartRate,
    ExerciseAngina,
    StDepression,
    #[serde(rename = "slopeSTSegment")]
    SlopeStSegment,
    NumMajorVessels,
    Thalassemia,
}

impl FormField {
    /// Every field, in form order.
    pub const ALL: [FormField; 13] = [
        Self::Age,
        Self::Sex,
        Self::ChestPain,
        Self::RestingBloodPressure,
        Self::SerumCholesterol,
        Self::FastingBloodSugar,
        Self::RestingEcg,
        Self::MaxHeartRate,
        Self::ExerciseAngina,
        Self::StDepression,
        Self::SlopeStSegment,
        Self::NumMajorVessels,
        Self::Thalassemia,
    ];

    /// Form input name, as used in the submitted form data.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::ChestPain => "chestPain",
            Self::RestingBloodPressure => "restingBloodPressure",
            Self::SerumCholesterol => "serumCholesterol",
            Self::FastingBloodSugar => "fastingBloodSugar",
            Self::RestingEcg => "restingECG",
            Self::MaxHeartRate => "maxHeartRate",
            Self::ExerciseAngina => "exerciseAngina",
            Self::StDepression => "stDepression",
            Self::SlopeStSegment => "slopeSTSegment",
            Self::NumMajorVessels => "numMajorVessels",
            Self::Thalassemia => "thalassemia",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::ChestPain => "Chest Pain Type",
            Self::RestingBloodPressure => "Resting Blood Pressure",
            Self::SerumCholesterol => "Serum Cholesterol",
            Self::FastingBloodSugar => "Fasting Blood Sugar",
            Self::RestingEcg => "Resting ECG",
            Self::MaxHeartRate => "Max Heart Rate",
            Self::ExerciseAngina => "Exercise Angina",
            Self::StDepression => "ST Depression",
            Self::SlopeStSegment => "ST Segment Slope",
            Self::NumMajorVessels => "Major Vessels",
            Self::Thalassemia => "Thalassemia",
        }
    }

    /// Short input hint shown while the field is empty.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Age => "years (1-120)",
            Self::RestingBloodPressure => "systolic mm Hg (80-200)",
            Self::SerumCholesterol => "total mg/dl (100-600)",
            Self::MaxHeartRate => "stress test bpm (60-220)",
            Self::StDepression => "oldpeak mm (0-10)",
            Self::NumMajorVessels => "blocked on fluoroscopy (0-4)",
            _ => "[←/→] choose",
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Age
            | Self::RestingBloodPressure
            | Self::SerumCholesterol
            | Self::MaxHeartRate
            | Self::NumMajorVessels => FieldKind::Integer,
            Self::StDepression => FieldKind::Decimal,
            Self::Sex => FieldKind::Choice(Sex::FORM_VALUES),
            Self::ChestPain => FieldKind::Choice(ChestPain::FORM_VALUES),
            Self::FastingBloodSugar => FieldKind::Choice(FastingBloodSugar::FORM_VALUES),
            Self::RestingEcg => FieldKind::Choice(RestingEcg::FORM_VALUES),
            Self::ExerciseAngina => FieldKind::Choice(ExerciseAngina::FORM_VALUES),
            Self::SlopeStSegment => FieldKind::Choice(StSlope::FORM_VALUES),
            Self::Thalassemia => FieldKind::Choice(Thalassemia::FORM_VALUES),
        }
    }

    /// Option values for choice fields; `None` for numeric inputs.
    #[must_use]
    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self.kind() {
            FieldKind::Choice(options) => Some(options),
            FieldKind::Integer | FieldKind::Decimal => None,
        }
    }

    /// Every field of the form is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        true
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw string values captured from the form for a single submission.
///
/// Serializes as a JSON object keyed by form input name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<FormField, String>,
}

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Value for the field, or `""` if it was never entered.
    #[must_use]
    pub fn value_or_empty(&self, field: FormField) -> &str {
        self.get(field).unwrap_or("")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Typical screening input used by the form's sample-data shortcut.
    #[must_use]
    pub fn sample() -> Self {
        Self::new()
            .with(FormField::Age, "58")
            .with(FormField::Sex, "male")
            .with(FormField::ChestPain, "asymptomatic")
            .with(FormField::RestingBloodPressure, "140")
            .with(FormField::SerumCholesterol, "260")
            .with(FormField::FastingBloodSugar, "less_than_120")
            .with(FormField::RestingEcg, "abnormal")
            .with(FormField::MaxHeartRate, "132")
            .with(FormField::ExerciseAngina, "yes")
            .with(FormField::StDepression, "1.8")
            .with(FormField::SlopeStSegment, "flat")
            .with(FormField::NumMajorVessels, "1")
            .with(FormField::Thalassemia, "carrier")
    }
}

impl Zeroize for FormValues {
    fn zeroize(&mut self) {
        for value in self.values.values_mut() {
            value.zeroize();
        }
        self.values.clear();
    }
}
