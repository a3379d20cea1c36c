//! Validation of incoming subject profiles and derivation of their baselines.

use crate::error::VitalSimError;
use serde::Serialize;
use vitalsim_schemas::profile::{Baselines, Condition, ProfileInput};

pub const MAX_AGE_YEARS: i32 = 18;

const BASELINE_SPO2: f64 = 98.0;
const BASELINE_TEMPERATURE: f64 = 36.8;
const BASELINE_RESPIRATORY_RATE: f64 = 22.0;
const BASELINE_SYSTOLIC_BP: f64 = 95.0;
const BASELINE_DIASTOLIC_BP: f64 = 60.0;

/// A profile that has passed validation and carries resolved baselines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProfile {
    pub id: String,
    pub name: Option<String>,
    pub age: u8,
    pub condition: Condition,
    pub baselines: Baselines,
}

impl SubjectProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl Default for SubjectProfile {
    /// A 7-year-old with type 1 diabetes.
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: None,
            age: 7,
            condition: Condition::Diabetes,
            baselines: derive_baselines(7, Condition::Diabetes),
        }
    }
}

impl TryFrom<ProfileInput> for SubjectProfile {
    type Error = VitalSimError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        validate_profile(input)
    }
}

/// Age- and condition-appropriate defaults.
pub fn derive_baselines(age: u8, condition: Condition) -> Baselines {
    let heart_rate = match age {
        0..=5 => 100.0,
        6..=8 => 90.0,
        9..=12 => 85.0,
        _ => 80.0,
    };
    let glucose = if condition.has_diabetes() { 5.5 } else { 5.0 };

    Baselines {
        glucose,
        heart_rate,
        spo2: BASELINE_SPO2,
        temperature: BASELINE_TEMPERATURE,
        respiratory_rate: BASELINE_RESPIRATORY_RATE,
        systolic_bp: BASELINE_SYSTOLIC_BP,
        diastolic_bp: BASELINE_DIASTOLIC_BP,
    }
}

/// Checks a raw profile and resolves its baselines. Explicit baselines in the
/// input override the derived ones.
pub fn validate_profile(input: ProfileInput) -> Result<SubjectProfile, VitalSimError> {
    validate_subject_id(&input.id)?;

    if !(0..=MAX_AGE_YEARS).contains(&input.age) {
        return Err(VitalSimError::InvalidProfileInput(format!(
            "age {} for subject '{}' is outside 0-{}",
            input.age, input.id, MAX_AGE_YEARS
        )));
    }
    let age = input.age as u8;

    let mut baselines = derive_baselines(age, input.condition);
    if let Some(glucose) = input.baseline_glucose {
        baselines.glucose = checked_baseline("glucose", glucose)?;
    }
    if let Some(heart_rate) = input.baseline_heart_rate {
        baselines.heart_rate = checked_baseline("heart rate", heart_rate)?;
    }
    if let Some(spo2) = input.baseline_spo2 {
        baselines.spo2 = checked_baseline("SpO2", spo2)?;
    }

    let name = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    Ok(SubjectProfile {
        id: input.id,
        name,
        age,
        condition: input.condition,
        baselines,
    })
}

/// Subject ids double as history file names.
pub fn validate_subject_id(id: &str) -> Result<(), VitalSimError> {
    if id.is_empty() {
        return Err(VitalSimError::InvalidProfileInput(
            "subject id must not be empty".to_string(),
        ));
    }
    if id.len() > 64 || id.starts_with('.') {
        return Err(VitalSimError::InvalidProfileInput(format!(
            "subject id '{}' is not a safe file name",
            id
        )));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(VitalSimError::InvalidProfileInput(format!(
            "subject id '{}' contains unsupported character '{}'",
            id, bad
        )));
    }
    Ok(())
}

fn checked_baseline(label: &str, value: f64) -> Result<f64, VitalSimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(VitalSimError::InvalidProfileInput(format!(
            "baseline {} must be a finite positive number, got {}",
            label, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, age: i32, condition: Condition) -> ProfileInput {
        ProfileInput {
            id: id.to_string(),
            name: None,
            age,
            condition,
            baseline_glucose: None,
            baseline_heart_rate: None,
            baseline_spo2: None,
        }
    }

    #[test]
    fn heart_rate_follows_age_bands() {
        assert_eq!(derive_baselines(0, Condition::None).heart_rate, 100.0);
        assert_eq!(derive_baselines(5, Condition::None).heart_rate, 100.0);
        assert_eq!(derive_baselines(8, Condition::None).heart_rate, 90.0);
        assert_eq!(derive_baselines(12, Condition::None).heart_rate, 85.0);
        assert_eq!(derive_baselines(13, Condition::None).heart_rate, 80.0);
    }

    #[test]
    fn glucose_depends_on_diabetes() {
        assert_eq!(derive_baselines(7, Condition::Diabetes).glucose, 5.5);
        assert_eq!(derive_baselines(7, Condition::Both).glucose, 5.5);
        assert_eq!(derive_baselines(7, Condition::Asthma).glucose, 5.0);
        assert_eq!(derive_baselines(7, Condition::Asthma).spo2, 98.0);
    }

    #[test]
    fn explicit_baselines_override_defaults() {
        let mut raw = input("maya", 9, Condition::Asthma);
        raw.baseline_glucose = Some(6.1);
        raw.baseline_heart_rate = Some(95.0);
        let profile = validate_profile(raw).unwrap();
        assert_eq!(profile.baselines.glucose, 6.1);
        assert_eq!(profile.baselines.heart_rate, 95.0);
        assert_eq!(profile.baselines.spo2, 98.0);
        assert_eq!(profile.display_name(), "maya");
    }

    #[test]
    fn rejects_out_of_range_age() {
        assert!(matches!(
            validate_profile(input("teen", 19, Condition::None)),
            Err(VitalSimError::InvalidProfileInput(_))
        ));
        assert!(validate_profile(input("neg", -1, Condition::None)).is_err());
    }

    #[test]
    fn rejects_non_finite_baseline() {
        let mut raw = input("kid", 7, Condition::Diabetes);
        raw.baseline_glucose = Some(f64::NAN);
        assert!(validate_profile(raw).is_err());

        let mut raw = input("kid", 7, Condition::Diabetes);
        raw.baseline_spo2 = Some(-3.0);
        assert!(validate_profile(raw).is_err());
    }

    #[test]
    fn rejects_unsafe_ids() {
        for id in ["", "../etc", ".hidden", "a/b", "with space"] {
            assert!(validate_subject_id(id).is_err(), "accepted '{}'", id);
        }
        assert!(validate_subject_id("child-01_a.b").is_ok());
    }
}
