//! Defines the health event value object produced by the simulator and by scripted
//! scenarios, together with the small enums that classify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Free-form, device-specific detail attached to an event.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// One physiological metric track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Glucose,
    HeartRate,
    Mood,
    Medication,
    AsthmaRisk,
    OxygenSaturation,
    Activity,
    Temperature,
    RespiratoryRate,
    BloodPressure,
    Hydration,
    Stress,
    Sleep,
    Environment,
}

/// The kind of health event, as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    GlucoseDrop,
    GlucoseSpike,
    GlucoseNormal,
    HeartRateElevated,
    HeartRateLow,
    HeartRateNormal,
    MoodIndicator,
    ActivityLevel,
    TemperatureAnomaly,
    AsthmaRisk,
    MedicationDue,
    OxygenSaturation,
    RespiratoryRate,
    BloodPressure,
    HydrationLevel,
    StressIndicator,
    SleepQuality,
    EnvironmentalTrigger,
}

impl EventType {
    pub fn channel(self) -> Channel {
        match self {
            EventType::GlucoseDrop | EventType::GlucoseSpike | EventType::GlucoseNormal => {
                Channel::Glucose
            }
            EventType::HeartRateElevated | EventType::HeartRateLow | EventType::HeartRateNormal => {
                Channel::HeartRate
            }
            EventType::MoodIndicator => Channel::Mood,
            EventType::ActivityLevel => Channel::Activity,
            EventType::TemperatureAnomaly => Channel::Temperature,
            EventType::AsthmaRisk => Channel::AsthmaRisk,
            EventType::MedicationDue => Channel::Medication,
            EventType::OxygenSaturation => Channel::OxygenSaturation,
            EventType::RespiratoryRate => Channel::RespiratoryRate,
            EventType::BloodPressure => Channel::BloodPressure,
            EventType::HydrationLevel => Channel::Hydration,
            EventType::StressIndicator => Channel::Stress,
            EventType::SleepQuality => Channel::Sleep,
            EventType::EnvironmentalTrigger => Channel::Environment,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::GlucoseDrop => "glucose_drop",
            EventType::GlucoseSpike => "glucose_spike",
            EventType::GlucoseNormal => "glucose_normal",
            EventType::HeartRateElevated => "heart_rate_elevated",
            EventType::HeartRateLow => "heart_rate_low",
            EventType::HeartRateNormal => "heart_rate_normal",
            EventType::MoodIndicator => "mood_indicator",
            EventType::ActivityLevel => "activity_level",
            EventType::TemperatureAnomaly => "temperature_anomaly",
            EventType::AsthmaRisk => "asthma_risk",
            EventType::MedicationDue => "medication_due",
            EventType::OxygenSaturation => "oxygen_saturation",
            EventType::RespiratoryRate => "respiratory_rate",
            EventType::BloodPressure => "blood_pressure",
            EventType::HydrationLevel => "hydration_level",
            EventType::StressIndicator => "stress_indicator",
            EventType::SleepQuality => "sleep_quality",
            EventType::EnvironmentalTrigger => "environmental_trigger",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

/// Qualitative direction of one channel's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    Volatile,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
            Trend::Volatile => "volatile",
        }
    }
}

/// Safety classification attached to an event after analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyStatus {
    Safe,
    Monitor,
    Danger,
}

impl SafetyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyStatus::Safe => "SAFE",
            SafetyStatus::Monitor => "MONITOR",
            SafetyStatus::Danger => "DANGER",
        }
    }
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SafetyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(SafetyStatus::Safe),
            "MONITOR" => Ok(SafetyStatus::Monitor),
            "DANGER" => Ok(SafetyStatus::Danger),
            other => Err(format!("unknown safety status '{}'", other)),
        }
    }
}

/// A single reading from one channel.
///
/// Events are values: the analytics and classification stages consume an event and
/// hand back a new one, so nothing downstream of the history sink ever sees a
/// reading change underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub value: f64,
    pub unit: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
    #[serde(default)]
    pub correlation_tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_status: Option<SafetyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl HealthEvent {
    /// Creates a bare event; the value is rounded to two decimals.
    pub fn new(
        timestamp: DateTime<Utc>,
        event_type: EventType,
        value: f64,
        unit: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            timestamp,
            event_type,
            value: round_to(value, 2),
            unit: unit.into(),
            urgency,
            metadata: Metadata::new(),
            trend: None,
            anomaly_score: None,
            correlation_tags: BTreeSet::new(),
            health_score: None,
            safety_status: None,
            reasoning: None,
        }
    }

    pub fn channel(&self) -> Channel {
        self.event_type.channel()
    }

    pub fn with_value_precision(mut self, decimals: i32) -> Self {
        self.value = round_to(self.value, decimals);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn with_anomaly_score(mut self, score: f64) -> Self {
        self.anomaly_score = Some(round_to(score.clamp(0.0, 1.0), 3));
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.correlation_tags.insert(tag.to_string());
        self
    }

    pub fn with_tags<'a, I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.correlation_tags.extend(tags.into_iter().map(str::to_string));
        self
    }

    pub fn with_health_score(mut self, score: f64) -> Self {
        self.health_score = Some(round_to(score.clamp(0.0, 100.0), 1));
        self
    }

    /// Attaches a safety verdict, producing the labeled event.
    pub fn labeled(mut self, status: SafetyStatus, reasoning: impl Into<String>) -> Self {
        self.safety_status = Some(status);
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn is_labeled(&self) -> bool {
        self.safety_status.is_some()
    }
}

/// Rounds half away from zero to the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_serializes_snake_case() {
        let json = serde_json::to_string(&EventType::HeartRateElevated).unwrap();
        assert_eq!(json, "\"heart_rate_elevated\"");
        assert_eq!(EventType::HeartRateElevated.as_str(), "heart_rate_elevated");
    }

    #[test]
    fn safety_status_parses_case_insensitively() {
        assert_eq!("danger".parse::<SafetyStatus>().unwrap(), SafetyStatus::Danger);
        assert_eq!(" MONITOR ".parse::<SafetyStatus>().unwrap(), SafetyStatus::Monitor);
        assert!("UNSURE".parse::<SafetyStatus>().is_err());
    }

    #[test]
    fn labeling_keeps_reading_fields() {
        let event = HealthEvent::new(Utc::now(), EventType::GlucoseDrop, 3.456, "mmol/L", Urgency::Critical)
            .with_tag("low_mood")
            .with_anomaly_score(0.91234);
        let labeled = event.clone().labeled(SafetyStatus::Danger, "low");

        assert_eq!(labeled.value, 3.46);
        assert_eq!(labeled.anomaly_score, Some(0.912));
        assert_eq!(labeled.correlation_tags, event.correlation_tags);
        assert_eq!(labeled.safety_status, Some(SafetyStatus::Danger));
        assert!(!event.is_labeled());
    }

    #[test]
    fn optional_fields_are_omitted_when_empty() {
        let event = HealthEvent::new(Utc::now(), EventType::ActivityLevel, 0.5, "normalized_score", Urgency::Low);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("trend").is_none());
        assert!(json.get("safety_status").is_none());
        assert_eq!(json["urgency"], "low");
    }
}
