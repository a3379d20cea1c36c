use super::SafetyClassifier;
use crate::error::VitalSimError;
use async_trait::async_trait;
use vitalsim_schemas::{
    classification::{ClassificationRequest, Verdict},
    event::{EventType, HealthEvent, SafetyStatus, Urgency},
};

/// Deterministic threshold rules. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, event: &HealthEvent) -> Verdict {
        let value = event.value;
        let (status, reasoning) = match event.event_type {
            EventType::GlucoseDrop if value < 3.5 => (
                SafetyStatus::Danger,
                "Critical hypoglycemia detected - immediate intervention required",
            ),
            EventType::GlucoseDrop if value < 4.0 => {
                (SafetyStatus::Danger, "Low blood glucose - intervention needed")
            }
            EventType::GlucoseDrop => {
                (SafetyStatus::Monitor, "Glucose trending low - monitor closely")
            }
            EventType::GlucoseSpike if value > 14.0 => {
                (SafetyStatus::Danger, "Severe hyperglycemia - medical attention needed")
            }
            EventType::GlucoseSpike if value > 11.0 => (
                SafetyStatus::Monitor,
                "Elevated blood glucose - monitor and consider insulin",
            ),
            EventType::GlucoseSpike => (
                SafetyStatus::Safe,
                "Slightly elevated glucose - within acceptable range",
            ),
            EventType::HeartRateElevated if value > 130.0 => (
                SafetyStatus::Monitor,
                "Elevated heart rate - may indicate stress or medical event",
            ),
            EventType::HeartRateElevated | EventType::HeartRateNormal => {
                (SafetyStatus::Safe, "Heart rate within normal range")
            }
            EventType::MoodIndicator if value < 0.3 => (
                SafetyStatus::Monitor,
                "Low mood detected - may indicate hypoglycemia or fatigue",
            ),
            EventType::MoodIndicator => (SafetyStatus::Safe, "Mood indicators normal"),
            _ => match event.urgency {
                Urgency::Critical => (
                    SafetyStatus::Danger,
                    "Critical event detected - immediate attention required",
                ),
                Urgency::High => (SafetyStatus::Monitor, "High urgency event - monitor closely"),
                Urgency::Medium | Urgency::Low => {
                    (SafetyStatus::Safe, "Event within normal parameters")
                }
            },
        };
        Verdict::new(status, reasoning)
    }
}

#[async_trait]
impl SafetyClassifier for RuleBasedClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError> {
        Ok(self.evaluate(&request.event))
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn verdict(event_type: EventType, value: f64, urgency: Urgency) -> SafetyStatus {
        let event = HealthEvent::new(Utc::now(), event_type, value, "unit", urgency);
        RuleBasedClassifier::new().evaluate(&event).status
    }

    #[test]
    fn glucose_rules() {
        assert_eq!(verdict(EventType::GlucoseDrop, 3.2, Urgency::Critical), SafetyStatus::Danger);
        assert_eq!(verdict(EventType::GlucoseDrop, 3.8, Urgency::High), SafetyStatus::Danger);
        assert_eq!(verdict(EventType::GlucoseDrop, 4.2, Urgency::Medium), SafetyStatus::Monitor);
        assert_eq!(verdict(EventType::GlucoseSpike, 15.0, Urgency::Critical), SafetyStatus::Danger);
        assert_eq!(verdict(EventType::GlucoseSpike, 12.0, Urgency::High), SafetyStatus::Monitor);
        assert_eq!(verdict(EventType::GlucoseSpike, 9.5, Urgency::Medium), SafetyStatus::Safe);
    }

    #[test]
    fn heart_rate_and_mood_rules() {
        assert_eq!(verdict(EventType::HeartRateElevated, 135.0, Urgency::Medium), SafetyStatus::Monitor);
        assert_eq!(verdict(EventType::HeartRateElevated, 125.0, Urgency::Medium), SafetyStatus::Safe);
        assert_eq!(verdict(EventType::HeartRateNormal, 95.0, Urgency::Low), SafetyStatus::Safe);
        assert_eq!(verdict(EventType::MoodIndicator, 0.25, Urgency::Medium), SafetyStatus::Monitor);
        assert_eq!(verdict(EventType::MoodIndicator, 0.6, Urgency::Low), SafetyStatus::Safe);
    }

    #[test]
    fn other_events_fall_back_to_urgency() {
        assert_eq!(verdict(EventType::MedicationDue, 6.0, Urgency::Critical), SafetyStatus::Danger);
        assert_eq!(verdict(EventType::AsthmaRisk, 0.8, Urgency::High), SafetyStatus::Monitor);
        assert_eq!(verdict(EventType::HeartRateLow, 65.0, Urgency::Medium), SafetyStatus::Safe);

        let event = HealthEvent::new(Utc::now(), EventType::ActivityLevel, 0.5, "normalized_score", Urgency::Low);
        assert_eq!(
            RuleBasedClassifier::new().evaluate(&event).reasoning,
            "Event within normal parameters"
        );
    }
}
