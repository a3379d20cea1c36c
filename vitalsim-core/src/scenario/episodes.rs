use super::ScenarioScript;
use vitalsim_schemas::event::{EventType, SafetyStatus, Trend, Urgency};

const MMOL: &str = "mmol/L";
const BPM: &str = "bpm";
const SCORE: &str = "normalized_score";
const RISK: &str = "risk_score";

/// Initial drop, `count - 3` critical lows each paired with a mood drop, then recovery.
pub(super) fn hypoglycemia_episode(s: &mut ScenarioScript) {
    let glucose = s.baselines.glucose - s.uniform(0.5, 1.0);
    s.push(
        s.event(EventType::GlucoseDrop, glucose, MMOL, Urgency::Medium)
            .with_health_score(65.0)
            .with_trend(Trend::Falling)
            .with_anomaly_score(0.4)
            .with_tag("trending_low")
            .with_metadata("phase", "initial_drop")
            .with_metadata("device", "cgm")
            .labeled(
                SafetyStatus::Monitor,
                "Glucose trending downward. Monitor for hypoglycemia symptoms.",
            ),
    );

    for i in 0..s.event_count.saturating_sub(3) {
        let glucose = s.uniform(3.2, 3.8);
        let mood = s.uniform(0.2, 0.4);

        s.push(
            s.event(EventType::GlucoseDrop, glucose, MMOL, Urgency::Critical)
                .with_health_score(35.0)
                .with_trend(if i == 0 { Trend::Falling } else { Trend::Stable })
                .with_anomaly_score(0.85)
                .with_tags(["hypoglycemia", "low_mood", "fatigue"])
                .with_metadata("phase", "critical")
                .with_metadata("requires_intervention", true)
                .labeled(
                    SafetyStatus::Danger,
                    "Critical hypoglycemia detected. Immediate intervention needed - provide fast-acting glucose.",
                ),
        );
        s.push(
            s.event(EventType::MoodIndicator, mood, SCORE, Urgency::High)
                .with_health_score(40.0)
                .with_tag("hypoglycemia_symptom")
                .with_metadata("context", "hypoglycemia_effect")
                .labeled(
                    SafetyStatus::Monitor,
                    "Low mood likely caused by hypoglycemia. Child may feel shaky, confused, or irritable.",
                ),
        );
    }

    let glucose = s.uniform(4.5, 5.5);
    s.push(
        s.event(EventType::GlucoseNormal, glucose, MMOL, Urgency::Low)
            .with_health_score(75.0)
            .with_trend(Trend::Rising)
            .with_anomaly_score(0.2)
            .with_tag("recovering")
            .with_metadata("phase", "recovery")
            .labeled(
                SafetyStatus::Safe,
                "Glucose recovering to normal range after treatment.",
            ),
    );
}

/// Post-meal rise, a peak, then `count - 2` readings on the way back down.
pub(super) fn hyperglycemia_spike(s: &mut ScenarioScript) {
    let glucose = s.uniform(9.0, 11.0);
    s.push(
        s.event(EventType::GlucoseSpike, glucose, MMOL, Urgency::Medium)
            .with_health_score(60.0)
            .with_trend(Trend::Rising)
            .with_anomaly_score(0.5)
            .with_tag("post_meal")
            .with_metadata("phase", "rising")
            .with_metadata("meal_effect", 2.5)
            .labeled(
                SafetyStatus::Monitor,
                "Post-meal glucose spike detected. This is typical after eating.",
            ),
    );

    let glucose = s.uniform(11.0, 14.0);
    s.push(
        s.event(EventType::GlucoseSpike, glucose, MMOL, Urgency::High)
            .with_health_score(50.0)
            .with_anomaly_score(0.7)
            .with_tags(["hyperglycemia", "needs_monitoring"])
            .with_metadata("phase", "peak")
            .with_metadata("above_target", true)
            .labeled(
                SafetyStatus::Monitor,
                "Glucose at peak. Consider insulin correction if prescribed.",
            ),
    );

    for i in 0..s.event_count.saturating_sub(2) {
        let step = i as f64;
        let glucose = (s.uniform(7.0, 10.0) - step * 1.5).max(5.5);
        let settled = glucose < 9.0;

        let event_type = if glucose > 9.0 { EventType::GlucoseSpike } else { EventType::GlucoseNormal };
        let (urgency, status, tag, reasoning) = if settled {
            (Urgency::Low, SafetyStatus::Safe, "recovering", "Glucose returning to normal range.")
        } else {
            (
                Urgency::Medium,
                SafetyStatus::Monitor,
                "still_elevated",
                "Glucose still elevated but trending down.",
            )
        };

        s.push(
            s.event(event_type, glucose, MMOL, urgency)
                .with_health_score(70.0 + step * 5.0)
                .with_trend(Trend::Falling)
                .with_anomaly_score(0.3 - step * 0.1)
                .with_tag(tag)
                .with_metadata("phase", "declining")
                .labeled(status, reasoning),
        );
    }
}

pub(super) fn asthma_trigger(s: &mut ScenarioScript) {
    s.push(
        s.event(EventType::EnvironmentalTrigger, 0.75, RISK, Urgency::Medium)
            .with_health_score(65.0)
            .with_tags(["high_pollen", "trigger_detected"])
            .with_metadata("pollen_count", 0.8)
            .with_metadata("air_quality_index", 55)
            .with_metadata("location", "outdoor")
            .labeled(
                SafetyStatus::Monitor,
                "High pollen count detected in the environment. Asthma risk increasing.",
            ),
    );

    for i in 0..2 {
        let risk = 0.6 + f64::from(i) * 0.15;
        let respiratory_rate = 26 + i * 3;
        let reasoning = if i == 0 {
            "Asthma symptoms developing. Consider preventive inhaler use."
        } else {
            "Significant asthma risk. Use rescue inhaler if prescribed."
        };
        let status = if risk > 0.7 { SafetyStatus::Danger } else { SafetyStatus::Monitor };

        s.push(
            s.event(EventType::AsthmaRisk, risk, RISK, Urgency::High)
                .with_health_score(50.0 - f64::from(i) * 10.0)
                .with_trend(Trend::Rising)
                .with_anomaly_score(risk)
                .with_tags(["high_pollen", "elevated_respiratory_rate"])
                .with_metadata("respiratory_rate", respiratory_rate)
                .with_metadata("pollen_count", 0.8)
                .with_metadata("air_quality_index", 50)
                .labeled(status, reasoning),
        );
    }

    let spo2 = s.uniform(94.0, 96.0);
    s.push(
        s.event(EventType::OxygenSaturation, spo2, "%", Urgency::High)
            .with_health_score(45.0)
            .with_trend(Trend::Falling)
            .with_anomaly_score(0.75)
            .with_tags(["asthma_episode", "low_oxygen"])
            .with_metadata("perfusion_index", 2.1)
            .labeled(
                SafetyStatus::Danger,
                "Oxygen saturation dropping. This requires immediate attention.",
            ),
    );

    s.push(
        s.event(EventType::AsthmaRisk, 0.3, RISK, Urgency::Low)
            .with_health_score(80.0)
            .with_trend(Trend::Falling)
            .with_anomaly_score(0.2)
            .with_tag("recovering")
            .with_metadata("respiratory_rate", 22)
            .with_metadata("treatment_given", true)
            .labeled(
                SafetyStatus::Safe,
                "Asthma symptoms subsiding after treatment. Continue monitoring.",
            ),
    );
}

pub(super) fn anxiety_episode(s: &mut ScenarioScript) {
    let heart_rate = s.baselines.heart_rate + s.uniform(25.0, 35.0);
    s.push(
        s.event(EventType::HeartRateElevated, heart_rate, BPM, Urgency::Medium)
            .with_health_score(60.0)
            .with_trend(Trend::Rising)
            .with_anomaly_score(0.5)
            .with_tag("stress_indicator")
            .with_metadata("activity_level", 0.3)
            .with_metadata("stress_level", 0.7)
            .labeled(
                SafetyStatus::Monitor,
                "Elevated heart rate detected. May indicate stress or anxiety.",
            ),
    );

    let mood = s.uniform(0.25, 0.35);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::High)
            .with_health_score(50.0)
            .with_tags(["high_stress", "elevated_heart_rate"])
            .with_metadata("context", "stress_observed")
            .with_metadata("facial_expression_score", 0.3)
            .with_metadata("interaction_quality", "low")
            .labeled(
                SafetyStatus::Monitor,
                "Child appears anxious or upset. Consider checking in with them.",
            ),
    );

    s.push(
        s.event(EventType::StressIndicator, 0.8, SCORE, Urgency::High)
            .with_health_score(45.0)
            .with_tags(["anxiety_episode", "needs_support"])
            .with_metadata("source", "behavioral_analysis")
            .labeled(
                SafetyStatus::Monitor,
                "High stress levels detected. Child may benefit from calming activities.",
            ),
    );

    let mood = s.uniform(0.55, 0.65);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
            .with_health_score(75.0)
            .with_trend(Trend::Rising)
            .with_tag("recovering")
            .with_metadata("context", "calming_activity")
            .with_metadata("interaction_quality", "medium")
            .labeled(SafetyStatus::Safe, "Child is calming down. Mood improving."),
    );
}

pub(super) fn healthy_reading(s: &mut ScenarioScript) {
    let glucose = s.baselines.glucose + s.uniform(-0.5, 0.5);
    let time_of_day = s.start().format("%H:%M").to_string();
    s.push(
        s.event(EventType::GlucoseNormal, glucose, MMOL, Urgency::Low)
            .with_health_score(90.0)
            .with_metadata("device", "cgm")
            .with_metadata("time_of_day", time_of_day)
            .labeled(
                SafetyStatus::Safe,
                "Glucose levels are excellent. Keep up the good work!",
            ),
    );

    let heart_rate = s.baselines.heart_rate + s.uniform(-5.0, 10.0);
    s.push(
        s.event(EventType::HeartRateNormal, heart_rate, BPM, Urgency::Low)
            .with_health_score(92.0)
            .with_metadata("activity_level", 0.4)
            .labeled(SafetyStatus::Safe, "Heart rate is normal and healthy."),
    );

    let mood = s.uniform(0.7, 0.9);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
            .with_health_score(95.0)
            .with_metadata("context", "play_activity")
            .with_metadata("interaction_quality", "high")
            .labeled(
                SafetyStatus::Safe,
                "Child is in a great mood! Everything looks good.",
            ),
    );

    let activity = s.uniform(0.5, 0.7);
    s.push(
        s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
            .with_health_score(93.0)
            .with_metadata("movement_type", "walking")
            .with_metadata("steps_per_minute", 80)
            .labeled(
                SafetyStatus::Safe,
                "Healthy activity level. Child is active and engaged.",
            ),
    );
}
