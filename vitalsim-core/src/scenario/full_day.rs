use super::ScenarioScript;
use vitalsim_schemas::event::{EventType, SafetyStatus, Trend, Urgency};

const MMOL: &str = "mmol/L";
const BPM: &str = "bpm";
const SCORE: &str = "normalized_score";

const SCHOOL_DAY_PHASES: [(&str, &str); 10] = [
    ("morning", "Waking up, getting ready for school"),
    ("breakfast", "Breakfast - expect glucose rise"),
    ("school_morning", "Morning classes"),
    ("recess", "Active play during recess"),
    ("lunch", "Lunch time - glucose spike expected"),
    ("school_afternoon", "Afternoon classes"),
    ("after_school", "After school activities"),
    ("dinner", "Dinner time"),
    ("evening", "Evening wind-down"),
    ("bedtime", "Getting ready for bed"),
];

pub(super) fn healthy_school_day(s: &mut ScenarioScript) {
    let glucose = s.baselines.glucose;
    let heart_rate = s.baselines.heart_rate;

    for (phase, description) in SCHOOL_DAY_PHASES {
        match phase {
            "morning" => {
                let value = glucose + s.uniform(-0.3, 0.3);
                s.push(
                    s.event(EventType::GlucoseNormal, value, MMOL, Urgency::Low)
                        .with_health_score(85.0)
                        .with_metadata("phase", phase)
                        .with_metadata("time_context", "morning")
                        .labeled(
                            SafetyStatus::Safe,
                            format!("Morning glucose check - normal range. {}", description),
                        ),
                );
            }
            "breakfast" | "lunch" | "dinner" => {
                let value = glucose + s.uniform(2.0, 3.5);
                s.push(
                    s.event(EventType::GlucoseSpike, value, MMOL, Urgency::Low)
                        .with_health_score(75.0)
                        .with_trend(Trend::Rising)
                        .with_tag("post_meal")
                        .with_metadata("phase", phase)
                        .with_metadata("meal_effect", 2.5)
                        .labeled(
                            SafetyStatus::Safe,
                            format!("Post-meal glucose rise - this is normal. {}", description),
                        ),
                );
            }
            "recess" => {
                let activity = s.uniform(0.7, 0.9);
                s.push(
                    s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
                        .with_health_score(95.0)
                        .with_tag("high_activity")
                        .with_metadata("phase", phase)
                        .with_metadata("movement_type", "running")
                        .with_metadata("steps_per_minute", 110)
                        .labeled(
                            SafetyStatus::Safe,
                            format!("Great physical activity! {}", description),
                        ),
                );
                let value = heart_rate + s.uniform(20.0, 35.0);
                s.push(
                    s.event(EventType::HeartRateElevated, value, BPM, Urgency::Low)
                        .with_health_score(90.0)
                        .with_metadata("phase", phase)
                        .with_metadata("activity_level", 0.8)
                        .labeled(
                            SafetyStatus::Safe,
                            "Elevated heart rate due to physical activity - healthy response.",
                        ),
                );
            }
            "school_morning" | "school_afternoon" => {
                let mood = s.uniform(0.6, 0.8);
                s.push(
                    s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
                        .with_health_score(88.0)
                        .with_metadata("phase", phase)
                        .with_metadata("context", "school_activity")
                        .labeled(
                            SafetyStatus::Safe,
                            format!("Child engaged in learning. {}", description),
                        ),
                );
            }
            "after_school" => {
                let activity = s.uniform(0.5, 0.7);
                s.push(
                    s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
                        .with_health_score(90.0)
                        .with_metadata("phase", phase)
                        .with_metadata("movement_type", "walking")
                        .labeled(
                            SafetyStatus::Safe,
                            format!("Steady activity. {}", description),
                        ),
                );
            }
            "evening" => {
                let activity = s.uniform(0.3, 0.5);
                s.push(
                    s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
                        .with_health_score(85.0)
                        .with_metadata("phase", phase)
                        .with_metadata("movement_type", "sedentary")
                        .labeled(SafetyStatus::Safe, "Winding down for the evening."),
                );
            }
            _ => {
                let value = glucose + s.uniform(-0.2, 0.5);
                s.push(
                    s.event(EventType::GlucoseNormal, value, MMOL, Urgency::Low)
                        .with_health_score(90.0)
                        .with_metadata("phase", phase)
                        .with_metadata("time_context", "bedtime")
                        .labeled(
                            SafetyStatus::Safe,
                            "Bedtime glucose check - good levels for overnight.",
                        ),
                );
            }
        }
    }
}

/// Fever, illness-driven glucose swings, low activity and mood, a hydration reminder.
pub(super) fn sick_day(s: &mut ScenarioScript) {
    s.push(
        s.event(EventType::TemperatureAnomaly, 38.2, "celsius", Urgency::Medium)
            .with_health_score(55.0)
            .with_tags(["fever", "illness"])
            .with_metadata("baseline_temp", s.baselines.temperature)
            .labeled(
                SafetyStatus::Monitor,
                "Elevated temperature detected. Child may be unwell.",
            ),
    );

    for _ in 0..3 {
        let glucose = (s.baselines.glucose + s.uniform(-1.0, 2.5)).clamp(3.5, 12.0);
        let in_range = (4.0..=9.0).contains(&glucose);
        let event_type = if glucose > 7.0 {
            EventType::GlucoseSpike
        } else if glucose >= 4.0 {
            EventType::GlucoseNormal
        } else {
            EventType::GlucoseDrop
        };
        let (urgency, status, health) = if in_range {
            (Urgency::Low, SafetyStatus::Safe, 60.0)
        } else {
            (Urgency::Medium, SafetyStatus::Monitor, 45.0)
        };

        s.push(
            s.event(event_type, glucose, MMOL, urgency)
                .with_health_score(health)
                .with_trend(Trend::Volatile)
                .with_tag("illness_effect")
                .with_metadata("illness_impact", true)
                .labeled(
                    status,
                    "Glucose levels may be more variable during illness. Monitor closely.",
                ),
        );
    }

    let activity = s.uniform(0.1, 0.25);
    s.push(
        s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
            .with_health_score(50.0)
            .with_metadata("movement_type", "sedentary")
            .with_metadata("sleep_state", "light_sleep")
            .labeled(
                SafetyStatus::Safe,
                "Low activity - expected when unwell. Rest is important.",
            ),
    );

    let mood = s.uniform(0.3, 0.45);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Medium)
            .with_health_score(55.0)
            .with_tag("illness_effect")
            .with_metadata("context", "unwell")
            .labeled(
                SafetyStatus::Monitor,
                "Child may be feeling down due to illness. Extra comfort recommended.",
            ),
    );

    s.push(
        s.event(EventType::HydrationLevel, 0.5, SCORE, Urgency::Medium)
            .with_health_score(60.0)
            .with_metadata("reminder", "encourage_fluids")
            .labeled(
                SafetyStatus::Monitor,
                "Hydration is important when sick. Encourage fluids.",
            ),
    );
}

pub(super) fn active_play_day(s: &mut ScenarioScript) {
    for _ in 0..4 {
        let activity = s.uniform(0.7, 0.95);
        s.push(
            s.event(EventType::ActivityLevel, activity, SCORE, Urgency::Low)
                .with_health_score(95.0)
                .with_tags(["high_activity", "exercise"])
                .with_metadata("movement_type", "running")
                .with_metadata("steps_per_minute", (activity * 120.0).trunc())
                .labeled(
                    SafetyStatus::Safe,
                    "Excellent physical activity! Exercise is great for health.",
                ),
        );

        let heart_rate = s.baselines.heart_rate + s.uniform(25.0, 45.0);
        s.push(
            s.event(EventType::HeartRateElevated, heart_rate, BPM, Urgency::Low)
                .with_health_score(90.0)
                .with_tag("exercise_response")
                .with_metadata("activity_level", activity)
                .labeled(
                    SafetyStatus::Safe,
                    "Heart rate elevated due to exercise - this is healthy!",
                ),
        );
    }

    // Exercise pulls glucose down; below 4.5 a snack is worth suggesting.
    let glucose = s.baselines.glucose - s.uniform(0.8, 1.5);
    let low = glucose < 4.5;
    let (event_type, urgency, status, health, reasoning) = if low {
        (
            EventType::GlucoseDrop,
            Urgency::Medium,
            SafetyStatus::Monitor,
            55.0,
            "Exercise lowers blood glucose. Consider a snack if continuing activity.",
        )
    } else {
        (
            EventType::GlucoseNormal,
            Urgency::Low,
            SafetyStatus::Safe,
            70.0,
            "Glucose is good after exercise.",
        )
    };
    s.push(
        s.event(event_type, glucose, MMOL, urgency)
            .with_health_score(health)
            .with_trend(Trend::Falling)
            .with_tag("exercise_effect")
            .with_metadata("exercise_impact", true)
            .labeled(status, reasoning),
    );

    let mood = s.uniform(0.8, 0.95);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
            .with_health_score(98.0)
            .with_tag("positive_activity")
            .with_metadata("context", "play_activity")
            .with_metadata("interaction_quality", "high")
            .labeled(
                SafetyStatus::Safe,
                "Child is having a great time! Physical play boosts mood.",
            ),
    );
}

pub(super) fn stressful_test_day(s: &mut ScenarioScript) {
    s.push(
        s.event(EventType::StressIndicator, 0.65, SCORE, Urgency::Medium)
            .with_health_score(60.0)
            .with_tag("pre_test_anxiety")
            .with_metadata("source", "behavioral_analysis")
            .with_metadata("context", "school_test")
            .labeled(
                SafetyStatus::Monitor,
                "Child appears stressed - may be nervous about school test.",
            ),
    );

    let heart_rate = s.baselines.heart_rate + s.uniform(15.0, 25.0);
    s.push(
        s.event(EventType::HeartRateElevated, heart_rate, BPM, Urgency::Low)
            .with_health_score(65.0)
            .with_tag("stress_response")
            .with_metadata("activity_level", 0.2)
            .with_metadata("stress_level", 0.65)
            .labeled(
                SafetyStatus::Safe,
                "Slightly elevated heart rate - could be test-related anxiety.",
            ),
    );

    let glucose = s.baselines.glucose + s.uniform(1.0, 2.0);
    s.push(
        s.event(EventType::GlucoseSpike, glucose, MMOL, Urgency::Low)
            .with_health_score(70.0)
            .with_trend(Trend::Rising)
            .with_tag("stress_response")
            .with_metadata("stress_impact", true)
            .labeled(
                SafetyStatus::Safe,
                "Stress can raise blood glucose. This is a normal body response.",
            ),
    );

    let mood = s.uniform(0.4, 0.55);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
            .with_health_score(65.0)
            .with_metadata("context", "concentration")
            .with_metadata("interaction_quality", "medium")
            .labeled(
                SafetyStatus::Safe,
                "Child seems focused but slightly anxious. Normal for test situations.",
            ),
    );

    let mood = s.uniform(0.7, 0.85);
    s.push(
        s.event(EventType::MoodIndicator, mood, SCORE, Urgency::Low)
            .with_health_score(85.0)
            .with_trend(Trend::Rising)
            .with_tag("stress_relief")
            .with_metadata("context", "post_test_relief")
            .with_metadata("interaction_quality", "high")
            .labeled(
                SafetyStatus::Safe,
                "Test is over! Child seems relieved and happier.",
            ),
    );

    s.push(
        s.event(EventType::StressIndicator, 0.25, SCORE, Urgency::Low)
            .with_health_score(90.0)
            .with_trend(Trend::Falling)
            .with_metadata("context", "relaxed")
            .labeled(
                SafetyStatus::Safe,
                "Stress levels back to normal after test completion.",
            ),
    );
}

#[cfg(test)]
mod tests {
    use crate::{profile::derive_baselines, scenario::get_scenario};
    use chrono::Utc;
    use vitalsim_schemas::{event::SafetyStatus, profile::Condition};

    #[test]
    fn school_day_covers_every_phase() {
        let baselines = derive_baselines(8, Condition::Diabetes);
        let events = get_scenario("healthy_school_day").unwrap().generate(&baselines, None, Utc::now());

        assert_eq!(events.len(), 11);
        assert!(events.iter().all(|e| e.safety_status == Some(SafetyStatus::Safe)));
        let phases: Vec<_> = events
            .iter()
            .filter_map(|e| e.metadata.get("phase").and_then(|p| p.as_str()))
            .collect();
        assert_eq!(phases.first(), Some(&"morning"));
        assert_eq!(phases.last(), Some(&"bedtime"));
    }

    #[test]
    fn sick_day_glucose_stays_within_illness_band() {
        let baselines = derive_baselines(10, Condition::Both);
        let events = get_scenario("sick_day").unwrap().generate(&baselines, None, Utc::now());

        for event in events.iter().filter(|e| e.unit == "mmol/L") {
            assert!((3.5..=12.0).contains(&event.value));
        }
        assert_eq!(events.len(), 7);
    }
}
