use super::{
    clock::Clock,
    state::{
        clamp_to, PhysiologicalState, RollingWindow, Statistics, GLUCOSE_RANGE, HEART_RATE_RANGE,
        RESPIRATORY_RATE_RANGE, SPO2_RANGE, UNIT_RANGE,
    },
};
use crate::{
    analysis::{compute_anomaly_score, compute_health_score, compute_trend},
    profile::SubjectProfile,
};
use chrono::{DateTime, Local, Timelike, Utc};
use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, Rng};
use std::f64::consts::PI;
use tracing::debug;
use vitalsim_schemas::{
    classification::{RecentEvent, StateSnapshot},
    environment::SleepState,
    event::{round_to, Channel, EventType, HealthEvent, Trend, Urgency},
};

/// Relative dispatch weights of the generated channels.
pub const CHANNEL_WEIGHTS: [(Channel, u32); 7] = [
    (Channel::Glucose, 35),
    (Channel::HeartRate, 20),
    (Channel::Mood, 15),
    (Channel::Medication, 10),
    (Channel::AsthmaRisk, 8),
    (Channel::OxygenSaturation, 7),
    (Channel::Activity, 5),
];

/// Glucose anomaly scoring uses a fixed population reference, not the subject's baseline.
const GLUCOSE_REFERENCE: f64 = 5.5;
const GLUCOSE_NORMAL_RANGE: (f64, f64) = (4.0, 7.0);
const HEART_RATE_NORMAL_RANGE: (f64, f64) = (70.0, 110.0);

/// Glucose noise multiplier for the hour of day (meals and dawn phenomenon).
pub fn glucose_time_factor(hour: u32) -> f64 {
    match hour {
        8..=9 => 1.3,
        12..=13 => 1.4,
        18..=19 => 1.3,
        2..=6 => 1.2,
        _ => 1.0,
    }
}

/// Generates events for one subject and owns that subject's physiological state.
pub struct SimulationEngine {
    pub(super) profile: SubjectProfile,
    pub(super) state: PhysiologicalState,
    pub(super) rng: StdRng,
    pub(super) clock: Box<dyn Clock>,
    pub(super) channel_picker: WeightedIndex<u32>,
}

impl SimulationEngine {
    /// Picks a channel by weight, generates one event for it and records it
    /// in the statistics and event history.
    pub fn generate_random_event(&mut self) -> HealthEvent {
        let event = self.sample_random_event();
        self.record_generated(&event);
        event
    }

    /// Like [`generate_random_event`](Self::generate_random_event), but the
    /// event is not counted or remembered. The caller commits it later with
    /// [`record_labeled`](Self::record_labeled).
    pub fn sample_random_event(&mut self) -> HealthEvent {
        let (channel, _) = CHANNEL_WEIGHTS[self.channel_picker.sample(&mut self.rng)];
        self.produce(channel)
    }

    /// Generates an event on a specific channel. Returns `None` for channels
    /// that only appear in scripted scenarios.
    pub fn generate(&mut self, channel: Channel) -> Option<HealthEvent> {
        if CHANNEL_WEIGHTS.iter().any(|(c, _)| *c == channel) {
            let event = self.produce(channel);
            self.record_generated(&event);
            Some(event)
        } else {
            None
        }
    }

    fn produce(&mut self, channel: Channel) -> HealthEvent {
        let event = match channel {
            Channel::Glucose => self.generate_glucose_event(),
            Channel::HeartRate => self.generate_heart_rate_event(),
            Channel::Mood => self.generate_mood_event(),
            Channel::Medication => self.generate_medication_event(),
            Channel::AsthmaRisk => self.generate_asthma_risk_event(),
            Channel::OxygenSaturation => self.generate_oxygen_saturation_event(),
            _ => self.generate_activity_event(),
        };

        debug!(
            subject = %self.state.subject_id,
            event_type = %event.event_type,
            value = event.value,
            urgency = event.urgency.as_str(),
            "generated event"
        );
        event
    }

    fn record_generated(&mut self, event: &HealthEvent) {
        self.state.statistics.record_generated(event);
        self.state.event_history.push(event.clone());
    }

    pub fn generate_glucose_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let time_factor = glucose_time_factor(now.hour());
        let noise = self.rng.gen_range(-1.5..=1.5);
        let activity_effect = -self.state.activity * 0.5;

        let medication_effect = if self.state.hours_since_medication(now) < 2.0 { -0.3 } else { 0.0 };
        let hours_since_meal = self.state.hours_since_meal(now);
        let meal_effect = if hours_since_meal < 4.0 {
            1.5 * (-hours_since_meal / 2.0).exp()
        } else {
            0.0
        };

        let change = time_factor * noise + activity_effect + medication_effect + meal_effect;
        self.state.glucose = clamp_to(self.state.glucose + change, GLUCOSE_RANGE);
        self.state.glucose_history.push(self.state.glucose);

        let glucose = self.state.glucose;
        let trend = window_trend(&self.state.glucose_history);
        let anomaly = compute_anomaly_score(glucose, GLUCOSE_REFERENCE, GLUCOSE_NORMAL_RANGE);

        let (event_type, urgency) = if glucose < 3.5 {
            (EventType::GlucoseDrop, Urgency::Critical)
        } else if glucose < 4.0 {
            (EventType::GlucoseDrop, Urgency::High)
        } else if glucose > 14.0 {
            (EventType::GlucoseSpike, Urgency::Critical)
        } else if glucose > 11.0 {
            (EventType::GlucoseSpike, Urgency::High)
        } else if glucose > 9.0 {
            (EventType::GlucoseSpike, Urgency::Medium)
        } else {
            (EventType::GlucoseNormal, Urgency::Low)
        };

        let mut tags = Vec::new();
        if self.state.heart_rate > 110.0 {
            tags.push("elevated_heart_rate");
        }
        if self.state.mood < 0.4 {
            tags.push("low_mood");
        }
        if self.state.activity > 0.7 {
            tags.push("high_activity");
        }

        HealthEvent::new(self.timestamp(now), event_type, glucose, "mmol/L", urgency)
            .with_metadata("device", "continuous_glucose_monitor_v2")
            .with_metadata("device_id", self.device_id("CGM"))
            .with_metadata("age_group", self.age_group())
            .with_metadata("time_of_day", now.format("%H:%M").to_string())
            .with_metadata("meal_effect", round_to(meal_effect, 2))
            .with_metadata("activity_effect", round_to(activity_effect, 2))
            .with_metadata("medication_effect", round_to(medication_effect, 2))
            .with_trend(trend)
            .with_anomaly_score(anomaly)
            .with_tags(tags)
            .with_health_score(self.health_score())
    }

    pub fn generate_heart_rate_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let change = self.rng.gen_range(-15.0..=20.0);
        self.state.heart_rate = clamp_to(self.state.heart_rate + change, HEART_RATE_RANGE);
        self.state.heart_rate_history.push(self.state.heart_rate);

        let heart_rate = self.state.heart_rate;
        let (event_type, urgency) = if heart_rate > 120.0 {
            (EventType::HeartRateElevated, Urgency::Medium)
        } else if heart_rate < 70.0 {
            (EventType::HeartRateLow, Urgency::Medium)
        } else {
            (EventType::HeartRateNormal, Urgency::Low)
        };
        let anomaly = compute_anomaly_score(
            heart_rate,
            self.state.baselines.heart_rate,
            HEART_RATE_NORMAL_RANGE,
        );

        let mut event = HealthEvent::new(self.timestamp(now), event_type, heart_rate, "bpm", urgency)
            .with_value_precision(0)
            .with_metadata("device", "wearable_heart_rate_monitor")
            .with_metadata("device_id", self.device_id("HR"))
            .with_metadata("age_group", self.age_group())
            .with_trend(window_trend(&self.state.heart_rate_history))
            .with_anomaly_score(anomaly)
            .with_health_score(self.health_score());
        if self.state.activity > 0.7 {
            event = event.with_tag("high_activity");
        }
        if self.state.stress > 0.7 {
            event = event.with_tag("high_stress");
        }
        event
    }

    pub fn generate_mood_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let glucose = self.state.glucose;
        let glucose_effect = if glucose < 3.5 {
            -0.5
        } else if glucose < 4.0 {
            -0.3
        } else if glucose > 11.0 {
            -0.2
        } else {
            0.0
        };
        let activity_effect = self.state.activity * 0.2;
        let stress_effect = -self.state.stress * 0.3;
        let sleep_effect = match self.state.sleep_state {
            SleepState::DeepSleep => 0.2,
            SleepState::LightSleep => -0.1,
            SleepState::Awake => 0.0,
        };

        let change = self.rng.gen_range(-0.15..=0.15)
            + glucose_effect
            + activity_effect
            + stress_effect
            + sleep_effect;
        self.state.mood = clamp_to(self.state.mood + change, UNIT_RANGE);
        let mood = self.state.mood;

        let urgency = if mood < 0.2 {
            Urgency::High
        } else if mood < 0.3 {
            Urgency::Medium
        } else {
            Urgency::Low
        };
        let context = if mood > 0.6 {
            "play_activity"
        } else if mood < 0.4 {
            "fatigue_observed"
        } else {
            "normal_activity"
        };
        let interaction_quality = if mood > 0.7 {
            "high"
        } else if mood > 0.4 {
            "medium"
        } else {
            "low"
        };
        let voice_tone = round_to(mood + self.rng.gen_range(-0.1..=0.1), 2);
        let anomaly = if mood < 0.4 { 1.0 - mood } else { 0.2 };

        let mut event = HealthEvent::new(
            self.timestamp(now),
            EventType::MoodIndicator,
            mood,
            "normalized_score",
            urgency,
        )
        .with_metadata("device", "behavioral_ai_analyzer")
        .with_metadata("device_id", self.device_id("MOOD"))
        .with_metadata("context", context)
        .with_metadata("facial_expression_score", round_to(mood, 2))
        .with_metadata("voice_tone_score", voice_tone)
        .with_metadata("interaction_quality", interaction_quality)
        .with_trend(Trend::Stable)
        .with_anomaly_score(anomaly)
        .with_health_score(self.health_score());

        if glucose < 4.0 {
            event = event.with_tag("hypoglycemia_symptom");
        }
        if self.state.stress > 0.7 {
            event = event.with_tag("high_stress");
        }
        event
    }

    pub fn generate_medication_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let hours_since = self.state.hours_since_medication(now);
        let glucose = self.state.glucose;

        let base_urgency = if hours_since > 5.0 {
            Urgency::High
        } else if hours_since > 4.0 {
            Urgency::Medium
        } else {
            Urgency::Low
        };
        let urgency = if glucose > 11.0 {
            if base_urgency == Urgency::High {
                Urgency::Critical
            } else {
                Urgency::High
            }
        } else if glucose > 9.0 && base_urgency == Urgency::Medium {
            Urgency::High
        } else {
            base_urgency
        };

        let recommended_action = if glucose > 9.0 { "administer_insulin" } else { "scheduled_dose" };
        let mut event = HealthEvent::new(
            self.timestamp(now),
            EventType::MedicationDue,
            hours_since,
            "hours_since_last_dose",
            urgency,
        )
        .with_metadata("device", "smart_medication_tracker")
        .with_metadata("device_id", self.device_id("MED"))
        .with_metadata("medication_type", "insulin")
        .with_metadata("dosage", "5 units")
        .with_metadata("scheduled_time", true)
        .with_metadata("glucose_at_reminder", round_to(glucose, 2))
        .with_metadata("recommended_action", recommended_action)
        .with_trend(Trend::Stable)
        .with_anomaly_score(if hours_since > 5.0 { 0.3 } else { 0.1 })
        .with_health_score(self.health_score());

        if glucose > 9.0 {
            event = event.with_tag("hyperglycemia_present");
        }
        event
    }

    pub fn generate_asthma_risk_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let environment = self.state.environment;
        let pollen_effect = environment.pollen_count * 0.4;
        let air_quality_effect = (1.0 - environment.air_quality) * 0.3;
        let activity_effect = self.state.activity * 0.2;

        let risk_change =
            self.rng.gen_range(-0.1..=0.1) + pollen_effect + air_quality_effect + activity_effect;
        self.state.asthma_risk = clamp_to(self.state.asthma_risk + risk_change, UNIT_RANGE);
        let risk = self.state.asthma_risk;

        if risk > 0.6 {
            self.state.respiratory_rate += self.rng.gen_range(2.0..=5.0);
        } else if risk < 0.3 {
            self.state.respiratory_rate += self.rng.gen_range(-2.0..=1.0);
        }
        self.state.respiratory_rate = clamp_to(self.state.respiratory_rate, RESPIRATORY_RATE_RANGE);

        let urgency = if risk > 0.7 {
            Urgency::High
        } else if risk > 0.5 {
            Urgency::Medium
        } else {
            Urgency::Low
        };
        let trend = if risk_change > 0.1 {
            Trend::Rising
        } else if risk_change < -0.1 {
            Trend::Falling
        } else {
            Trend::Stable
        };

        let mut tags = Vec::new();
        if environment.pollen_count > 0.6 {
            tags.push("high_pollen");
        }
        if environment.air_quality < 0.5 {
            tags.push("poor_air_quality");
        }
        if self.state.respiratory_rate > 28.0 {
            tags.push("elevated_respiratory_rate");
        }

        HealthEvent::new(self.timestamp(now), EventType::AsthmaRisk, risk, "risk_score", urgency)
            .with_metadata("device", "environmental_sensor_array")
            .with_metadata("device_id", self.device_id("ENV"))
            .with_metadata("pollen_count", round_to(environment.pollen_count, 2))
            .with_metadata("air_quality_index", round_to(environment.air_quality * 100.0, 1))
            .with_metadata("respiratory_rate", round_to(self.state.respiratory_rate, 0))
            .with_metadata("humidity", round_to(environment.humidity, 2))
            .with_metadata("location", "indoor")
            .with_trend(trend)
            .with_anomaly_score(risk)
            .with_tags(tags)
            .with_health_score(self.health_score())
    }

    pub fn generate_oxygen_saturation_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let activity_effect = -self.state.activity * 0.5;
        let respiratory_effect = -(self.state.respiratory_rate - 22.0) * 0.1;

        let change = self.rng.gen_range(-1.0..=1.0) + activity_effect + respiratory_effect;
        self.state.spo2 = clamp_to(self.state.spo2 + change, SPO2_RANGE);
        let spo2 = self.state.spo2;

        let urgency = if spo2 < 95.0 {
            Urgency::High
        } else if spo2 < 97.0 {
            Urgency::Medium
        } else {
            Urgency::Low
        };
        let anomaly = if spo2 < 97.0 { (97.0 - spo2) / 5.0 } else { 0.1 };
        let perfusion_index = round_to(self.rng.gen_range(0.5..=5.0), 2);

        let mut event = HealthEvent::new(self.timestamp(now), EventType::OxygenSaturation, spo2, "%", urgency)
            .with_value_precision(1)
            .with_metadata("device", "pulse_oximeter")
            .with_metadata("device_id", self.device_id("SPO2"))
            .with_metadata("perfusion_index", perfusion_index)
            .with_trend(Trend::Stable)
            .with_anomaly_score(anomaly)
            .with_health_score(self.health_score());

        if self.state.respiratory_rate > 28.0 {
            event = event.with_tag("elevated_respiratory_rate");
        }
        if self.state.asthma_risk > 0.6 {
            event = event.with_tag("asthma_risk");
        }
        event
    }

    pub fn generate_activity_event(&mut self) -> HealthEvent {
        let now = self.clock.now();
        let base = match now.hour() {
            7..=8 | 15..=17 => 0.7,
            12..=13 => 0.4,
            20..=22 => 0.3,
            23 | 0..=6 => {
                self.state.sleep_state = if self.rng.gen::<f64>() > 0.3 {
                    SleepState::DeepSleep
                } else {
                    SleepState::LightSleep
                };
                0.1
            }
            _ => 0.5,
        };

        self.state.activity = clamp_to(base + self.rng.gen_range(-0.2..=0.2), UNIT_RANGE);
        if self.state.sleep_state.is_asleep() {
            self.state.activity = 0.1;
            if self.rng.gen::<f64>() > 0.7 {
                self.state.sleep_state = SleepState::Awake;
            }
        }

        let activity = self.state.activity;
        let mut high_activity = false;
        if activity > 0.8 {
            high_activity = true;
            if self.state.glucose > 5.0 {
                self.state.glucose = clamp_to(self.state.glucose - 0.3, GLUCOSE_RANGE);
            }
        }

        let movement_type = if activity > 0.7 {
            "running"
        } else if activity > 0.4 {
            "walking"
        } else {
            "sedentary"
        };

        let mut event = HealthEvent::new(
            self.timestamp(now),
            EventType::ActivityLevel,
            activity,
            "normalized_score",
            Urgency::Low,
        )
        .with_metadata("device", "accelerometer_gyroscope")
        .with_metadata("device_id", self.device_id("ACT"))
        .with_metadata("steps_per_minute", round_to(activity * 120.0, 0))
        .with_metadata("movement_type", movement_type)
        .with_metadata("sleep_state", self.state.sleep_state.as_str())
        .with_trend(Trend::Stable)
        .with_anomaly_score(0.1)
        .with_health_score(self.health_score());

        if high_activity {
            event = event.with_tag("high_activity");
        }
        event
    }

    /// Refreshes the environmental factors for the current hour.
    pub fn update_environment(&mut self) {
        let hour = self.clock.now().hour() as f64;
        let env = &mut self.state.environment;

        env.pollen_count = clamp_to(
            0.3 + 0.4 * ((hour - 6.0) * PI / 12.0).sin() + self.rng.gen_range(-0.1..=0.1),
            UNIT_RANGE,
        );
        env.air_quality = clamp_to(0.7 + self.rng.gen_range(-0.2..=0.2), UNIT_RANGE);
        // Most humid before dawn, driest mid-afternoon.
        env.humidity = clamp_to(
            0.5 + 0.15 * ((hour - 4.0) * PI / 12.0).cos() + self.rng.gen_range(-0.05..=0.05),
            UNIT_RANGE,
        );
        env.ambient_temperature = 22.0 + 3.0 * ((hour - 9.0) * PI / 12.0).sin();
    }

    pub fn record_meal(&mut self, at: DateTime<Local>) {
        self.state.last_meal_time = at;
    }

    pub fn record_medication(&mut self, at: DateTime<Local>) {
        self.state.last_medication_time = at;
    }

    /// Commits a sampled event once it has been labeled: counts it, counts its
    /// status and stores it in the event history.
    pub fn record_labeled(&mut self, labeled: &HealthEvent) {
        self.state.statistics.record_generated(labeled);
        if let Some(status) = labeled.safety_status {
            self.state.statistics.record_status(status);
        }
        self.state.event_history.push(labeled.clone());
    }

    /// Counts a pre-labeled scenario event. Physiological state is untouched.
    pub fn record_scripted(&mut self, event: &HealthEvent) {
        self.state.statistics.record_scripted(event);
    }

    /// The newest `limit` events in the history, oldest first.
    pub fn recent_events(&self, limit: usize) -> Vec<RecentEvent> {
        let history = &self.state.event_history;
        history
            .iter()
            .skip(history.len().saturating_sub(limit))
            .map(RecentEvent::from)
            .collect()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn health_score(&self) -> f64 {
        compute_health_score(&self.state.snapshot())
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn uptime_seconds(&self) -> i64 {
        self.state.uptime_seconds(self.clock.now())
    }

    pub fn get_profile(&self) -> &SubjectProfile {
        &self.profile
    }

    pub fn get_state(&self) -> &PhysiologicalState {
        &self.state
    }

    pub fn get_statistics(&self) -> &Statistics {
        &self.state.statistics
    }

    pub fn subject_id(&self) -> &str {
        &self.profile.id
    }

    fn timestamp(&self, now: DateTime<Local>) -> DateTime<Utc> {
        now.with_timezone(&Utc)
    }

    fn device_id(&self, prefix: &str) -> String {
        format!("{}-{}YO-{}", prefix, self.state.age, self.state.subject_id.to_ascii_uppercase())
    }

    fn age_group(&self) -> String {
        format!("pediatric_{}_years", self.state.age)
    }
}

fn window_trend(window: &RollingWindow<f64>) -> Trend {
    compute_trend(&window.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{builder::SimulationBuilder, clock::FixedClock};
    use chrono::{Duration, TimeZone};
    use vitalsim_schemas::event::SafetyStatus;

    fn engine_at(hour: u32, seed: u64) -> (SimulationEngine, FixedClock) {
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap());
        let engine = SimulationBuilder::new()
            .with_profile(SubjectProfile::default())
            .with_seed(seed)
            .with_clock(clock.clone())
            .build()
            .unwrap();
        (engine, clock)
    }

    #[test]
    fn time_factor_table() {
        assert_eq!(glucose_time_factor(8), 1.3);
        assert_eq!(glucose_time_factor(13), 1.4);
        assert_eq!(glucose_time_factor(19), 1.3);
        assert_eq!(glucose_time_factor(4), 1.2);
        assert_eq!(glucose_time_factor(10), 1.0);
        assert_eq!(glucose_time_factor(0), 1.0);
    }

    #[test]
    fn glucose_event_classifies_by_threshold() {
        let (mut engine, _) = engine_at(10, 1);
        for _ in 0..200 {
            let event = engine.generate_glucose_event();
            let glucose = engine.snapshot().glucose;
            let expected = if glucose < 3.5 {
                Urgency::Critical
            } else if glucose < 4.0 {
                Urgency::High
            } else if glucose > 14.0 {
                Urgency::Critical
            } else if glucose > 11.0 {
                Urgency::High
            } else if glucose > 9.0 {
                Urgency::Medium
            } else {
                Urgency::Low
            };
            assert_eq!(event.urgency, expected, "glucose {}", glucose);
            assert_eq!(event.unit, "mmol/L");
            assert!(event.anomaly_score.is_some());
            assert!(event.health_score.is_some());
        }
        assert_eq!(engine.get_state().glucose_history().len(), 20);
    }

    #[test]
    fn heart_rate_normal_band_has_its_own_type() {
        let (mut engine, _) = engine_at(10, 7);
        for _ in 0..100 {
            let event = engine.generate_heart_rate_event();
            match event.event_type {
                EventType::HeartRateElevated => assert!(event.value > 120.0),
                EventType::HeartRateLow => assert!(event.value < 70.0),
                EventType::HeartRateNormal => assert_eq!(event.urgency, Urgency::Low),
                other => panic!("unexpected type {}", other),
            }
            assert_eq!(event.value, event.value.round());
        }
    }

    #[test]
    fn medication_escalates_with_high_glucose() {
        let (mut engine, clock) = engine_at(10, 3);
        engine.record_medication(clock.now() - Duration::hours(6));

        engine.state.glucose = 12.0;
        let event = engine.generate_medication_event();
        assert_eq!(event.urgency, Urgency::Critical);
        assert!(event.correlation_tags.contains("hyperglycemia_present"));

        engine.record_medication(clock.now() - Duration::minutes(270));
        engine.state.glucose = 10.0;
        assert_eq!(engine.generate_medication_event().urgency, Urgency::High);

        engine.record_medication(clock.now() - Duration::hours(1));
        engine.state.glucose = 10.0;
        assert_eq!(engine.generate_medication_event().urgency, Urgency::Low);

        engine.state.glucose = 11.5;
        assert_eq!(engine.generate_medication_event().urgency, Urgency::High);
    }

    #[test]
    fn night_activity_is_pinned_while_asleep() {
        let (mut engine, _) = engine_at(2, 11);
        let event = engine.generate_activity_event();
        // Sleep is entered on every night-time call, so the value is pinned.
        assert_eq!(event.value, 0.1);
    }

    #[test]
    fn environment_stays_normalized() {
        let (mut engine, clock) = engine_at(0, 5);
        for _ in 0..48 {
            engine.update_environment();
            let env = engine.snapshot().environment;
            assert!((0.0..=1.0).contains(&env.pollen_count));
            assert!((0.0..=1.0).contains(&env.air_quality));
            assert!((0.0..=1.0).contains(&env.humidity));
            clock.advance(Duration::minutes(30));
        }
    }

    #[test]
    fn sampled_events_only_count_once_recorded() {
        let (mut engine, _) = engine_at(10, 9);
        let first = engine.generate_random_event();
        let sampled = engine.sample_random_event();

        assert_eq!(engine.get_statistics().total_events, 1);
        assert_eq!(engine.get_state().event_history().len(), 1);
        let context = engine.recent_events(5);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].event_type, first.event_type);

        let labeled = sampled.labeled(SafetyStatus::Monitor, "watch");
        engine.record_labeled(&labeled);

        let stats = engine.get_statistics();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.monitor_events, 1);
        assert_eq!(engine.get_state().event_history().back(), Some(&labeled));
        assert_eq!(engine.recent_events(1)[0].safety_status, Some(SafetyStatus::Monitor));
    }

    #[test]
    fn non_generated_channels_yield_nothing() {
        let (mut engine, _) = engine_at(10, 2);
        assert!(engine.generate(Channel::Temperature).is_none());
        assert_eq!(engine.generate(Channel::Mood).unwrap().event_type, EventType::MoodIndicator);
    }

    #[test]
    fn same_seed_same_sequence() {
        let (mut a, _) = engine_at(10, 42);
        let (mut b, _) = engine_at(10, 42);
        for _ in 0..25 {
            assert_eq!(a.generate_random_event(), b.generate_random_event());
        }
    }
}
