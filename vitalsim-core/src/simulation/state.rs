use crate::profile::SubjectProfile;
use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use vitalsim_schemas::{
    classification::StateSnapshot,
    environment::{Environment, SleepState},
    event::{HealthEvent, SafetyStatus},
    profile::{Baselines, Condition},
};

pub const GLUCOSE_RANGE: (f64, f64) = (2.5, 18.0);
pub const HEART_RATE_RANGE: (f64, f64) = (60.0, 140.0);
pub const UNIT_RANGE: (f64, f64) = (0.0, 1.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (34.0, 42.0);
pub const SPO2_RANGE: (f64, f64) = (92.0, 100.0);
pub const RESPIRATORY_RATE_RANGE: (f64, f64) = (18.0, 35.0);

pub const GLUCOSE_HISTORY_CAPACITY: usize = 20;
pub const HEART_RATE_HISTORY_CAPACITY: usize = 20;
pub const EVENT_HISTORY_CAPACITY: usize = 50;

/// Any anomaly score above this counts as a detected anomaly.
pub const ANOMALY_THRESHOLD: f64 = 0.7;

pub(crate) fn clamp_to(value: f64, range: (f64, f64)) -> f64 {
    value.clamp(range.0, range.1)
}

/// A bounded FIFO; pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.items.back_mut()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}

impl<T: Clone> RollingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Cumulative counters for one simulated subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_events: u64,
    pub danger_events: u64,
    pub monitor_events: u64,
    pub safe_events: u64,
    pub anomalies_detected: u64,
    pub last_anomaly_time: Option<DateTime<Utc>>,
}

impl Statistics {
    /// Counts a freshly generated event. Its status is counted separately,
    /// once it has been labeled.
    pub fn record_generated(&mut self, event: &HealthEvent) {
        self.total_events += 1;
        if event.anomaly_score.map_or(false, |score| score > ANOMALY_THRESHOLD) {
            self.anomalies_detected += 1;
            self.last_anomaly_time = Some(event.timestamp);
        }
    }

    pub fn record_status(&mut self, status: SafetyStatus) {
        match status {
            SafetyStatus::Danger => self.danger_events += 1,
            SafetyStatus::Monitor => self.monitor_events += 1,
            SafetyStatus::Safe => self.safe_events += 1,
        }
    }

    /// Counts a pre-labeled scenario event in one step.
    pub fn record_scripted(&mut self, event: &HealthEvent) {
        self.record_generated(event);
        self.record_status(event.safety_status.unwrap_or(SafetyStatus::Safe));
    }
}

/// Mutable physiological state of one subject.
#[derive(Debug, Clone)]
pub struct PhysiologicalState {
    pub(crate) subject_id: String,
    pub(crate) age: u8,
    pub(crate) condition: Condition,
    pub(crate) baselines: Baselines,

    pub(crate) glucose: f64,
    pub(crate) heart_rate: f64,
    pub(crate) mood: f64,
    pub(crate) activity: f64,
    pub(crate) temperature: f64,
    pub(crate) spo2: f64,
    pub(crate) respiratory_rate: f64,
    pub(crate) hydration: f64,
    pub(crate) stress: f64,
    pub(crate) asthma_risk: f64,

    pub(crate) last_medication_time: DateTime<Local>,
    pub(crate) last_meal_time: DateTime<Local>,
    pub(crate) sleep_state: SleepState,
    pub(crate) started_at: DateTime<Local>,

    pub(crate) glucose_history: RollingWindow<f64>,
    pub(crate) heart_rate_history: RollingWindow<f64>,
    pub(crate) event_history: RollingWindow<HealthEvent>,

    pub(crate) environment: Environment,
    pub(crate) statistics: Statistics,
}

impl PhysiologicalState {
    pub fn new(profile: &SubjectProfile, now: DateTime<Local>, environment: Environment) -> Self {
        let baselines = profile.baselines;
        Self {
            subject_id: profile.id.clone(),
            age: profile.age,
            condition: profile.condition,
            baselines,
            glucose: clamp_to(baselines.glucose, GLUCOSE_RANGE),
            heart_rate: clamp_to(baselines.heart_rate, HEART_RATE_RANGE),
            mood: 0.7,
            activity: 0.5,
            temperature: clamp_to(baselines.temperature, TEMPERATURE_RANGE),
            spo2: clamp_to(baselines.spo2, SPO2_RANGE),
            respiratory_rate: clamp_to(baselines.respiratory_rate, RESPIRATORY_RATE_RANGE),
            hydration: 0.75,
            stress: 0.3,
            asthma_risk: 0.2,
            last_medication_time: now - Duration::hours(1),
            last_meal_time: now - Duration::hours(2),
            sleep_state: SleepState::Awake,
            started_at: now,
            glucose_history: RollingWindow::new(GLUCOSE_HISTORY_CAPACITY),
            heart_rate_history: RollingWindow::new(HEART_RATE_HISTORY_CAPACITY),
            event_history: RollingWindow::new(EVENT_HISTORY_CAPACITY),
            environment,
            statistics: Statistics::default(),
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            glucose: self.glucose,
            heart_rate: self.heart_rate,
            mood: self.mood,
            activity: self.activity,
            temperature: self.temperature,
            spo2: self.spo2,
            respiratory_rate: self.respiratory_rate,
            hydration: self.hydration,
            stress: self.stress,
            asthma_risk: self.asthma_risk,
            sleep_state: self.sleep_state,
            environment: self.environment,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn baselines(&self) -> &Baselines {
        &self.baselines
    }

    pub fn sleep_state(&self) -> SleepState {
        self.sleep_state
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn glucose_history(&self) -> &RollingWindow<f64> {
        &self.glucose_history
    }

    pub fn heart_rate_history(&self) -> &RollingWindow<f64> {
        &self.heart_rate_history
    }

    pub fn event_history(&self) -> &RollingWindow<HealthEvent> {
        &self.event_history
    }

    pub fn hours_since_medication(&self, now: DateTime<Local>) -> f64 {
        hours_between(self.last_medication_time, now)
    }

    pub fn hours_since_meal(&self, now: DateTime<Local>) -> f64 {
        hours_between(self.last_meal_time, now)
    }

    pub fn uptime_seconds(&self, now: DateTime<Local>) -> i64 {
        (now - self.started_at).num_seconds()
    }
}

fn hours_between(earlier: DateTime<Local>, later: DateTime<Local>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalsim_schemas::event::{EventType, Urgency};

    #[test]
    fn rolling_window_evicts_oldest() {
        let mut window = RollingWindow::new(3);
        for v in 1..=5 {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn initial_state_matches_profile() {
        let now = Local::now();
        let state = PhysiologicalState::new(&SubjectProfile::default(), now, Environment::default());

        assert_eq!(state.glucose, 5.5);
        assert_eq!(state.heart_rate, 90.0);
        assert_eq!(state.mood, 0.7);
        assert_eq!(state.asthma_risk, 0.2);
        assert!((state.hours_since_medication(now) - 1.0).abs() < 1e-9);
        assert!((state.hours_since_meal(now) - 2.0).abs() < 1e-9);
        assert_eq!(state.glucose_history().capacity(), 20);
        assert_eq!(state.event_history().capacity(), 50);
    }

    #[test]
    fn statistics_count_anomalies_and_statuses_separately() {
        let mut stats = Statistics::default();
        let event = HealthEvent::new(Utc::now(), EventType::GlucoseDrop, 3.1, "mmol/L", Urgency::Critical)
            .with_anomaly_score(0.9);

        stats.record_generated(&event);
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.anomalies_detected, 1);
        assert_eq!(stats.danger_events, 0);

        stats.record_status(SafetyStatus::Danger);
        assert_eq!(stats.danger_events, 1);
        assert_eq!(stats.last_anomaly_time, Some(event.timestamp));
    }
}
