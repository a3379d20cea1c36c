//! Scripted, reproducible event sequences for demos.
//!
//! A scenario never touches a subject's physiological state: it is a pure
//! function of the subject's baselines and the requested event count. Jitter
//! comes from an RNG seeded with those same inputs, so replaying a scenario
//! yields the same values every time.

mod episodes;
mod full_day;

use crate::error::VitalSimError;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use vitalsim_schemas::{
    event::{EventType, HealthEvent, Trend, Urgency},
    profile::{Baselines, Condition},
    scenario::{ScenarioCategory, ScenarioSummary},
};

const ALL_CONDITIONS: &[Condition] = &[Condition::Diabetes, Condition::Asthma, Condition::Both];
const DIABETES_CONDITIONS: &[Condition] = &[Condition::Diabetes, Condition::Both];
const ASTHMA_CONDITIONS: &[Condition] = &[Condition::Asthma, Condition::Both];

/// Static description of a scenario plus the routine that scripts it.
pub struct ScenarioDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ScenarioCategory,
    pub duration_minutes: u32,
    pub conditions: &'static [Condition],
    script: fn(&mut ScenarioScript),
}

static SCENARIOS: [ScenarioDefinition; 9] = [
    ScenarioDefinition {
        id: "hypoglycemia_episode",
        name: "Hypoglycemia Episode",
        description: "Low blood sugar episode with mood changes and recovery",
        category: ScenarioCategory::Episode,
        duration_minutes: 10,
        conditions: DIABETES_CONDITIONS,
        script: episodes::hypoglycemia_episode,
    },
    ScenarioDefinition {
        id: "hyperglycemia_spike",
        name: "Post-Meal Glucose Spike",
        description: "Blood sugar spike after eating, then gradual decline",
        category: ScenarioCategory::Episode,
        duration_minutes: 15,
        conditions: DIABETES_CONDITIONS,
        script: episodes::hyperglycemia_spike,
    },
    ScenarioDefinition {
        id: "asthma_trigger",
        name: "Asthma Trigger Event",
        description: "Environmental trigger causing asthma symptoms",
        category: ScenarioCategory::Episode,
        duration_minutes: 10,
        conditions: ASTHMA_CONDITIONS,
        script: episodes::asthma_trigger,
    },
    ScenarioDefinition {
        id: "anxiety_episode",
        name: "Anxiety/Stress Episode",
        description: "Elevated stress with heart rate and mood changes",
        category: ScenarioCategory::Episode,
        duration_minutes: 8,
        conditions: ALL_CONDITIONS,
        script: episodes::anxiety_episode,
    },
    ScenarioDefinition {
        id: "healthy_reading",
        name: "Healthy Readings",
        description: "All metrics in normal, healthy ranges",
        category: ScenarioCategory::Episode,
        duration_minutes: 5,
        conditions: ALL_CONDITIONS,
        script: episodes::healthy_reading,
    },
    ScenarioDefinition {
        id: "healthy_school_day",
        name: "Healthy School Day",
        description: "Typical healthy day with school, meals, and activities",
        category: ScenarioCategory::FullDay,
        duration_minutes: 30,
        conditions: ALL_CONDITIONS,
        script: full_day::healthy_school_day,
    },
    ScenarioDefinition {
        id: "sick_day",
        name: "Sick Day",
        description: "Day when child is unwell with variable health metrics",
        category: ScenarioCategory::FullDay,
        duration_minutes: 25,
        conditions: ALL_CONDITIONS,
        script: full_day::sick_day,
    },
    ScenarioDefinition {
        id: "active_play_day",
        name: "Active Play Day",
        description: "Very active day with lots of physical play and exercise",
        category: ScenarioCategory::FullDay,
        duration_minutes: 25,
        conditions: ALL_CONDITIONS,
        script: full_day::active_play_day,
    },
    ScenarioDefinition {
        id: "stressful_test_day",
        name: "Stressful Test Day",
        description: "School day with a test causing stress and mood changes",
        category: ScenarioCategory::FullDay,
        duration_minutes: 20,
        conditions: ALL_CONDITIONS,
        script: full_day::stressful_test_day,
    },
];

impl ScenarioDefinition {
    pub fn applies_to(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            duration_minutes: self.duration_minutes,
            conditions: self.conditions.to_vec(),
        }
    }

    /// Produces the scripted events. `event_count` defaults by category; the
    /// events are spread evenly over the scenario's nominal duration from `start`.
    pub fn generate(
        &self,
        baselines: &Baselines,
        event_count: Option<usize>,
        start: DateTime<Utc>,
    ) -> Vec<HealthEvent> {
        let event_count = event_count.unwrap_or_else(|| self.category.default_event_count());
        let mut script = ScenarioScript::new(self.id, *baselines, event_count, start);
        (self.script)(&mut script);
        script.finish(self.duration_minutes)
    }
}

pub fn scenarios() -> &'static [ScenarioDefinition] {
    &SCENARIOS
}

pub fn get_scenario(id: &str) -> Result<&'static ScenarioDefinition, VitalSimError> {
    SCENARIOS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| VitalSimError::UnknownScenario(id.to_string()))
}

/// The catalog, optionally restricted to scenarios that apply to `condition`.
pub fn list_scenarios(condition: Option<Condition>) -> Vec<ScenarioSummary> {
    SCENARIOS
        .iter()
        .filter(|s| condition.map_or(true, |c| s.applies_to(c)))
        .map(ScenarioDefinition::summary)
        .collect()
}

/// Looks up a scenario and materializes its events for playback.
pub fn play(
    id: &str,
    baselines: &Baselines,
    event_count: Option<usize>,
    start: DateTime<Utc>,
) -> Result<ScenarioPlayback, VitalSimError> {
    let scenario = get_scenario(id)?;
    Ok(ScenarioPlayback {
        scenario,
        events: scenario.generate(baselines, event_count, start),
        position: 0,
    })
}

/// FNV-1a over the scenario id, event count and vital baselines. Fixed so
/// that a given script replays identically across toolchains.
fn script_seed(id: &str, event_count: usize, baselines: &Baselines) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let words = [
        event_count as u64,
        baselines.glucose.to_bits(),
        baselines.heart_rate.to_bits(),
        baselines.spo2.to_bits(),
    ];
    id.bytes()
        .chain(words.iter().flat_map(|word| word.to_le_bytes()))
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// A finished scenario script, replayed one event at a time.
pub struct ScenarioPlayback {
    scenario: &'static ScenarioDefinition,
    events: Vec<HealthEvent>,
    position: usize,
}

impl ScenarioPlayback {
    pub fn scenario(&self) -> &'static ScenarioDefinition {
        self.scenario
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.position
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl Iterator for ScenarioPlayback {
    type Item = HealthEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.get(self.position)?.clone();
        self.position += 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for ScenarioPlayback {}

/// Working state handed to a scenario routine.
pub(crate) struct ScenarioScript {
    pub(crate) baselines: Baselines,
    pub(crate) event_count: usize,
    start: DateTime<Utc>,
    rng: StdRng,
    events: Vec<HealthEvent>,
}

impl ScenarioScript {
    fn new(id: &str, baselines: Baselines, event_count: usize, start: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(script_seed(id, event_count, &baselines)),
            baselines,
            event_count,
            start,
            events: Vec::new(),
        }
    }

    pub(crate) fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..=high)
    }

    /// A new event with the scripted defaults: stable trend, anomaly score 0.1.
    pub(crate) fn event(
        &self,
        event_type: EventType,
        value: f64,
        unit: &str,
        urgency: Urgency,
    ) -> HealthEvent {
        HealthEvent::new(self.start, event_type, value, unit, urgency)
            .with_trend(Trend::Stable)
            .with_anomaly_score(0.1)
    }

    pub(crate) fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub(crate) fn push(&mut self, event: HealthEvent) {
        debug_assert!(event.is_labeled(), "scenario events carry an authored verdict");
        self.events.push(event);
    }

    fn finish(mut self, duration_minutes: u32) -> Vec<HealthEvent> {
        let count = self.events.len().max(1) as i64;
        let step = Duration::seconds(i64::from(duration_minutes) * 60 / count);
        for (i, event) in self.events.iter_mut().enumerate() {
            event.timestamp = self.start + step * i as i32;
        }
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::derive_baselines;
    use vitalsim_schemas::event::SafetyStatus;

    #[test]
    fn catalog_has_nine_entries_and_filters_by_condition() {
        assert_eq!(list_scenarios(None).len(), 9);

        let asthma: Vec<String> = list_scenarios(Some(Condition::Asthma)).into_iter().map(|s| s.id).collect();
        assert!(asthma.contains(&"asthma_trigger".to_string()));
        assert!(!asthma.contains(&"hypoglycemia_episode".to_string()));
        assert!(list_scenarios(Some(Condition::None)).is_empty());
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert!(matches!(get_scenario("not_a_real_id"), Err(VitalSimError::UnknownScenario(_))));
    }

    #[test]
    fn every_scenario_produces_labeled_events_in_time_order() {
        let baselines = derive_baselines(7, Condition::Both);
        let start = Utc::now();
        for scenario in scenarios() {
            let events = scenario.generate(&baselines, None, start);
            assert!(!events.is_empty(), "{} is empty", scenario.id);
            assert!(events.iter().all(|e| e.is_labeled()));
            assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
            assert!(events.last().unwrap().timestamp <= start + Duration::minutes(i64::from(scenario.duration_minutes)));
        }
    }

    #[test]
    fn script_seed_is_pinned() {
        let baselines = Baselines {
            glucose: 5.5,
            heart_rate: 95.0,
            spo2: 98.0,
            ..derive_baselines(7, Condition::Diabetes)
        };
        assert_eq!(
            script_seed("hypoglycemia_episode", 12, &baselines),
            12_023_141_067_193_324_883
        );
        assert_ne!(
            script_seed("hyperglycemia_episode", 12, &baselines),
            script_seed("hypoglycemia_episode", 12, &baselines)
        );
    }

    #[test]
    fn playback_is_restartable() {
        let baselines = derive_baselines(7, Condition::Diabetes);
        let mut playback = play("anxiety_episode", &baselines, None, Utc::now()).unwrap();
        let first: Vec<HealthEvent> = playback.by_ref().collect();
        assert_eq!(playback.remaining(), 0);

        playback.rewind();
        assert_eq!(playback.len(), first.len());
        assert_eq!(playback.next().as_ref(), first.first());
        assert_eq!(first[0].safety_status, Some(SafetyStatus::Monitor));
    }
}
