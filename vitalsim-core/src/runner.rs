//! Drives one subject through the generate → classify → persist pipeline.

use crate::{
    classifier::{FallbackClassifier, SafetyClassifier},
    error::VitalSimError,
    history::HistorySink,
    logger::TimeSeriesLogger,
    scenario::get_scenario,
    simulation::{engine::SimulationEngine, state::Statistics},
};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use vitalsim_schemas::{classification::ClassificationRequest, event::HealthEvent};

/// Number of earlier events sent to the classifier as context.
pub const CONTEXT_WINDOW: usize = 5;

/// Pacing and stop condition for [`SessionRunner::run_continuous`].
#[derive(Debug, Clone, Copy)]
pub struct ContinuousOptions {
    pub interval: Duration,
    pub max_cycles: Option<u64>,
}

impl Default for ContinuousOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_cycles: None,
        }
    }
}

/// Owns everything one subject's session needs. Nothing here is shared with
/// other runners.
pub struct SessionRunner {
    engine: SimulationEngine,
    classifier: FallbackClassifier<Box<dyn SafetyClassifier>>,
    history: Box<dyn HistorySink>,
    state_log: Option<TimeSeriesLogger>,
    cycle: u64,
}

impl SessionRunner {
    pub fn new(
        engine: SimulationEngine,
        classifier: Box<dyn SafetyClassifier>,
        history: Box<dyn HistorySink>,
    ) -> Self {
        Self {
            engine,
            classifier: FallbackClassifier::new(classifier),
            history,
            state_log: None,
            cycle: 0,
        }
    }

    pub fn with_classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier.set_timeout(timeout);
        self
    }

    pub fn with_state_log(mut self, logger: TimeSeriesLogger) -> Self {
        self.state_log = Some(logger);
        self
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn statistics(&self) -> &Statistics {
        self.engine.get_statistics()
    }

    pub fn subject_id(&self) -> &str {
        self.engine.subject_id()
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn history(&self) -> &dyn HistorySink {
        self.history.as_ref()
    }

    /// One full pipeline cycle. The returned event is labeled and already persisted.
    pub async fn generate_and_analyze(&mut self) -> Result<HealthEvent, VitalSimError> {
        self.engine.update_environment();
        let event = self.engine.sample_random_event();

        let request = ClassificationRequest {
            subject_id: self.engine.subject_id().to_string(),
            recent_events: self.engine.recent_events(CONTEXT_WINDOW),
            state: self.engine.snapshot(),
            event,
        };
        let verdict = self.classifier.classify_or_fallback(&request).await;
        let labeled = request.event.labeled(verdict.status, verdict.reasoning);

        // Counters only ever include events that reached the history.
        self.history.append(&request.subject_id, &labeled)?;
        self.engine.record_labeled(&labeled);

        self.cycle += 1;
        if let Some(logger) = self.state_log.as_mut() {
            logger.log_cycle(self.cycle, &request.subject_id, &request.state, &labeled)?;
        }
        Ok(labeled)
    }

    /// Plays a scenario in one go. Unknown ids fail before anything is
    /// counted or written.
    pub fn run_scenario(
        &mut self,
        scenario_id: &str,
        event_count: Option<usize>,
        save: bool,
    ) -> Result<Vec<HealthEvent>, VitalSimError> {
        let events = self.scripted_events(scenario_id, event_count)?;
        for event in &events {
            self.apply_scripted(event, save)?;
        }
        Ok(events)
    }

    /// Plays a scenario one event at a time, pausing `interval` between
    /// events. Stops early, after the current event, if `shutdown` flips to true.
    pub async fn stream_scenario<F>(
        &mut self,
        scenario_id: &str,
        event_count: Option<usize>,
        save: bool,
        interval: Duration,
        shutdown: &mut watch::Receiver<bool>,
        mut on_event: F,
    ) -> Result<Vec<HealthEvent>, VitalSimError>
    where
        F: FnMut(&HealthEvent),
    {
        let events = self.scripted_events(scenario_id, event_count)?;
        let total = events.len();
        let mut played = Vec::with_capacity(total);

        for (index, event) in events.into_iter().enumerate() {
            if *shutdown.borrow() {
                info!(scenario = scenario_id, played = index, "scenario stream interrupted");
                break;
            }
            self.apply_scripted(&event, save)?;
            on_event(&event);
            played.push(event);

            if index + 1 < total && pause(interval, shutdown).await {
                info!(scenario = scenario_id, played = index + 1, "scenario stream interrupted");
                break;
            }
        }
        Ok(played)
    }

    /// Runs pipeline cycles until `max_cycles` is reached or `shutdown` flips
    /// to true. Returns the number of cycles completed by this call.
    ///
    /// `on_event` sees each labeled event along with the counters it was
    /// just committed to.
    pub async fn run_continuous<F>(
        &mut self,
        options: ContinuousOptions,
        shutdown: &mut watch::Receiver<bool>,
        mut on_event: F,
    ) -> Result<u64, VitalSimError>
    where
        F: FnMut(&HealthEvent, &Statistics),
    {
        info!(
            subject = %self.engine.subject_id(),
            classifier = self.classifier.name(),
            interval_ms = options.interval.as_millis() as u64,
            max_cycles = ?options.max_cycles,
            "starting continuous simulation"
        );

        let mut completed = 0u64;
        loop {
            if *shutdown.borrow() {
                break;
            }
            if options.max_cycles.map_or(false, |max| completed >= max) {
                break;
            }

            let event = self.generate_and_analyze().await?;
            completed += 1;
            on_event(&event, self.engine.get_statistics());

            if options.max_cycles.map_or(false, |max| completed >= max) {
                break;
            }
            if pause(options.interval, shutdown).await {
                break;
            }
        }

        let stats = self.engine.get_statistics();
        info!(
            subject = %self.engine.subject_id(),
            cycles = completed,
            total_events = stats.total_events,
            danger = stats.danger_events,
            monitor = stats.monitor_events,
            safe = stats.safe_events,
            "continuous simulation stopped"
        );
        Ok(completed)
    }

    fn scripted_events(
        &self,
        scenario_id: &str,
        event_count: Option<usize>,
    ) -> Result<Vec<HealthEvent>, VitalSimError> {
        let scenario = get_scenario(scenario_id)?;
        let baselines = *self.engine.get_state().baselines();
        let start = self.engine.now().with_timezone(&Utc);
        let subject_id = self.engine.subject_id();

        info!(subject = %subject_id, scenario = scenario.id, "playing scenario");
        Ok(scenario
            .generate(&baselines, event_count, start)
            .into_iter()
            .map(|event| event.with_metadata("subject_id", subject_id))
            .collect())
    }

    fn apply_scripted(&mut self, event: &HealthEvent, save: bool) -> Result<(), VitalSimError> {
        if save {
            let subject_id = self.engine.subject_id().to_string();
            self.history.append(&subject_id, event)?;
        }
        self.engine.record_scripted(event);
        debug!(event_type = %event.event_type, value = event.value, "scripted event");
        Ok(())
    }
}

/// Sleeps for `interval` unless shutdown is requested first. Returns true on shutdown.
async fn pause(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(interval) => false,
        changed = shutdown.changed() => match changed {
            Ok(()) => *shutdown.borrow(),
            // Sender gone: nobody can ask us to stop any more.
            Err(_) => {
                tokio::time::sleep(interval).await;
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleBasedClassifier;
    use crate::history::HistoryRecord;
    use crate::profile::SubjectProfile;
    use crate::simulation::builder::SimulationBuilder;

    #[derive(Default)]
    struct MemorySink {
        records: Vec<HistoryRecord>,
    }

    impl HistorySink for MemorySink {
        fn append(&mut self, subject_id: &str, event: &HealthEvent) -> Result<(), VitalSimError> {
            self.records.push(HistoryRecord {
                subject_id: subject_id.to_string(),
                event: event.clone(),
            });
            Ok(())
        }

        fn read_recent(&self, subject_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, VitalSimError> {
            let matching: Vec<_> = self
                .records
                .iter()
                .filter(|r| r.subject_id == subject_id)
                .cloned()
                .collect();
            let skip = matching.len().saturating_sub(limit);
            Ok(matching.into_iter().skip(skip).collect())
        }
    }

    struct RejectingSink;

    impl HistorySink for RejectingSink {
        fn append(&mut self, subject_id: &str, _event: &HealthEvent) -> Result<(), VitalSimError> {
            Err(VitalSimError::HistoryWrite(
                format!("{}.jsonl", subject_id).into(),
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ))
        }

        fn read_recent(&self, _subject_id: &str, _limit: usize) -> Result<Vec<HistoryRecord>, VitalSimError> {
            Ok(Vec::new())
        }
    }

    fn runner(seed: u64) -> SessionRunner {
        let engine = SimulationBuilder::new()
            .with_profile(SubjectProfile::default())
            .with_seed(seed)
            .build()
            .unwrap();
        SessionRunner::new(engine, Box::new(RuleBasedClassifier::new()), Box::<MemorySink>::default())
    }

    #[tokio::test]
    async fn continuous_run_stops_at_max_cycles() {
        let mut runner = runner(11);
        let (_tx, mut rx) = watch::channel(false);
        let mut seen = Vec::new();
        let options = ContinuousOptions {
            interval: Duration::from_millis(1),
            max_cycles: Some(4),
        };

        let completed = runner
            .run_continuous(options, &mut rx, |_, stats| seen.push(stats.total_events))
            .await
            .unwrap();

        assert_eq!(completed, 4);
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(runner.cycles(), 4);
        let stats = runner.statistics();
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.safe_events + stats.monitor_events + stats.danger_events, 4);
        assert_eq!(runner.history().read_recent("default", 10).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn failed_persistence_is_not_counted() {
        let engine = SimulationBuilder::new()
            .with_profile(SubjectProfile::default())
            .with_seed(21)
            .build()
            .unwrap();
        let mut runner = SessionRunner::new(engine, Box::new(RuleBasedClassifier::new()), Box::new(RejectingSink));

        assert!(matches!(
            runner.generate_and_analyze().await,
            Err(VitalSimError::HistoryWrite(..))
        ));
        assert!(matches!(
            runner.run_scenario("hypoglycemia_episode", Some(5), true),
            Err(VitalSimError::HistoryWrite(..))
        ));

        let stats = runner.statistics();
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.safe_events + stats.monitor_events + stats.danger_events, 0);
        assert!(runner.engine().get_state().event_history().is_empty());
        assert_eq!(runner.cycles(), 0);
    }

    #[tokio::test]
    async fn shutdown_before_start_runs_nothing() {
        let mut runner = runner(3);
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();

        let completed = runner
            .run_continuous(ContinuousOptions::default(), &mut rx, |_, _| {})
            .await
            .unwrap();
        assert_eq!(completed, 0);
        assert_eq!(runner.statistics().total_events, 0);
    }

    #[test]
    fn scenario_without_save_only_counts() {
        let mut runner = runner(5);
        let events = runner.run_scenario("healthy_reading", None, false).unwrap();

        assert_eq!(runner.statistics().total_events, events.len() as u64);
        assert_eq!(runner.statistics().safe_events, events.len() as u64);
        assert!(runner.history().read_recent("default", 10).unwrap().is_empty());
        assert!(events.iter().all(|e| e.metadata["subject_id"] == "default"));
    }

    #[tokio::test]
    async fn stream_scenario_persists_each_event() {
        let mut runner = runner(8);
        let (_tx, mut rx) = watch::channel(false);
        let mut streamed = Vec::new();

        let events = runner
            .stream_scenario(
                "asthma_trigger",
                None,
                true,
                Duration::from_millis(1),
                &mut rx,
                |e| streamed.push(e.event_type),
            )
            .await
            .unwrap();

        assert_eq!(streamed.len(), events.len());
        assert_eq!(runner.history().read_recent("default", 50).unwrap().len(), events.len());
    }
}
