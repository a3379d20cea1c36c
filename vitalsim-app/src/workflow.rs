use crate::config::{seconds, AppConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::watch;
use vitalsim_core::{
    analysis::summarize_session,
    classifier::{RemoteClassifier, RemoteClassifierConfig, RuleBasedClassifier, SafetyClassifier},
    history::{HistorySink, JsonlHistory},
    logger::TimeSeriesLogger,
    registry::SubjectRegistry,
    runner::{ContinuousOptions, SessionRunner},
    scenario::{get_scenario, list_scenarios},
    simulation::{builder::SimulationBuilder, state::Statistics},
};
use vitalsim_schemas::{event::HealthEvent, profile::Condition};

/// While streaming, a statistics block is printed after every this many events.
const STATISTICS_EVERY: u64 = 10;

pub struct RunArgs {
    pub subject: Option<String>,
    pub interval: Option<f64>,
    pub cycles: Option<u64>,
    pub seed: Option<u64>,
    pub quiet: bool,
}

pub struct ScenarioArgs {
    pub id: String,
    pub subject: Option<String>,
    pub events: Option<usize>,
    pub interval: Option<f64>,
    pub no_save: bool,
}

/// Continuous generate → classify → persist loop for one subject.
pub async fn run_continuous(
    config: &AppConfig,
    args: RunArgs,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    println!("\n--- [Workflow] Starting Continuous Monitoring ---");

    let subject_id = args
        .subject
        .unwrap_or_else(|| config.default_subject_id().to_string());
    let interval = match args.interval {
        Some(value) => seconds(value).context("Invalid --interval")?,
        None => config.interval()?,
    };
    let mut runner = build_runner(config, &subject_id, args.seed)?;
    if let Some(dir) = &config.timeseries_dir {
        let log_path = timeseries_path(dir, &subject_id);
        let logger = TimeSeriesLogger::new(&log_path)
            .with_context(|| format!("Failed to open state log: {}", log_path.display()))?;
        println!("State log: {}", logger.path().display());
        runner = runner.with_state_log(logger);
    }

    println!(
        "Subject: {} | classifier: {} | interval: {:.1}s | cycles: {}",
        runner.engine().get_profile().display_name(),
        runner.classifier_name(),
        interval.as_secs_f64(),
        args.cycles.map_or_else(|| "until Ctrl-C".to_string(), |n| n.to_string()),
    );

    let quiet = args.quiet;
    let options = ContinuousOptions {
        interval,
        max_cycles: args.cycles,
    };
    runner
        .run_continuous(options, &mut shutdown, |event, stats| {
            if quiet {
                return;
            }
            print_event(event);
            if statistics_due(stats) {
                print_counters(stats);
            }
        })
        .await
        .context("Continuous simulation failed")?;

    print_statistics(&runner);
    Ok(())
}

/// Streams one scripted scenario for a subject.
pub async fn run_scenario(
    config: &AppConfig,
    args: ScenarioArgs,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let scenario = get_scenario(&args.id)?;
    println!("\n--- [Workflow] Playing Scenario: {} ---", scenario.name);
    println!("{}", scenario.description);

    let subject_id = args
        .subject
        .unwrap_or_else(|| config.default_subject_id().to_string());
    let interval = match args.interval {
        Some(value) => seconds(value).context("Invalid --interval")?,
        None => config.interval()?,
    };
    let mut runner = build_runner(config, &subject_id, None)?;

    let played = runner
        .stream_scenario(
            scenario.id,
            args.events,
            !args.no_save,
            interval,
            &mut shutdown,
            print_event,
        )
        .await
        .with_context(|| format!("Scenario '{}' failed", scenario.id))?;

    println!(
        "\nPlayed {} event(s){}.",
        played.len(),
        if args.no_save { " (not saved)" } else { "" }
    );
    print_statistics(&runner);
    Ok(())
}

pub fn show_scenarios(condition: Option<Condition>) {
    let scenarios = list_scenarios(condition);
    match condition {
        Some(condition) => println!("\nScenarios for condition '{}':", condition),
        None => println!("\nAvailable scenarios:"),
    }
    for summary in scenarios {
        let conditions: Vec<&str> = summary.conditions.iter().map(|c| c.as_str()).collect();
        println!(
            "  {:<22} {:<26} {:>3} min  [{}]",
            summary.id,
            summary.name,
            summary.duration_minutes,
            conditions.join(", ")
        );
        println!("      {}", summary.description);
    }
}

pub fn show_history(config: &AppConfig, subject: Option<String>, limit: usize) -> Result<()> {
    let subject_id = subject.unwrap_or_else(|| config.default_subject_id().to_string());
    let history = JsonlHistory::new(&config.history_dir)?;
    let records = history.read_recent(&subject_id, limit)?;

    println!("\n--- Recent events for '{}' ({}) ---", subject_id, records.len());
    for record in &records {
        print_event(&record.event);
    }
    Ok(())
}

pub fn report(config: &AppConfig, subject: Option<String>) -> Result<()> {
    let subject_id = subject.unwrap_or_else(|| config.default_subject_id().to_string());
    let dir = config
        .timeseries_dir
        .as_ref()
        .context("No timeseries_dir configured; nothing to report")?;
    let log_path = timeseries_path(dir, &subject_id);
    let summary = summarize_session(&log_path)
        .with_context(|| format!("Failed to summarize {}", log_path.display()))?;

    println!("\n--- Session Report: {} ---", subject_id);
    println!("Cycles logged:      {}", summary.cycles);
    println!(
        "Verdicts:           {} DANGER / {} MONITOR / {} SAFE",
        summary.danger_events, summary.monitor_events, summary.safe_events
    );
    if summary.unlabeled_events > 0 {
        println!("Unlabeled rows:     {}", summary.unlabeled_events);
    }
    println!("Anomalies:          {}", summary.anomalies_detected);
    if let Some(glucose) = summary.glucose {
        println!(
            "Glucose (mmol/L):   min {:.1} / mean {:.1} / max {:.1}",
            glucose.min, glucose.mean, glucose.max
        );
        println!("Time in range:      {:.0}%", glucose.time_in_range * 100.0);
    }
    if let Some(score) = summary.mean_health_score {
        println!("Mean health score:  {:.1}", score);
    }
    Ok(())
}

fn build_runner(config: &AppConfig, subject_id: &str, seed: Option<u64>) -> Result<SessionRunner> {
    let registry = SubjectRegistry::from_inputs(config.subjects.clone())
        .context("Invalid subject in configuration")?;
    let profile = registry.get(subject_id)?.clone();

    let engine = SimulationBuilder::new()
        .with_profile(profile)
        .with_optional_seed(seed)
        .build()?;
    let history = JsonlHistory::new(&config.history_dir).with_context(|| {
        format!("Failed to open history directory: {}", config.history_dir.display())
    })?;

    Ok(SessionRunner::new(engine, build_classifier(config)?, Box::new(history))
        .with_classifier_timeout(config.classifier.timeout()?))
}

fn build_classifier(config: &AppConfig) -> Result<Box<dyn SafetyClassifier>> {
    let settings = &config.classifier;
    match settings.api_key() {
        Some(api_key) => {
            let remote = RemoteClassifier::new(RemoteClassifierConfig {
                api_base: settings.api_base.clone(),
                model: settings.model.clone(),
                api_key,
                request_timeout: settings.timeout()?,
            })?;
            Ok(Box::new(remote))
        }
        None => Ok(Box::new(RuleBasedClassifier::new())),
    }
}

fn timeseries_path(dir: &std::path::Path, subject_id: &str) -> PathBuf {
    dir.join(format!("{}.csv", subject_id))
}

fn print_event(event: &HealthEvent) {
    let status = event.safety_status.map_or("-", |s| s.as_str());
    println!(
        "[{}] {:<20} {:>7.2} {:<17} {:<8} {}",
        event.timestamp.format("%H:%M:%S"),
        event.event_type.as_str(),
        event.value,
        event.unit,
        status,
        event.reasoning.as_deref().unwrap_or(""),
    );
}

fn statistics_due(stats: &Statistics) -> bool {
    stats.total_events > 0 && stats.total_events % STATISTICS_EVERY == 0
}

fn print_counters(stats: &Statistics) {
    println!("\n--- Statistics ---");
    println!("Total events:       {}", stats.total_events);
    println!("  DANGER:           {}", stats.danger_events);
    println!("  MONITOR:          {}", stats.monitor_events);
    println!("  SAFE:             {}", stats.safe_events);
    println!("Anomalies detected: {}\n", stats.anomalies_detected);
}

fn print_statistics(runner: &SessionRunner) {
    let stats: &Statistics = runner.statistics();
    let engine = runner.engine();

    println!("\n--- Session Statistics ---");
    println!("Subject:            {}", runner.subject_id());
    println!("Total events:       {}", stats.total_events);
    println!("  DANGER:           {}", stats.danger_events);
    println!("  MONITOR:          {}", stats.monitor_events);
    println!("  SAFE:             {}", stats.safe_events);
    println!("Anomalies detected: {}", stats.anomalies_detected);
    if let Some(at) = stats.last_anomaly_time {
        println!("Last anomaly:       {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("Health score now:   {:.1}", engine.health_score());
    println!("Uptime:             {}s", engine.uptime_seconds());
}
