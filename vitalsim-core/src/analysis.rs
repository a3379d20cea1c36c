//! Stateless analytics over readings: trend, anomaly score, health score, and
//! the after-the-fact summary of a recorded session.

use crate::{error::VitalSimError, logger::StateLogEntry, simulation::state::ANOMALY_THRESHOLD};
use serde::Serialize;
use std::path::Path;
use vitalsim_schemas::{
    classification::StateSnapshot,
    event::{round_to, SafetyStatus, Trend},
};

const TREND_WINDOW: usize = 5;
const TREND_MIN_POINTS: usize = 3;
const STABLE_DELTA: f64 = 0.1;
const DIRECTIONAL_DELTA: f64 = 0.3;

/// Glucose band counted as "in range" by session summaries, mmol/L.
pub const GLUCOSE_TARGET_RANGE: (f64, f64) = (4.0, 7.0);

/// Direction of a channel's history. The history must already contain the
/// newest reading.
pub fn compute_trend(history: &[f64]) -> Trend {
    if history.len() < TREND_MIN_POINTS {
        return Trend::Stable;
    }

    let recent = &history[history.len().saturating_sub(TREND_WINDOW)..];
    let deltas: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();
    let avg_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;

    if avg_delta.abs() < STABLE_DELTA {
        Trend::Stable
    } else if avg_delta > DIRECTIONAL_DELTA {
        Trend::Rising
    } else if avg_delta < -DIRECTIONAL_DELTA {
        Trend::Falling
    } else {
        Trend::Volatile
    }
}

/// Deviation of `value` from `baseline`, in [0, 1].
///
/// Inside `range` the score grows with distance from the baseline and tops out
/// at 0.5; outside it starts at 0.5 and saturates at 1.0. A zero-width range,
/// or a baseline not strictly inside the range, scores 0 inside and 1 outside.
pub fn compute_anomaly_score(value: f64, baseline: f64, range: (f64, f64)) -> f64 {
    let (lower, upper) = range;
    if !value.is_finite() {
        return 1.0;
    }

    let inside = value >= lower && value <= upper;
    let degenerate = !(upper > lower) || baseline <= lower || baseline >= upper;
    if degenerate {
        return if inside { 0.0 } else { 1.0 };
    }

    let score = if inside {
        (0.5 * (value - baseline).abs() / (upper - lower)).min(0.5)
    } else if value < lower {
        (0.5 + 0.5 * (lower - value) / (baseline - lower)).min(1.0)
    } else {
        (0.5 + 0.5 * (value - upper) / (upper - baseline)).min(1.0)
    };
    score.clamp(0.0, 1.0)
}

fn glucose_component(glucose: f64) -> f64 {
    if (4.0..=7.0).contains(&glucose) {
        100.0
    } else if (3.5..4.0).contains(&glucose) || (glucose > 7.0 && glucose <= 9.0) {
        70.0
    } else if (3.0..3.5).contains(&glucose) || (glucose > 9.0 && glucose <= 11.0) {
        40.0
    } else {
        10.0
    }
}

fn heart_rate_component(heart_rate: f64) -> f64 {
    if (70.0..=110.0).contains(&heart_rate) {
        100.0
    } else if (60.0..70.0).contains(&heart_rate) || (heart_rate > 110.0 && heart_rate <= 120.0) {
        80.0
    } else {
        50.0
    }
}

/// Aggregate 0-100 score of the current state, rounded to one decimal.
pub fn compute_health_score(state: &StateSnapshot) -> f64 {
    // Each stage blends into the running score rather than summing weighted
    // components, so an all-ideal state lands at 77.0, not 100. Kept as is;
    // recorded scores depend on this exact order.
    let mut score = 100.0;
    score = score * 0.4 + glucose_component(state.glucose) * 0.4;
    score = score * 0.6 + heart_rate_component(state.heart_rate) * 0.2;
    score = score * 0.8 + state.mood * 100.0 * 0.2;
    score = score * 0.9 + (state.activity * 100.0).min(100.0) * 0.1;
    score = (score - state.stress * 20.0).max(0.0);
    round_to(score, 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlucoseStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Share of rows inside `GLUCOSE_TARGET_RANGE`, 0-1.
    pub time_in_range: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub cycles: u64,
    pub danger_events: u64,
    pub monitor_events: u64,
    pub safe_events: u64,
    pub unlabeled_events: u64,
    pub anomalies_detected: u64,
    pub glucose: Option<GlucoseStats>,
    pub mean_health_score: Option<f64>,
}

/// Reads a state time-series log back and aggregates it.
pub fn summarize_session(log_path: impl AsRef<Path>) -> Result<SessionSummary, VitalSimError> {
    let log_path = log_path.as_ref();
    let display = log_path.display().to_string();
    let mut reader = csv::Reader::from_path(log_path)
        .map_err(|e| VitalSimError::CsvError(display.clone(), e))?;

    let mut summary = SessionSummary::default();
    let mut glucose_values = Vec::new();
    let mut health_scores = Vec::new();

    for result in reader.deserialize() {
        let record: StateLogEntry =
            result.map_err(|e| VitalSimError::CsvError(display.clone(), e))?;
        summary.cycles += 1;

        match record.safety_status.parse::<SafetyStatus>() {
            Ok(SafetyStatus::Danger) => summary.danger_events += 1,
            Ok(SafetyStatus::Monitor) => summary.monitor_events += 1,
            Ok(SafetyStatus::Safe) => summary.safe_events += 1,
            Err(_) => summary.unlabeled_events += 1,
        }
        if record.anomaly_score.map_or(false, |s| s > ANOMALY_THRESHOLD) {
            summary.anomalies_detected += 1;
        }
        glucose_values.push(record.glucose);
        if let Some(score) = record.health_score {
            health_scores.push(score);
        }
    }

    if !glucose_values.is_empty() {
        let count = glucose_values.len() as f64;
        let in_range = glucose_values
            .iter()
            .filter(|g| (GLUCOSE_TARGET_RANGE.0..=GLUCOSE_TARGET_RANGE.1).contains(*g))
            .count() as f64;
        summary.glucose = Some(GlucoseStats {
            min: glucose_values.iter().copied().fold(f64::INFINITY, f64::min),
            mean: glucose_values.iter().sum::<f64>() / count,
            max: glucose_values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            time_in_range: in_range / count,
        });
    }
    if !health_scores.is_empty() {
        summary.mean_health_score =
            Some(health_scores.iter().sum::<f64>() / health_scores.len() as f64);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalsim_schemas::environment::{Environment, SleepState};

    fn snapshot(glucose: f64, heart_rate: f64, mood: f64, activity: f64, stress: f64) -> StateSnapshot {
        StateSnapshot {
            glucose,
            heart_rate,
            mood,
            activity,
            temperature: 36.8,
            spo2: 98.0,
            respiratory_rate: 22.0,
            hydration: 0.75,
            stress,
            asthma_risk: 0.2,
            sleep_state: SleepState::Awake,
            environment: Environment::default(),
        }
    }

    #[test]
    fn trend_needs_three_points() {
        assert_eq!(compute_trend(&[]), Trend::Stable);
        assert_eq!(compute_trend(&[1.0, 9.0]), Trend::Stable);
    }

    #[test]
    fn trend_directions() {
        assert_eq!(compute_trend(&[5.0, 5.5, 6.0, 6.5]), Trend::Rising);
        assert_eq!(compute_trend(&[6.5, 6.0, 5.5]), Trend::Falling);
        assert_eq!(compute_trend(&[5.0, 5.05, 5.0, 5.02]), Trend::Stable);
        assert_eq!(compute_trend(&[5.0, 5.2, 5.4]), Trend::Volatile);
    }

    #[test]
    fn trend_only_looks_at_last_five() {
        // A steep early rise falls out of the window.
        let history = [1.0, 5.0, 9.0, 9.0, 9.0, 9.0, 9.0];
        assert_eq!(compute_trend(&history), Trend::Stable);
    }

    #[test]
    fn anomaly_score_branches() {
        assert_eq!(compute_anomaly_score(5.5, 5.5, (4.0, 7.0)), 0.0);
        assert!((compute_anomaly_score(7.0, 5.5, (4.0, 7.0)) - 0.25).abs() < 1e-12);
        assert!((compute_anomaly_score(4.0, 5.5, (4.0, 7.0)) - 0.25).abs() < 1e-12);
        assert!((compute_anomaly_score(3.25, 5.5, (4.0, 7.0)) - 0.75).abs() < 1e-12);
        assert_eq!(compute_anomaly_score(2.0, 5.5, (4.0, 7.0)), 1.0);
        assert!((compute_anomaly_score(8.5, 5.5, (4.0, 7.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_ranges_do_not_divide_by_zero() {
        assert_eq!(compute_anomaly_score(5.0, 5.0, (5.0, 5.0)), 0.0);
        assert_eq!(compute_anomaly_score(6.0, 5.0, (5.0, 5.0)), 1.0);
        assert_eq!(compute_anomaly_score(80.0, 70.0, (70.0, 110.0)), 0.0);
        assert_eq!(compute_anomaly_score(65.0, 120.0, (70.0, 110.0)), 1.0);
    }

    #[test]
    fn ideal_state_scores_77() {
        assert_eq!(compute_health_score(&snapshot(5.5, 90.0, 1.0, 1.0, 0.0)), 77.0);
    }

    #[test]
    fn stress_lowers_score_and_floors_at_zero() {
        let calm = compute_health_score(&snapshot(5.5, 90.0, 0.7, 0.5, 0.0));
        let stressed = compute_health_score(&snapshot(5.5, 90.0, 0.7, 0.5, 1.0));
        assert!((calm - stressed - 20.0).abs() < 0.11);
        assert!(compute_health_score(&snapshot(2.5, 140.0, 0.0, 0.0, 1.0)) >= 0.0);
    }
}
