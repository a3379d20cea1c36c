use crate::error::VitalSimError;
use csv::{Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use vitalsim_schemas::{classification::StateSnapshot, event::HealthEvent};

/// One row of the state time-series log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateLogEntry {
    pub cycle: u64,
    pub timestamp: String,
    pub subject_id: String,
    pub glucose: f64,
    pub heart_rate: f64,
    pub mood: f64,
    pub activity: f64,
    pub spo2: f64,
    pub respiratory_rate: f64,
    pub stress: f64,
    pub asthma_risk: f64,
    pub air_quality: f64,
    pub pollen_count: f64,
    pub event_type: String,
    pub safety_status: String,
    pub health_score: Option<f64>,
    pub anomaly_score: Option<f64>,
}

/// Appends one CSV row per pipeline cycle. An existing log is extended, and
/// the header is only written when the file starts out empty.
pub struct TimeSeriesLogger {
    writer: Writer<fs::File>,
    path: PathBuf,
}

impl TimeSeriesLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, VitalSimError> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| VitalSimError::FileIO(display.clone(), e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| VitalSimError::FileIO(display.clone(), e))?;
        let is_empty = file
            .metadata()
            .map_err(|e| VitalSimError::FileIO(display, e))?
            .len()
            == 0;

        let writer = WriterBuilder::new().has_headers(is_empty).from_writer(file);
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_cycle(
        &mut self,
        cycle: u64,
        subject_id: &str,
        state: &StateSnapshot,
        event: &HealthEvent,
    ) -> Result<(), VitalSimError> {
        let entry = StateLogEntry {
            cycle,
            timestamp: event.timestamp.to_rfc3339(),
            subject_id: subject_id.to_string(),
            glucose: state.glucose,
            heart_rate: state.heart_rate,
            mood: state.mood,
            activity: state.activity,
            spo2: state.spo2,
            respiratory_rate: state.respiratory_rate,
            stress: state.stress,
            asthma_risk: state.asthma_risk,
            air_quality: state.environment.air_quality,
            pollen_count: state.environment.pollen_count,
            event_type: event.event_type.as_str().to_string(),
            safety_status: event
                .safety_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            health_score: event.health_score,
            anomaly_score: event.anomaly_score,
        };

        let display = self.path.display().to_string();
        self.writer
            .serialize(entry)
            .map_err(|e| VitalSimError::CsvError(display.clone(), e))?;
        self.writer
            .flush()
            .map_err(|e| VitalSimError::FileIO(display, e))?;
        Ok(())
    }
}
