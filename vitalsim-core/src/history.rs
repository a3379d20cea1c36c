use crate::error::VitalSimError;
use crate::profile::validate_subject_id;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use vitalsim_schemas::event::HealthEvent;

/// One persisted line: the event's own fields plus the subject it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub subject_id: String,
    #[serde(flatten)]
    pub event: HealthEvent,
}

/// Append-only store for labeled events.
pub trait HistorySink: Send + Sync {
    fn append(&mut self, subject_id: &str, event: &HealthEvent) -> Result<(), VitalSimError>;

    /// The newest `limit` records for a subject, oldest first.
    fn read_recent(&self, subject_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, VitalSimError>;
}

/// One `<subject_id>.jsonl` file per subject under a shared directory.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    dir: PathBuf,
}

impl JsonlHistory {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, VitalSimError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| VitalSimError::HistoryWrite(dir.clone(), e))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, subject_id: &str) -> Result<PathBuf, VitalSimError> {
        validate_subject_id(subject_id)?;
        Ok(self.dir.join(format!("{}.jsonl", subject_id)))
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, subject_id: &str, event: &HealthEvent) -> Result<(), VitalSimError> {
        let path = self.path_for(subject_id)?;
        let record = HistoryRecord {
            subject_id: subject_id.to_string(),
            event: event.clone(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        // A single write of the whole line keeps concurrent readers on record boundaries.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| VitalSimError::HistoryWrite(path.clone(), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| VitalSimError::HistoryWrite(path, e))
    }

    fn read_recent(&self, subject_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, VitalSimError> {
        let path = self.path_for(subject_id)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(VitalSimError::HistoryRead(path, e)),
        };

        // Split on raw bytes so one corrupt line cannot spoil the rest of the file.
        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line.map_err(|e| VitalSimError::HistoryRead(path.clone(), e))?;
            let text = match std::str::from_utf8(&line) {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), line = index + 1, error = %e, "skipping non-UTF-8 history line");
                    continue;
                }
            };
            match serde_json::from_str::<HistoryRecord>(text) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), line = index + 1, error = %e, "skipping unreadable history line");
                }
            }
        }

        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitalsim_schemas::event::{EventType, SafetyStatus, Urgency};

    fn event(value: f64) -> HealthEvent {
        HealthEvent::new(Utc::now(), EventType::GlucoseNormal, value, "mmol/L", Urgency::Low)
            .labeled(SafetyStatus::Safe, "ok")
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(dir.path()).unwrap();
        assert!(history.read_recent("nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn read_recent_keeps_newest_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(dir.path()).unwrap();
        for value in [5.0, 5.5, 6.0] {
            history.append("kid-1", &event(value)).unwrap();
        }
        let path = history.path_for("kid-1").unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        history.append("kid-1", &event(6.5)).unwrap();

        let recent = history.read_recent("kid-1", 2).unwrap();
        let values: Vec<f64> = recent.iter().map(|r| r.event.value).collect();
        assert_eq!(values, vec![6.0, 6.5]);
        assert!(recent.iter().all(|r| r.subject_id == "kid-1"));
    }

    #[test]
    fn non_utf8_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(dir.path()).unwrap();
        history.append("kid", &event(5.0)).unwrap();
        let path = history.path_for("kid").unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        history.append("kid", &event(5.8)).unwrap();

        let values: Vec<f64> = history
            .read_recent("kid", 10)
            .unwrap()
            .iter()
            .map(|r| r.event.value)
            .collect();
        assert_eq!(values, vec![5.0, 5.8]);
    }

    #[test]
    fn rejects_path_like_subject_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(dir.path()).unwrap();
        assert!(matches!(
            history.append("../escape", &event(5.0)),
            Err(VitalSimError::InvalidProfileInput(_))
        ));
    }
}
