//! Wire types exchanged with a safety classifier.

use crate::environment::{Environment, SleepState};
use crate::event::{EventType, HealthEvent, SafetyStatus};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of a subject's current physiological values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub glucose: f64,
    pub heart_rate: f64,
    pub mood: f64,
    pub activity: f64,
    pub temperature: f64,
    pub spo2: f64,
    pub respiratory_rate: f64,
    pub hydration: f64,
    pub stress: f64,
    pub asthma_risk: f64,
    pub sleep_state: SleepState,
    pub environment: Environment,
}

/// Compact summary of an earlier event, used as classifier context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub event_type: EventType,
    pub value: f64,
    pub unit: String,
    pub safety_status: Option<SafetyStatus>,
}

impl From<&HealthEvent> for RecentEvent {
    fn from(event: &HealthEvent) -> Self {
        Self {
            event_type: event.event_type,
            value: event.value,
            unit: event.unit.clone(),
            safety_status: event.safety_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub subject_id: String,
    pub event: HealthEvent,
    pub recent_events: Vec<RecentEvent>,
    pub state: StateSnapshot,
}

/// The classifier's answer: a status plus a short justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: SafetyStatus,
    #[serde(default = "default_reasoning")]
    pub reasoning: String,
}

impl Verdict {
    pub fn new(status: SafetyStatus, reasoning: impl Into<String>) -> Self {
        Self {
            status,
            reasoning: reasoning.into(),
        }
    }
}

fn default_reasoning() -> String {
    "No reasoning provided".to_string()
}
