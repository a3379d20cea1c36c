use crate::profile::Condition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    /// Short clinical situation, 5-15 simulated minutes.
    Episode,
    /// Phases of a whole simulated day.
    FullDay,
}

impl ScenarioCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioCategory::Episode => "episode",
            ScenarioCategory::FullDay => "full_day",
        }
    }

    pub fn default_event_count(self) -> usize {
        match self {
            ScenarioCategory::Episode => 5,
            ScenarioCategory::FullDay => 12,
        }
    }
}

/// Catalog entry returned by a scenario listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ScenarioCategory,
    pub duration_minutes: u32,
    pub conditions: Vec<Condition>,
}
