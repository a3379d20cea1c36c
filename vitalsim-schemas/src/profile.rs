use serde::{Deserialize, Serialize};
use std::fmt;

/// The chronic condition a simulated subject is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Diabetes,
    Asthma,
    Both,
    None,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::Asthma => "asthma",
            Condition::Both => "both",
            Condition::None => "none",
        }
    }

    pub fn has_diabetes(self) -> bool {
        matches!(self, Condition::Diabetes | Condition::Both)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diabetes" => Ok(Condition::Diabetes),
            "asthma" => Ok(Condition::Asthma),
            "both" => Ok(Condition::Both),
            "none" => Ok(Condition::None),
            other => Err(format!("unknown condition '{}'", other)),
        }
    }
}

/// Subject profile as it arrives from the profile store or a config file.
/// Nothing here is trusted until it has been validated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub age: i32,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub baseline_glucose: Option<f64>,
    #[serde(default)]
    pub baseline_heart_rate: Option<f64>,
    #[serde(default)]
    pub baseline_spo2: Option<f64>,
}

/// Per-subject reference values that current readings drift around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    pub glucose: f64,
    pub heart_rate: f64,
    pub spo2: f64,
    pub temperature: f64,
    pub respiratory_rate: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
}
