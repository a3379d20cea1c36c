use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// 0-1, 1 = excellent.
    pub air_quality: f64,
    /// 0-1, 1 = very high.
    pub pollen_count: f64,
    pub humidity: f64,
    pub ambient_temperature: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            air_quality: 0.8,
            pollen_count: 0.3,
            humidity: 0.5,
            ambient_temperature: 22.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepState {
    #[default]
    Awake,
    LightSleep,
    DeepSleep,
}

impl SleepState {
    pub fn as_str(self) -> &'static str {
        match self {
            SleepState::Awake => "awake",
            SleepState::LightSleep => "light_sleep",
            SleepState::DeepSleep => "deep_sleep",
        }
    }

    pub fn is_asleep(self) -> bool {
        self != SleepState::Awake
    }
}
