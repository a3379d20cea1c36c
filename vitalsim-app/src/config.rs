use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};
use vitalsim_schemas::{
    file_formats::ProfileFile,
    profile::{Condition, ProfileInput},
};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "vitalsim.yaml";

/// Everything the binary reads from its YAML config. Every field has a
/// default, so a missing or empty file still gives a runnable setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_dir: PathBuf,
    pub timeseries_dir: Option<PathBuf>,
    pub interval_seconds: f64,
    pub classifier: ClassifierSettings,
    /// Optional separate profile store, merged after `subjects`.
    pub profiles_file: Option<PathBuf>,
    pub subjects: Vec<ProfileInput>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("data/history"),
            timeseries_dir: Some(PathBuf::from("data/timeseries")),
            interval_seconds: 5.0,
            classifier: ClassifierSettings::default(),
            profiles_file: None,
            subjects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            timeout_seconds: 5.0,
        }
    }
}

impl ClassifierSettings {
    /// The API key, if the remote classifier is enabled and a key is set.
    pub fn api_key(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Result<Duration> {
        seconds(self.timeout_seconds).context("Invalid classifier.timeout_seconds")
    }
}

impl AppConfig {
    /// Reads the config at `path`, or `vitalsim.yaml` if present, or falls
    /// back to defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => PathBuf::from(DEFAULT_CONFIG_PATH),
            None => {
                let mut config = Self::default();
                config.finish()?;
                return Ok(config);
            }
        };

        info!(path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        };
        config.finish()?;
        Ok(config)
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(profiles_path) = self.profiles_file.clone() {
            let contents = fs::read_to_string(&profiles_path).with_context(|| {
                format!("Failed to read profiles file: {}", profiles_path.display())
            })?;
            let file: ProfileFile = serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse profiles file: {}", profiles_path.display())
            })?;
            info!(
                path = %profiles_path.display(),
                subjects = file.subjects.len(),
                schema = %file.schema_version,
                "loaded profile store"
            );
            self.subjects.extend(file.subjects);
        }

        if self.subjects.is_empty() {
            debug!("no subjects configured, using the default profile");
            self.subjects.push(default_subject());
        }
        self.interval()?;
        self.classifier.timeout()?;
        Ok(())
    }

    pub fn interval(&self) -> Result<Duration> {
        seconds(self.interval_seconds).context("Invalid interval_seconds")
    }

    /// The subject used when none is named on the command line.
    pub fn default_subject_id(&self) -> &str {
        self.subjects
            .first()
            .map(|s| s.id.as_str())
            .unwrap_or("default")
    }
}

pub fn default_subject() -> ProfileInput {
    ProfileInput {
        id: "default".to_string(),
        name: None,
        age: 7,
        condition: Condition::Diabetes,
        baseline_glucose: None,
        baseline_heart_rate: None,
        baseline_spo2: None,
    }
}

pub fn seconds(value: f64) -> Result<Duration> {
    if !value.is_finite() || value < 0.0 {
        bail!("expected a non-negative number of seconds, got {}", value);
    }
    Ok(Duration::from_secs_f64(value))
}
