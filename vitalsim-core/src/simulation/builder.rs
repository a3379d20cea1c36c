use crate::{
    error::VitalSimError,
    profile::SubjectProfile,
    simulation::{
        clock::{Clock, SystemClock},
        engine::{SimulationEngine, CHANNEL_WEIGHTS},
        state::PhysiologicalState,
    },
};
use rand::{distributions::WeightedIndex, rngs::StdRng, SeedableRng};
use vitalsim_schemas::environment::Environment;

/// A fluent builder for constructing a `SimulationEngine`.
///
/// Only the subject profile is required. Without a seed the engine draws from
/// OS entropy; without a clock it reads the system time.
#[derive(Default)]
pub struct SimulationBuilder {
    profile: Option<SubjectProfile>,
    seed: Option<u64>,
    clock: Option<Box<dyn Clock>>,
    environment: Option<Environment>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validated profile of the subject to simulate.
    pub fn with_profile(mut self, profile: SubjectProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Seeds the random generator so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_optional_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Overrides the starting environmental conditions.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Consumes the builder and returns a ready `SimulationEngine`.
    ///
    /// # Errors
    ///
    /// Returns `VitalSimError::ConfigError` if no profile was provided.
    pub fn build(self) -> Result<SimulationEngine, VitalSimError> {
        let profile = self
            .profile
            .ok_or_else(|| VitalSimError::ConfigError("a subject profile is required".to_string()))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(SystemClock) as Box<dyn Clock>);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let channel_picker = WeightedIndex::new(CHANNEL_WEIGHTS.iter().map(|(_, w)| *w))
            .map_err(|e| VitalSimError::ConfigError(format!("invalid channel weights: {}", e)))?;

        let state = PhysiologicalState::new(
            &profile,
            clock.now(),
            self.environment.unwrap_or_default(),
        );

        Ok(SimulationEngine {
            profile,
            state,
            rng,
            clock,
            channel_picker,
        })
    }
}
