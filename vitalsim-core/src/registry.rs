use crate::{
    error::VitalSimError,
    profile::{validate_profile, SubjectProfile},
};
use std::collections::BTreeMap;
use vitalsim_schemas::profile::ProfileInput;

/// Owns the validated profiles of every known subject.
#[derive(Debug, Default, Clone)]
pub struct SubjectRegistry {
    subjects: BTreeMap<String, SubjectProfile>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_inputs(inputs: Vec<ProfileInput>) -> Result<Self, VitalSimError> {
        let mut registry = Self::new();
        for input in inputs {
            registry.register(input)?;
        }
        Ok(registry)
    }

    /// Validates and stores a profile. Registering an existing id replaces it.
    pub fn register(&mut self, input: ProfileInput) -> Result<&SubjectProfile, VitalSimError> {
        let profile = validate_profile(input)?;
        let id = profile.id.clone();
        self.subjects.insert(id.clone(), profile);
        self.get(&id)
    }

    pub fn get(&self, id: &str) -> Result<&SubjectProfile, VitalSimError> {
        self.subjects
            .get(id)
            .ok_or_else(|| VitalSimError::SubjectNotFound(id.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &SubjectProfile> {
        self.subjects.values()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
