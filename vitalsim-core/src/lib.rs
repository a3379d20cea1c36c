//! Simulation core: per-subject physiological state, event generation,
//! safety classification, scripted scenarios and event persistence.

pub mod analysis;
pub mod classifier;
pub mod error;
pub mod history;
pub mod logger;
pub mod profile;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod simulation;

pub use error::{Result, VitalSimError};
