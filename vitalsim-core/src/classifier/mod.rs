//! Safety classification of generated events.

mod fallback;
mod remote;
mod rules;

pub use fallback::{FallbackClassifier, DEFAULT_CLASSIFIER_TIMEOUT};
pub use remote::{RemoteClassifier, RemoteClassifierConfig};
pub use rules::RuleBasedClassifier;

use crate::error::VitalSimError;
use async_trait::async_trait;
use std::sync::Arc;
use vitalsim_schemas::classification::{ClassificationRequest, Verdict};

/// Maps an event plus context to a SAFE/MONITOR/DANGER verdict.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SafetyClassifier + ?Sized> SafetyClassifier for Box<T> {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError> {
        (**self).classify(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: SafetyClassifier + ?Sized> SafetyClassifier for Arc<T> {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError> {
        (**self).classify(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
