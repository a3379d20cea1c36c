use super::{RuleBasedClassifier, SafetyClassifier};
use crate::error::VitalSimError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;
use vitalsim_schemas::classification::{ClassificationRequest, Verdict};

pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a primary classifier with a deadline. Any error or timeout from the
/// primary is answered by the rule-based classifier instead.
pub struct FallbackClassifier<P> {
    primary: P,
    rules: RuleBasedClassifier,
    timeout: Duration,
}

impl<P: SafetyClassifier> FallbackClassifier<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            rules: RuleBasedClassifier::new(),
            timeout: DEFAULT_CLASSIFIER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub async fn classify_or_fallback(&self, request: &ClassificationRequest) -> Verdict {
        match tokio::time::timeout(self.timeout, self.primary.classify(request)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(
                    classifier = self.primary.name(),
                    error = %e,
                    "classifier failed, using rule-based fallback"
                );
                self.rules.evaluate(&request.event)
            }
            Err(_) => {
                warn!(
                    classifier = self.primary.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "classifier timed out, using rule-based fallback"
                );
                self.rules.evaluate(&request.event)
            }
        }
    }
}

#[async_trait]
impl<P: SafetyClassifier> SafetyClassifier for FallbackClassifier<P> {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, VitalSimError> {
        Ok(self.classify_or_fallback(request).await)
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
