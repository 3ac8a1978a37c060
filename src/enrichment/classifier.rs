//! Classifier trait definition and wire contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Structured classification extracted from a free-text biography.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    #[serde(default)]
    pub skills: Vec<String>,
    pub persona: String,
    pub confidence_score: f64,
}

impl Classification {
    /// Enforce the response contract: persona non-empty, confidence in [0, 1].
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.persona.trim().is_empty() {
            return Err(ClassifyError::InvalidResponse(
                "persona must be a non-empty string".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_score) || self.confidence_score.is_nan() {
            return Err(ClassifyError::InvalidResponse(format!(
                "confidence_score {} out of range [0, 1]",
                self.confidence_score
            )));
        }
        Ok(())
    }
}

/// Errors that can occur when classifying a biography.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for biography classifiers.
///
/// Implementations connect to a text-analysis backend or provide a
/// deterministic offline substitute. The implementation is selected once at
/// construction; call sites never branch on the mode.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// The classifier's name (e.g. "remote", "offline").
    fn name(&self) -> &str;

    /// Whether this classifier runs without network access.
    fn is_offline(&self) -> bool;

    /// Classify a free-text biography into skills, persona, and confidence.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;
}

/// Settings for classifier construction.
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Select a classifier implementation from settings.
///
/// Without a configured API key the pipeline runs fully offline with a
/// deterministic canned result, so batches remain testable and repeatable
/// with no network access.
pub fn create_classifier(settings: &ClassifierSettings) -> Arc<dyn Classifier> {
    match &settings.api_key {
        Some(key) if !key.trim().is_empty() => {
            info!(model = %settings.model, "Using remote classifier");
            Arc::new(super::remote::RemoteClassifier::new(
                &settings.base_url,
                &settings.model,
                key,
                std::time::Duration::from_secs(settings.timeout_secs),
            ))
        }
        _ => {
            info!("No classifier API key configured, using offline classifier");
            Arc::new(super::offline::OfflineClassifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(persona: &str, confidence: f64) -> Classification {
        Classification {
            skills: vec!["rust".to_string()],
            persona: persona.to_string(),
            confidence_score: confidence,
        }
    }

    #[test]
    fn test_validate_accepts_contract_shape() {
        assert!(classification("Contributor", 0.0).validate().is_ok());
        assert!(classification("Observer", 1.0).validate().is_ok());
        assert!(classification("Mentor Material", 0.5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_persona() {
        let result = classification("", 0.5).validate();
        assert!(matches!(result, Err(ClassifyError::InvalidResponse(_))));
        let result = classification("   ", 0.5).validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        assert!(classification("Observer", -0.1).validate().is_err());
        assert!(classification("Observer", 1.1).validate().is_err());
        assert!(classification("Observer", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_create_classifier_offline_without_api_key() {
        let classifier = create_classifier(&ClassifierSettings::default());
        assert!(classifier.is_offline());

        let settings = ClassifierSettings {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(create_classifier(&settings).is_offline());
    }

    #[test]
    fn test_create_classifier_remote_with_api_key() {
        let settings = ClassifierSettings {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let classifier = create_classifier(&settings);
        assert!(!classifier.is_offline());
        assert_eq!(classifier.name(), "remote");
    }
}
