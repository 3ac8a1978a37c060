//! Deterministic offline classifier.

use super::classifier::{Classification, Classifier, ClassifyError};
use async_trait::async_trait;

/// Classifier used when no API key is configured.
///
/// Returns a fixed canned result so the pipeline stays testable and
/// repeatable without network access.
pub struct OfflineClassifier;

impl OfflineClassifier {
    pub fn canned_result() -> Classification {
        Classification {
            skills: vec!["Mock Skill 1".to_string(), "Python".to_string()],
            persona: "Observer".to_string(),
            confidence_score: 0.5,
        }
    }
}

#[async_trait]
impl Classifier for OfflineClassifier {
    fn name(&self) -> &str {
        "offline"
    }

    fn is_offline(&self) -> bool {
        true
    }

    async fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
        Ok(Self::canned_result())
    }
}
