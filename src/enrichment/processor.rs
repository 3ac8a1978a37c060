//! Enrichment pipeline: applies a classifier to each valid record's
//! biography and merges the result, degrading to a fallback state on
//! failure.

use super::classifier::Classifier;
use crate::etl::ValidRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Biographies shorter than this are not worth a classification call.
pub const MIN_BIO_LEN: usize = 5;

/// A valid record augmented with classification data.
///
/// `enriched == false` together with empty skills, persona "Unknown" and
/// confidence 0.0 is the explicit fallback state for absent/short
/// biographies and failed classification calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    pub record: ValidRecord,
    pub skills: Vec<String>,
    pub persona: String,
    pub confidence_score: f64,
    pub enriched: bool,
    /// Advisory marker set when the classifier was attempted and failed.
    pub error: Option<String>,
}

impl EnrichedRecord {
    fn fallback(record: ValidRecord, error: Option<String>) -> Self {
        Self {
            record,
            skills: Vec::new(),
            persona: "Unknown".to_string(),
            confidence_score: 0.0,
            enriched: false,
            error,
        }
    }
}

/// Drives the classifier over batches of valid records.
pub struct EnrichmentProcessor {
    classifier: Arc<dyn Classifier>,
}

impl EnrichmentProcessor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Whether the underlying classifier runs without network access.
    pub fn is_offline(&self) -> bool {
        self.classifier.is_offline()
    }

    /// Enrich one record. Never fails: classification errors degrade the
    /// record to the fallback state with an advisory marker.
    pub async fn enrich(&self, record: ValidRecord) -> EnrichedRecord {
        let biography = match record.biography.as_deref() {
            Some(bio) if bio.chars().count() >= MIN_BIO_LEN => bio.to_string(),
            _ => {
                debug!(name = %record.name, "Biography absent or too short, skipping classification");
                return EnrichedRecord::fallback(record, None);
            }
        };

        match self.classifier.classify(&biography).await {
            Ok(classification) => EnrichedRecord {
                record,
                skills: classification.skills,
                persona: classification.persona,
                confidence_score: classification.confidence_score,
                enriched: true,
                error: None,
            },
            Err(err) => {
                warn!(name = %record.name, error = %err, "Classification failed, using fallback state");
                EnrichedRecord::fallback(record, Some(err.to_string()))
            }
        }
    }

    /// Enrich a batch sequentially, preserving input order. One record's
    /// failure never affects another's.
    pub async fn process_batch(&self, records: Vec<ValidRecord>) -> Vec<EnrichedRecord> {
        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(self.enrich(record).await);
        }
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::classifier::{Classification, ClassifyError};
    use crate::enrichment::offline::OfflineClassifier;
    use async_trait::async_trait;

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn is_offline(&self) -> bool {
            true
        }

        async fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
            Err(ClassifyError::Connection("no route to host".to_string()))
        }
    }

    fn record(name: &str, biography: Option<&str>) -> ValidRecord {
        ValidRecord {
            name: name.to_string(),
            email: None,
            date_joined: None,
            biography: biography.map(str::to_string),
            last_activity: None,
        }
    }

    #[tokio::test]
    async fn test_enrich_merges_classification() {
        let processor = EnrichmentProcessor::new(Arc::new(OfflineClassifier));
        let enriched = processor
            .enrich(record("Jane Doe", Some("Loves mentoring new volunteers in Mumbai")))
            .await;
        assert!(enriched.enriched);
        assert_eq!(enriched.persona, "Observer");
        assert_eq!(enriched.skills, vec!["Mock Skill 1", "Python"]);
        assert_eq!(enriched.confidence_score, 0.5);
        assert!(enriched.error.is_none());
    }

    #[tokio::test]
    async fn test_enrich_skips_absent_biography() {
        let processor = EnrichmentProcessor::new(Arc::new(OfflineClassifier));
        let enriched = processor.enrich(record("Jane Doe", None)).await;
        assert!(!enriched.enriched);
        assert!(enriched.skills.is_empty());
        assert_eq!(enriched.persona, "Unknown");
        assert_eq!(enriched.confidence_score, 0.0);
        assert!(enriched.error.is_none());
    }

    #[tokio::test]
    async fn test_enrich_skips_short_biography() {
        let processor = EnrichmentProcessor::new(Arc::new(OfflineClassifier));
        let enriched = processor.enrich(record("Jane Doe", Some("n/a"))).await;
        assert!(!enriched.enriched);
        assert_eq!(enriched.persona, "Unknown");
    }

    #[tokio::test]
    async fn test_enrich_minimum_length_counts_characters_not_bytes() {
        let processor = EnrichmentProcessor::new(Arc::new(OfflineClassifier));
        // Three characters but six bytes; still too short to classify.
        let enriched = processor.enrich(record("Jane Doe", Some("ééé"))).await;
        assert!(!enriched.enriched);

        // Five characters is exactly enough.
        let enriched = processor.enrich(record("Jane Doe", Some("ééééé"))).await;
        assert!(enriched.enriched);
    }

    #[tokio::test]
    async fn test_enrich_degrades_on_classifier_failure() {
        let processor = EnrichmentProcessor::new(Arc::new(FailingClassifier));
        let enriched = processor
            .enrich(record("Jane Doe", Some("A long enough biography")))
            .await;
        assert!(!enriched.enriched);
        assert_eq!(enriched.persona, "Unknown");
        assert!(enriched.error.as_deref().unwrap().contains("no route to host"));
    }

    #[tokio::test]
    async fn test_process_batch_preserves_order_and_isolates_failures() {
        let processor = EnrichmentProcessor::new(Arc::new(OfflineClassifier));
        let batch = vec![
            record("First Person", Some("Runs the local coding club")),
            record("Second Person", None),
            record("Third Person", Some("Helps with event logistics")),
        ];
        let enriched = processor.process_batch(batch).await;
        let names: Vec<_> = enriched.iter().map(|e| e.record.name.as_str()).collect();
        assert_eq!(names, vec!["First Person", "Second Person", "Third Person"]);
        assert!(enriched[0].enriched);
        assert!(!enriched[1].enriched);
        assert!(enriched[2].enriched);
    }
}
