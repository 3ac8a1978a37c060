//! Biography classification and record enrichment.
//!
//! The classifier is a trait with two implementations: a remote HTTP
//! backend and a deterministic offline substitute. Selection happens once
//! at construction via [`create_classifier`].

mod classifier;
mod offline;
mod processor;
mod prompt;
mod remote;

pub use classifier::{
    create_classifier, Classification, Classifier, ClassifierSettings, ClassifyError,
};
pub use offline::OfflineClassifier;
pub use processor::{EnrichedRecord, EnrichmentProcessor, MIN_BIO_LEN};
pub use prompt::member_classification_prompt;
pub use remote::RemoteClassifier;
