//! Roster ingestion: normalization, validation, and CSV loading.

mod loader;
mod normalizer;
mod validator;

pub use loader::{load_and_process, ErrorRecord, LoadOutcome};
pub use normalizer::{normalize_name, standardize_date};
pub use validator::{
    format_field_errors, validate, CandidateRecord, FieldError, ValidRecord, ValidationOptions,
};
