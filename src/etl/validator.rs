//! Schema validation for normalized candidate records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized, pre-validation record built by the loader from one raw row.
///
/// All fields except `name` are optional; date fields are either ISO-8601
/// or absent by the time a candidate reaches validation.
#[derive(Debug, Clone, Default)]
pub struct CandidateRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_joined: Option<String>,
    pub biography: Option<String>,
    pub last_activity: Option<String>,
}

/// A record that has passed schema validation.
///
/// Invariants: `name` is non-empty and title-cased; all present dates are
/// ISO-8601.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidRecord {
    pub name: String,
    pub email: Option<String>,
    pub date_joined: Option<String>,
    pub biography: Option<String>,
    pub last_activity: Option<String>,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Join field errors into one human-readable reason string.
pub fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation options resolved from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Treat `date_joined` as structurally required. Off by default.
    pub require_date_joined: bool,
}

/// Validate a normalized candidate against the member schema.
///
/// `name` is the only field required by default. Absent optional fields are
/// valid; the absent-vs-unparseable distinction is the loader's concern and
/// only surfaces here for structurally required fields.
pub fn validate(
    candidate: CandidateRecord,
    options: ValidationOptions,
) -> Result<ValidRecord, Vec<FieldError>> {
    let mut errors = Vec::new();

    // An invalid name always takes the error return below, so the
    // placeholder never escapes.
    let name = match candidate.name {
        Some(ref n) if !n.trim().is_empty() => n.clone(),
        _ => {
            errors.push(FieldError {
                field: "name",
                reason: "Invalid Name".to_string(),
            });
            String::new()
        }
    };

    if options.require_date_joined && candidate.date_joined.is_none() {
        errors.push(FieldError {
            field: "date_joined",
            reason: "missing required date".to_string(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidRecord {
        name,
        email: candidate.email,
        date_joined: candidate.date_joined,
        biography: candidate.biography,
        last_activity: candidate.last_activity,
    })
}
