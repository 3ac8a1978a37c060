//! CSV roster loading: header synonym resolution, per-row normalization
//! and validation, and partitioning into valid records and annotated errors.

use super::normalizer::{normalize_name, standardize_date};
use super::validator::{
    format_field_errors, validate, CandidateRecord, ValidRecord, ValidationOptions,
};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Accepted source-column synonyms per logical field, in resolution order.
///
/// The table is declarative: adding a new header spelling is an additive
/// change here and nowhere else.
pub const NAME_COLUMNS: &[&str] = &["Full Name", "member_name"];
pub const EMAIL_COLUMNS: &[&str] = &["Email Address"];
pub const DATE_JOINED_COLUMNS: &[&str] = &["Date Joined"];
pub const BIOGRAPHY_COLUMNS: &[&str] = &["Bio_or_comment", "bio_or_comment"];
pub const LAST_ACTIVITY_COLUMNS: &[&str] = &["Last Activity", "last_active_date"];

/// A quarantined input row, kept for manual review. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// 1-based position in the original file, counting the header row.
    /// 0 marks a file-level failure (unreadable file or header row).
    pub row_index: usize,
    pub raw_name: Option<String>,
    pub raw_email: Option<String>,
    pub reason: String,
}

/// The loader's two ordered output sequences. Order matches input row order
/// within each sequence.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub valid: Vec<ValidRecord>,
    pub errors: Vec<ErrorRecord>,
}

/// Map resolved header labels to their column positions.
fn header_positions(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect()
}

/// Resolve one logical field from a row: first synonym present in the file
/// with a non-empty value wins.
fn resolve_field<'a>(
    positions: &HashMap<String, usize>,
    row: &'a StringRecord,
    synonyms: &[&str],
) -> Option<&'a str> {
    for synonym in synonyms {
        if let Some(&pos) = positions.get(*synonym) {
            if let Some(value) = row.get(pos) {
                if !value.trim().is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Load a roster CSV and partition its rows into valid records and errors.
///
/// A missing or unreadable file is fatal to the run: the outcome carries
/// zero valid records and a single error record describing the condition.
/// Row-level failures are local; one bad row never aborts the batch.
pub fn load_and_process(path: &Path, options: ValidationOptions) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(err) => {
            let reason = match err.kind() {
                csv::ErrorKind::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    "File not found".to_string()
                }
                _ => err.to_string(),
            };
            warn!(path = %path.display(), reason = %reason, "Failed to open roster file");
            outcome.errors.push(ErrorRecord {
                row_index: 0,
                raw_name: None,
                raw_email: None,
                reason,
            });
            return outcome;
        }
    };

    let positions = match reader.headers() {
        Ok(headers) => header_positions(headers),
        Err(err) => {
            outcome.errors.push(ErrorRecord {
                row_index: 0,
                raw_name: None,
                raw_email: None,
                reason: format!("Failed to read header row: {}", err),
            });
            return outcome;
        }
    };

    for (index, result) in reader.records().enumerate() {
        // 1-based position in the file, offset by the header row.
        let row_index = index + 2;

        let row = match result {
            Ok(row) => row,
            Err(err) => {
                outcome.errors.push(ErrorRecord {
                    row_index,
                    raw_name: None,
                    raw_email: None,
                    reason: format!("Malformed row: {}", err),
                });
                continue;
            }
        };

        let raw_name = resolve_field(&positions, &row, NAME_COLUMNS).map(str::to_string);
        let raw_email = resolve_field(&positions, &row, EMAIL_COLUMNS).map(str::to_string);
        let raw_date_joined = resolve_field(&positions, &row, DATE_JOINED_COLUMNS);
        let raw_biography = resolve_field(&positions, &row, BIOGRAPHY_COLUMNS);
        let raw_last_activity = resolve_field(&positions, &row, LAST_ACTIVITY_COLUMNS);

        // A row with no usable name is quarantined up front with the bare
        // reason string; the "field: message" join is reserved for
        // validator failures.
        let Some(name) = normalize_name(raw_name.as_deref()) else {
            outcome.errors.push(ErrorRecord {
                row_index,
                raw_name,
                raw_email,
                reason: "Invalid Name".to_string(),
            });
            continue;
        };

        let date_joined = standardize_date(raw_date_joined);

        // Preserve the absent-vs-unparseable distinction: a date that was
        // present but failed standardization only quarantines the row when
        // the field is structurally required.
        if options.require_date_joined && raw_date_joined.is_some() && date_joined.is_none() {
            outcome.errors.push(ErrorRecord {
                row_index,
                raw_name,
                raw_email,
                reason: "date_joined: unparseable date".to_string(),
            });
            continue;
        }

        let candidate = CandidateRecord {
            name: Some(name),
            email: raw_email.clone(),
            date_joined,
            biography: raw_biography.map(str::to_string),
            last_activity: standardize_date(raw_last_activity),
        };

        match validate(candidate, options) {
            Ok(record) => {
                debug!(row = row_index, name = %record.name, "Row accepted");
                outcome.valid.push(record);
            }
            Err(field_errors) => {
                outcome.errors.push(ErrorRecord {
                    row_index,
                    raw_name,
                    raw_email,
                    reason: format_field_errors(&field_errors),
                });
            }
        }
    }

    outcome
}
