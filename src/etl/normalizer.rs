//! Scalar field normalization: name casing and date format collapsing.

use chrono::NaiveDate;

/// Date formats accepted by [`standardize_date`], tried in order.
///
/// The order is a deliberate policy: ambiguous strings like `01/02/2023`
/// parse day-first (`%d/%m/%Y`), never month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2023-01-15
    "%d/%m/%Y", // 15/01/2023
    "%b %d %Y", // Oct 12 2021
    "%d-%m-%Y", // 15-01-2023
];

/// Trim and title-case a raw name.
///
/// Returns `None` when the input is absent, empty or all-whitespace.
/// Title-casing is naive word-boundary capitalization; no locale-aware
/// name handling.
pub fn normalize_name(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let titled = trimmed
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    Some(titled)
}

/// Parse a raw date string against [`DATE_FORMATS`] and render the first
/// successful parse as ISO-8601 (`YYYY-MM-DD`).
///
/// Returns `None` when the input is absent, empty or matches no format.
pub fn standardize_date(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}
