use regex::Regex;
use std::sync::LazyLock;

use crate::column_normalizer::{CanonicalColumn, SheetTable};
use crate::error::NormalizationWarning;

/// First-column values containing any of these are export metadata, not companies
pub const METADATA_KEYWORDS: [&str; 10] = [
    "downloaded",
    "created",
    "search",
    "criteria",
    "link",
    "export",
    "generated",
    "report",
    "filter",
    "query",
];

/// First-column values shorter than this are dropped
const MIN_FIRST_COLUMN_CHARS: usize = 3;

/// Names shorter than this are invalid
const MIN_NAME_CHARS: usize = 2;

// Export row identifiers such as "466959-97" or "12_4"
static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[-_]\d+$").expect("numeric id pattern is valid"));

static PLACEHOLDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^unnamed").expect("placeholder pattern is valid"));

pub fn is_numeric_id(value: &str) -> bool {
    NUMERIC_ID.is_match(value.trim())
}

/// True when a first-column value marks a banner, an export ID or filler.
pub fn is_metadata_value(value: &str) -> bool {
    let value = value.trim();
    let lowered = value.to_lowercase();

    METADATA_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
        || is_numeric_id(value)
        || value.chars().count() < MIN_FIRST_COLUMN_CHARS
        || lowered == "nan"
}

/// Empty, "nan", "none" or shorter than two characters.
pub fn is_invalid_name(value: &str) -> bool {
    let value = value.trim();
    let lowered = value.to_lowercase();
    value.is_empty()
        || lowered == "nan"
        || lowered == "none"
        || value.chars().count() < MIN_NAME_CHARS
}

fn is_rejected_name(value: &str) -> bool {
    is_invalid_name(value) || is_numeric_id(value) || PLACEHOLDER_NAME.is_match(value.trim())
}

/// Drop rows whose first column is metadata rather than a company entry.
pub fn sanitize(table: &SheetTable) -> SheetTable {
    if table.columns().is_empty() {
        return table.clone();
    }

    let sanitized = table.filter_rows(|row| {
        row.iter().any(|value| !value.trim().is_empty())
            && !row.first().is_none_or(|first| is_metadata_value(first))
    });

    let removed = table.len() - sanitized.len();
    if removed > 0 {
        tracing::info!("removed {} metadata rows", removed);
    }
    sanitized
}

/// Drop rows with an unusable `name`. When more than half of the rows would be
/// dropped the table is returned unchanged together with a warning.
pub fn clean_names(table: &SheetTable) -> (SheetTable, Option<NormalizationWarning>) {
    let Some(name_index) = table.column_index(CanonicalColumn::Name.as_str()) else {
        return (table.clone(), None);
    };

    let total = table.len();
    let invalid = table
        .rows()
        .iter()
        .filter(|row| is_invalid_name(&row[name_index]))
        .count();

    if invalid * 2 > total {
        let warning = NormalizationWarning::SanitizationAbort { invalid, total };
        tracing::warn!("{}", warning);
        return (table.clone(), Some(warning));
    }

    let cleaned = table.filter_rows(|row| !is_rejected_name(&row[name_index]));
    let removed = total - cleaned.len();
    if removed > 0 {
        tracing::info!("removed {} rows with invalid company names", removed);
    }
    (cleaned, None)
}
