use crate::column_normalizer::CanonicalColumn;
use crate::ranking::{RankedResult, sort_and_truncate};
use crate::record::{Record, RecordTable};

pub const MAX_SCORE: f64 = 100.0;
pub const NO_MATCH_SCORE: f64 = 1.0;
pub const NO_MATCH_REASON: &str = "No strong keyword matches found";

/// Field reasons kept in one explanation
const MAX_REASON_PARTS: usize = 4;

/// Order in which matched fields are explained
const REASON_ORDER: [CanonicalColumn; 6] = [
    CanonicalColumn::Name,
    CanonicalColumn::Industry,
    CanonicalColumn::Description,
    CanonicalColumn::Stage,
    CanonicalColumn::Revenue,
    CanonicalColumn::Location,
];

/// Points added each time a keyword is found in the field
pub fn field_weight(field: CanonicalColumn) -> f64 {
    match field {
        CanonicalColumn::Industry => 25.0,
        CanonicalColumn::Name => 20.0,
        CanonicalColumn::Revenue => 20.0,
        CanonicalColumn::Stage => 15.0,
        CanonicalColumn::Description => 15.0,
        CanonicalColumn::Location => 10.0,
    }
}

/// Whitespace tokens longer than two characters, lower-cased.
pub fn extract_keywords(criteria: &str) -> Vec<String> {
    criteria
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn field_reason(field: CanonicalColumn, record: &Record, matched: &[&str]) -> String {
    let mut keywords: Vec<&str> = Vec::new();
    for keyword in matched {
        if !keywords.contains(keyword) {
            keywords.push(keyword);
        }
    }

    match field {
        CanonicalColumn::Name => format!(
            "Name matches {}",
            keywords
                .iter()
                .map(|keyword| format!("'{}'", keyword))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CanonicalColumn::Industry => format!("Industry match: {}", keywords.join(", ")),
        CanonicalColumn::Description => format!("Description mentions {}", keywords.join(", ")),
        CanonicalColumn::Stage | CanonicalColumn::Revenue | CanonicalColumn::Location => {
            format!("{}: {}", field.label(), record.field(field))
        }
    }
}

/// Keyword score and explanation for one record.
pub fn score_record(record: &Record, keywords: &[String]) -> RankedResult {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    for field in REASON_ORDER {
        let value = record.field(field).to_lowercase();
        let matched: Vec<&str> = keywords
            .iter()
            .filter(|keyword| value.contains(keyword.as_str()))
            .map(String::as_str)
            .collect();

        if matched.is_empty() {
            continue;
        }
        score += field_weight(field) * matched.len() as f64;
        reasons.push(field_reason(field, record, &matched));
    }

    if reasons.is_empty() {
        return RankedResult {
            name: record.name.clone(),
            score: NO_MATCH_SCORE,
            reason: NO_MATCH_REASON.to_string(),
        };
    }

    reasons.truncate(MAX_REASON_PARTS);
    RankedResult {
        name: record.name.clone(),
        score: f64::min(score, MAX_SCORE),
        reason: reasons.join("; "),
    }
}

/// Deterministic ranking by keyword substring matches.
pub fn rank_by_keywords(records: &RecordTable, criteria: &str, top_n: usize) -> Vec<RankedResult> {
    let keywords = extract_keywords(criteria);
    tracing::info!(
        "keyword ranking of {} records with keywords {:?}",
        records.len(),
        keywords
    );

    let scored = records
        .iter()
        .map(|record| score_record(record, &keywords))
        .collect();
    sort_and_truncate(scored, top_n)
}
