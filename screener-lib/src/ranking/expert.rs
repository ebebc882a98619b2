use serde_json::{Value, json};

use crate::column_normalizer::{CanonicalColumn, clean_column_name, column_mentions};
use crate::error::ExpertError;
use crate::ranking::RankedResult;
use crate::record::Record;
use crate::utils::truncate_chars;

/// Records sent per completion request
pub const EXPERT_BATCH_SIZE: usize = 5;

pub const MAX_TOKENS: u32 = 3000;
pub const TEMPERATURE: f32 = 0.4;

/// Extra source columns worth showing the analyst, matched against the cleaned column name
/// with [`column_mentions`]
pub const SUPPLEMENTARY_FIELDS: [&str; 12] = [
    "employees",
    "founded",
    "valuation",
    "funding",
    "total raised",
    "investors",
    "growth",
    "arr",
    "website",
    "last financing",
    "ownership status",
    "deal type",
];

/// Longest supplementary value embedded in a prompt
pub const SUPPLEMENTARY_VALUE_CHARS: usize = 50;

const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_REASON: &str = "No analysis provided";

pub const SYSTEM_PROMPT: &str = "You are a senior venture capital analyst who screens companies \
for an investment committee. You know funding stages, revenue metrics such as ARR and growth, \
business models, competitive positioning and sector dynamics across software, AI, fintech and \
healthcare.

Judge each company against the investor's stated criteria. Be concise and specific: cite the \
data points that support or weaken the fit, name gaps or risks, and score on overall alignment \
with the investment thesis rather than on keyword overlap.";

fn display_value(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

/// Allow-listed extra columns of a record, values truncated.
pub fn supplementary_metrics(record: &Record) -> Vec<(String, String)> {
    record
        .extras
        .iter()
        .filter(|(column, _)| {
            let cleaned = clean_column_name(column);
            SUPPLEMENTARY_FIELDS
                .iter()
                .any(|allowed| column_mentions(&cleaned, allowed))
        })
        .map(|(column, value)| {
            (
                column.clone(),
                truncate_chars(value.trim(), SUPPLEMENTARY_VALUE_CHARS),
            )
        })
        .collect()
}

/// Prompt for one batch: the criteria, every record's fields, and the reply format.
pub fn build_batch_prompt(batch: &[Record], criteria: &str) -> String {
    let mut companies = String::new();
    for (index, record) in batch.iter().enumerate() {
        companies.push_str(&format!(
            "\nCOMPANY {}: {}\n",
            index + 1,
            display_value(&record.name)
        ));
        for field in CanonicalColumn::ALL.iter().skip(1) {
            companies.push_str(&format!(
                "  {}: {}\n",
                field.label(),
                display_value(record.field(*field))
            ));
        }
        for (column, value) in supplementary_metrics(record) {
            companies.push_str(&format!("  {}: {}\n", column, value));
        }
    }

    format!(
        "Rank the following companies by how well they fit these investment criteria.

INVESTMENT CRITERIA:
{criteria}

COMPANIES:
{companies}
For every company give a match score from 0 to 100 (90+ exceptional fit, 75-89 strong, \
60-74 good, 45-59 moderate, below 45 weak) and a two to three sentence rationale that \
references the company's actual data.

Respond with ONLY a JSON array, one object per company, using the exact company names above:
[{{\"name\": \"Company Name\", \"score\": 80, \"reason\": \"Rationale\"}}]"
    )
}

fn response_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["name", "score"],
            "properties": {
                "name": { "type": "string" },
                "score": {
                    "anyOf": [
                        { "type": "number" },
                        { "type": "string", "pattern": "^\\s*-?\\d+(\\.\\d+)?\\s*$" }
                    ]
                },
                "reason": { "type": ["string", "null"] }
            }
        }
    })
}

/// Decode the JSON array between the first `[` and the last `]` of a reply.
pub fn parse_expert_response(response_text: &str) -> Result<Vec<RankedResult>, ExpertError> {
    let start = response_text
        .find('[')
        .ok_or_else(|| ExpertError::Parse("no JSON array found in response".to_string()))?;
    let end = response_text
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| ExpertError::Parse("no JSON array found in response".to_string()))?;

    let value: Value = serde_json::from_str(&response_text[start..=end])
        .map_err(|e| ExpertError::Parse(format!("invalid JSON: {}", e)))?;

    let validator = jsonschema::validator_for(&response_schema())
        .map_err(|e| ExpertError::Parse(format!("invalid response schema: {}", e)))?;
    if let Some(error) = validator.iter_errors(&value).next() {
        return Err(ExpertError::Parse(format!(
            "unexpected response shape at '{}': {}",
            error.instance_path, error
        )));
    }

    let items = value.as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        return Err(ExpertError::Parse("response array is empty".to_string()));
    }

    Ok(items.iter().map(to_ranked_result).collect())
}

fn to_ranked_result(item: &Value) -> RankedResult {
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string();

    let score = match item.get("score") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    let reason = item
        .get("reason")
        .and_then(Value::as_str)
        .filter(|reason| !reason.trim().is_empty())
        .unwrap_or(DEFAULT_REASON)
        .to_string();

    RankedResult {
        name,
        score: score.clamp(0.0, 100.0),
        reason,
    }
}
