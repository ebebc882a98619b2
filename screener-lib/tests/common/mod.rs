//! Common test utilities for the screener-lib integration tests

use screener_lib::SheetTable;
use screener_lib::ranking::RankedResult;

/// Builds a string table with the given (already normalized) column names
#[allow(dead_code)]
pub fn sheet(columns: &[&str], rows: &[&[&str]]) -> SheetTable {
    SheetTable::new(
        columns.iter().map(|column| column.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect(),
    )
}

/// Owned rows for `build_xlsx` and `RawTable::from_strings`
#[allow(dead_code)]
pub fn rows(rows: &[&[&'static str]]) -> Vec<Vec<&'static str>> {
    rows.iter().map(|row| row.to_vec()).collect()
}

/// Metadata-prefixed export: three banner rows, header at row 3
#[allow(dead_code)]
pub fn banner_export_rows() -> Vec<Vec<&'static str>> {
    rows(&[
        &["Downloaded on 2024-01-01", "", ""],
        &["Search criteria: fintech, seed", "", ""],
        &["Link to saved search", "", ""],
        &["Company Name", "Industry", "Stage"],
        &["Acme Payments", "Fintech", "Seed"],
        &["Globex Ledger", "Fintech", "Series A"],
    ])
}

#[allow(dead_code)]
pub fn names(results: &[RankedResult]) -> Vec<&str> {
    results.iter().map(|result| result.name.as_str()).collect()
}

/// JSON reply of the text generation service for the given (name, score) pairs
#[allow(dead_code)]
pub fn expert_reply(scores: &[(&str, f64)]) -> String {
    let items: Vec<serde_json::Value> = scores
        .iter()
        .map(|(name, score)| {
            serde_json::json!({
                "name": name,
                "score": score,
                "reason": format!("Assessment of {}", name),
            })
        })
        .collect();
    format!(
        "Here is the ranking:\n{}",
        serde_json::Value::Array(items)
    )
}

/// Fresh error log location unique to the calling test
#[allow(dead_code)]
pub fn error_log_path(test_name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "screener-{}-{}",
        test_name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("errors.log");
    let _ = std::fs::remove_file(&path);
    path
}
