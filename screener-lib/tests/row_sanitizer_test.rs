use proptest::prelude::*;
use screener_lib::NormalizationWarning;
use screener_lib::column_normalizer::map_canonical;
use screener_lib::row_sanitizer::{clean_names, is_invalid_name, is_numeric_id, sanitize};

mod common;

#[test]
fn test_numeric_id_row_removed_before_mapping() {
    let table = common::sheet(
        &["company", "sector"],
        &[
            &["Acme Robotics", "Robotics"],
            &["466959-97", "Software"],
            &["Globex", "Fintech"],
        ],
    );

    let sanitized = sanitize(&table);
    assert_eq!(sanitized.len(), 2);

    let (mapped, _) = map_canonical(&sanitized);
    let names = mapped.column_values(mapped.column_index("name").unwrap());
    assert_eq!(names, vec!["Acme Robotics", "Globex"]);
    assert!(!mapped.rows().iter().flatten().any(|value| value == "466959-97"));
}

#[test]
fn test_metadata_rows_removed_case_insensitively() {
    let table = common::sheet(
        &["company", "sector"],
        &[
            &["EXPORTED BY analyst", ""],
            &["Query: seed rounds", ""],
            &["Acme Robotics", "Robotics"],
            &["nan", "Fintech"],
            &["Hi", "Retail"],
            &["", ""],
        ],
    );
    let sanitized = sanitize(&table);
    assert_eq!(sanitized.len(), 1);
    assert_eq!(sanitized.rows()[0][0], "Acme Robotics");
}

#[test]
fn test_name_filter_path() {
    let table = common::sheet(
        &["name", "industry"],
        &[
            &["Acme", "Robotics"],
            &["unnamed 4", "Software"],
            &["Globex", "Fintech"],
            &["Initech", "Software"],
            &["X", "Retail"],
        ],
    );
    let (cleaned, warning) = clean_names(&table);
    assert!(warning.is_none());

    let names = cleaned.column_values(0);
    assert_eq!(names, vec!["Acme", "Globex", "Initech"]);
}

#[test]
fn test_name_filter_abort_path() {
    // Name column landed on the wrong source: most values are blank
    let table = common::sheet(
        &["company id", "name"],
        &[
            &["Acme", ""],
            &["Globex", "None"],
            &["Initech", "1"],
            &["Hooli", "Hooli"],
        ],
    );
    let (cleaned, warning) = clean_names(&table);
    assert_eq!(cleaned, table);
    assert_eq!(
        warning,
        Some(NormalizationWarning::SanitizationAbort {
            invalid: 3,
            total: 4
        })
    );
}

#[test]
fn test_surviving_rows_keep_original_casing() {
    let table = common::sheet(&["name"], &[&["aCmE rObOtIcS"], &["NONE"]]);
    let (cleaned, _) = clean_names(&table);
    assert_eq!(cleaned.column_values(0), vec!["aCmE rObOtIcS"]);
}

//////////////////////////////////////////////////////////////////////////////
// Property-based tests using proptest
//////////////////////////////////////////////////////////////////////////////

fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][a-z]{1,8}( [A-Z][a-z]{1,6})?",
        "[A-Za-z]?",
        Just("nan".to_string()),
        Just("None".to_string()),
        "[Uu]nnamed [0-9]{1,2}",
        "[0-9]{3,6}[-_][0-9]{1,3}",
    ]
}

proptest! {
    #[test]
    fn test_surviving_names_are_valid_unless_aborted(
        names in prop::collection::vec(name_strategy(), 1..20)
    ) {
        let rows: Vec<Vec<String>> = names.iter().map(|name| vec![name.clone()]).collect();
        let table = screener_lib::SheetTable::new(vec!["name".to_string()], rows);
        let (cleaned, warning) = clean_names(&table);

        match warning {
            Some(NormalizationWarning::SanitizationAbort { invalid, total }) => {
                prop_assert!(invalid * 2 > total);
                prop_assert_eq!(cleaned, table);
            }
            Some(other) => prop_assert!(false, "unexpected warning {:?}", other),
            None => {
                for name in cleaned.column_values(0) {
                    prop_assert!(!is_invalid_name(&name));
                    prop_assert!(name.chars().count() >= 2);
                    prop_assert!(!is_numeric_id(&name));
                    prop_assert!(!name.to_lowercase().starts_with("unnamed"));
                }
            }
        }
    }
}
