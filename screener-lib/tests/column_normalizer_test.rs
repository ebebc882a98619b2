use proptest::prelude::*;
use screener_lib::column_normalizer::{map_canonical, normalize_columns, resolve_source};
use screener_lib::{CanonicalColumn, MappingSource, NormalizationWarning, SheetTable};

mod common;

#[test]
fn test_company_desc_sector_mapping() {
    let headers: Vec<String> = ["Company", "Desc", "Sector"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = normalize_columns(&headers);
    assert_eq!(columns, vec!["company", "desc", "sector"]);

    let table = SheetTable::new(
        columns,
        vec![
            vec![
                "Acme Robotics".to_string(),
                "Warehouse robots".to_string(),
                "Robotics".to_string(),
            ],
            vec![
                "Globex".to_string(),
                "Payments API".to_string(),
                "Fintech".to_string(),
            ],
        ],
    );
    let (mapped, mapping) = map_canonical(&table);

    assert_eq!(mapped.value(0, "name"), Some("Acme Robotics"));
    assert_eq!(mapped.value(1, "description"), Some("Payments API"));
    assert_eq!(mapped.value(1, "industry"), Some("Fintech"));
    for empty in ["stage", "revenue", "location"] {
        assert_eq!(mapped.value(0, empty), Some(""));
        assert_eq!(mapped.value(1, empty), Some(""));
    }

    assert_eq!(
        mapping.get(CanonicalColumn::Name),
        Some(&MappingSource::Synonym {
            column: "company".to_string()
        })
    );
    assert_eq!(
        mapping.missing_fields(),
        vec![
            CanonicalColumn::Stage,
            CanonicalColumn::Revenue,
            CanonicalColumn::Location
        ]
    );
    assert_eq!(
        mapping.warnings()[0],
        NormalizationWarning::MappingAmbiguity {
            field: CanonicalColumn::Stage
        }
    );
}

#[test]
fn test_best_filled_synonym_column_wins() {
    let table = common::sheet(
        &["company id", "portfolio company"],
        &[&["", "Acme"], &["", "Globex"], &["17", "Initech"]],
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Name),
        MappingSource::Synonym {
            column: "portfolio company".to_string()
        }
    );
}

#[test]
fn test_short_synonyms_do_not_match_inside_words() {
    let table = common::sheet(
        &["company", "background", "funding stage"],
        &[
            &["Acme", "Spun out of a robotics lab", "Seed"],
            &["Globex", "Founded by payments veterans", ""],
            &["Initech", "Bootstrapped for a decade", ""],
        ],
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Stage),
        MappingSource::Synonym {
            column: "funding stage".to_string()
        }
    );

    let table = common::sheet(
        &["company", "narrative"],
        &[&["Acme", "Robots for warehouses"]],
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Revenue),
        MappingSource::Missing
    );

    let table = common::sheet(
        &["company", "arr usd", "financial statement"],
        &[&["Acme", "2M", "Audited"]],
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Revenue),
        MappingSource::Synonym {
            column: "arr usd".to_string()
        }
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Location),
        MappingSource::Missing
    );
}

#[test]
fn test_equal_fill_keeps_first_column() {
    let table = common::sheet(
        &["sector", "primary industry"],
        &[&["Robotics", "Hardware"], &["Fintech", "Software"]],
    );
    assert_eq!(
        resolve_source(&table, CanonicalColumn::Industry),
        MappingSource::Synonym {
            column: "sector".to_string()
        }
    );
}

#[test]
fn test_fuzzy_match_when_no_synonym() {
    let table = common::sheet(&["nmae"], &[&["Acme"]]);
    match resolve_source(&table, CanonicalColumn::Name) {
        MappingSource::Fuzzy { column, similarity } => {
            assert_eq!(column, "nmae");
            assert_eq!(similarity, 1.0);
        }
        other => panic!("expected fuzzy match, got {:?}", other),
    }
}

#[test]
fn test_exact_columns_are_left_in_place() {
    let table = common::sheet(
        &["name", "description", "stage", "revenue", "industry", "location"],
        &[&["Acme", "Robots", "Seed", "1M", "Robotics", "Berlin"]],
    );
    let (mapped, mapping) = map_canonical(&table);
    assert_eq!(mapped, table);
    assert!(
        mapping
            .entries()
            .iter()
            .all(|(_, source)| *source == MappingSource::Exact)
    );
    assert!(mapping.warnings().is_empty());
}

#[test]
fn test_normalize_columns_is_idempotent_on_canonical_names() {
    let canonical: Vec<String> = CanonicalColumn::ALL
        .iter()
        .map(|field| field.as_str().to_string())
        .collect();
    assert_eq!(normalize_columns(&canonical), canonical);
    assert_eq!(
        normalize_columns(&normalize_columns(&canonical)),
        canonical
    );
}

#[test]
fn test_blank_headers_get_placeholder_names() {
    let headers = vec!["Company".to_string(), "".to_string(), "***".to_string()];
    assert_eq!(
        normalize_columns(&headers),
        vec!["company", "unnamed 1", "unnamed 2"]
    );
}

//////////////////////////////////////////////////////////////////////////////
// Property-based tests using proptest
//////////////////////////////////////////////////////////////////////////////

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_six_canonical_columns_always_present(
        headers in prop::collection::vec("[A-Za-z _$()]{0,14}", 0..7),
        cells in prop::collection::vec(prop::collection::vec("[A-Za-z0-9 ]{0,10}", 0..7), 0..6)
    ) {
        let columns = normalize_columns(&headers);
        let table = SheetTable::new(columns, cells);
        let (mapped, mapping) = map_canonical(&table);

        prop_assert_eq!(mapping.entries().len(), 6);
        for field in CanonicalColumn::ALL {
            let index = mapped.column_index(field.as_str());
            prop_assert!(index.is_some(), "missing canonical column {}", field);
            for row in mapped.rows() {
                prop_assert_eq!(row.len(), mapped.columns().len());
            }
        }
        prop_assert_eq!(mapped.len(), table.len());
    }

    #[test]
    fn test_normalized_columns_are_unique(
        headers in prop::collection::vec("[A-Ca-c _]{0,3}", 0..10)
    ) {
        let columns = normalize_columns(&headers);
        prop_assert_eq!(columns.len(), headers.len());
        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            prop_assert!(seen.insert(column.clone()), "duplicate column {}", column);
        }
    }
}
