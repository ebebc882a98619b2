use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::NormalizationWarning;
use crate::loader::RawTable;
use crate::utils::normalize_string;

/// Fuzzy matches must be strictly above this similarity
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.7;

/// Terms up to this length only match whole words of a cleaned column name
pub const WHOLE_WORD_TERM_CHARS: usize = 5;

/// The six fields every record exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalColumn {
    Name,
    Description,
    Stage,
    Revenue,
    Industry,
    Location,
}

impl CanonicalColumn {
    /// Fixed mapping order
    pub const ALL: [CanonicalColumn; 6] = [
        CanonicalColumn::Name,
        CanonicalColumn::Description,
        CanonicalColumn::Stage,
        CanonicalColumn::Revenue,
        CanonicalColumn::Industry,
        CanonicalColumn::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalColumn::Name => "name",
            CanonicalColumn::Description => "description",
            CanonicalColumn::Stage => "stage",
            CanonicalColumn::Revenue => "revenue",
            CanonicalColumn::Industry => "industry",
            CanonicalColumn::Location => "location",
        }
    }

    /// Human readable label used in reasons and prompts
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalColumn::Name => "Name",
            CanonicalColumn::Description => "Description",
            CanonicalColumn::Stage => "Stage",
            CanonicalColumn::Revenue => "Revenue",
            CanonicalColumn::Industry => "Industry",
            CanonicalColumn::Location => "Location",
        }
    }

    /// Terms of a cleaned column name that identify this field, in priority order.
    /// Matching follows [`column_mentions`].
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            CanonicalColumn::Name => &[
                "company",
                "companies",
                "company name",
                "firm",
                "organization",
                "business name",
                "firm name",
                "portfolio company",
            ],
            CanonicalColumn::Description => &[
                "description",
                "desc",
                "about",
                "overview",
                "summary",
                "business description",
                "company description",
                "profile",
            ],
            CanonicalColumn::Stage => &[
                "stage",
                "funding stage",
                "round",
                "series",
                "financing status",
                "last financing",
                "investment stage",
            ],
            CanonicalColumn::Revenue => &[
                "revenue",
                "sales",
                "arr",
                "turnover",
                "annual revenue",
                "income",
            ],
            CanonicalColumn::Industry => &[
                "industry",
                "sector",
                "vertical",
                "category",
                "market",
                "primary industry",
            ],
            CanonicalColumn::Location => &[
                "location",
                "hq",
                "headquarters",
                "city",
                "country",
                "region",
                "address",
                "state",
            ],
        }
    }

    pub fn from_name(name: &str) -> Option<CanonicalColumn> {
        CanonicalColumn::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a canonical field got its values from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingSource {
    /// A column already carried the canonical name
    Exact,
    Synonym { column: String },
    Fuzzy { column: String, similarity: f64 },
    /// Filled with empty strings
    Missing,
}

impl MappingSource {
    pub fn source_column(&self) -> Option<&str> {
        match self {
            MappingSource::Synonym { column } | MappingSource::Fuzzy { column, .. } => {
                Some(column)
            }
            _ => None,
        }
    }
}

/// Per-field outcome of [`map_canonical`], in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMapping {
    entries: Vec<(CanonicalColumn, MappingSource)>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalColumn) -> Option<&MappingSource> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, source)| source)
    }

    pub fn entries(&self) -> &[(CanonicalColumn, MappingSource)] {
        &self.entries
    }

    pub fn missing_fields(&self) -> Vec<CanonicalColumn> {
        self.entries
            .iter()
            .filter(|(_, source)| *source == MappingSource::Missing)
            .map(|(field, _)| *field)
            .collect()
    }

    /// Source columns that were copied into a canonical field.
    pub fn source_columns(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(_, source)| source.source_column())
            .collect()
    }

    pub fn warnings(&self) -> Vec<NormalizationWarning> {
        self.missing_fields()
            .into_iter()
            .map(|field| NormalizationWarning::MappingAmbiguity { field })
            .collect()
    }
}

/// String grid after the header row is chosen. Rows are padded or cut to the column count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        SheetTable { columns, rows }
    }

    /// Take `header_index` as the header row and everything below it as data.
    /// Cell text is whitespace-normalized and fully blank rows are dropped.
    pub fn from_raw(raw: &RawTable, header_index: usize) -> Self {
        let mut rows = raw.rows().iter().skip(header_index);
        let columns = rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| normalize_string(&cell.as_text()))
                    .collect()
            })
            .unwrap_or_default();

        let data = rows
            .map(|row| {
                row.iter()
                    .map(|cell| normalize_string(&cell.as_text()))
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|value| !value.is_empty()))
            .collect();

        SheetTable::new(columns, data)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column_values(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect()
    }

    /// Count of non-empty values in a column
    pub fn fill_count(&self, index: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(index).is_some_and(|value| !value.trim().is_empty()))
            .count()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Copy of the table with new column names; the name count must match the width.
    pub fn with_columns(&self, columns: Vec<String>) -> SheetTable {
        SheetTable::new(columns, self.rows.clone())
    }

    /// Copy keeping only rows for which `keep` returns true.
    pub fn filter_rows<F>(&self, mut keep: F) -> SheetTable
    where
        F: FnMut(&[String]) -> bool,
    {
        SheetTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    fn push_column(&mut self, name: &str, values: Vec<String>) {
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
}

/// Lower-case, drop punctuation (underscores survive), collapse whitespace and
/// underscore runs to one space, trim.
pub fn clean_column_name(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    stripped
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean every header and make the names unique (`desc`, `desc 1`, `desc 2`, ...).
pub fn normalize_columns(raw_headers: &[String]) -> Vec<String> {
    let cleaned: Vec<String> = raw_headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let name = clean_column_name(header);
            if name.is_empty() {
                format!("unnamed {}", index)
            } else {
                name
            }
        })
        .collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut renamed = Vec::with_capacity(cleaned.len());
    for name in cleaned {
        if used.insert(name.clone()) {
            renamed.push(name);
            continue;
        }

        let mut suffix = 1;
        let unique = loop {
            let candidate = format!("{} {}", name, suffix);
            if !used.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        used.insert(unique.clone());
        renamed.push(unique);
    }
    renamed
}

/// Whether a cleaned column name mentions `term`. Short terms such as `arr`
/// or `round` must be a whole word ("arr usd" but not "narrative").
pub fn column_mentions(cleaned: &str, term: &str) -> bool {
    if term.chars().count() <= WHOLE_WORD_TERM_CHARS {
        cleaned.split_whitespace().any(|word| word == term)
    } else {
        cleaned.contains(term)
    }
}

/// Characters of `target` found anywhere in `candidate`, over the longer length.
pub fn similarity(target: &str, candidate: &str) -> f64 {
    let target_len = target.chars().count();
    let candidate_len = candidate.chars().count();
    if target_len == 0 || candidate_len == 0 {
        return 0.0;
    }
    let shared = target.chars().filter(|c| candidate.contains(*c)).count();
    shared as f64 / target_len.max(candidate_len) as f64
}

/// Pick the source column for one canonical field.
pub fn resolve_source(table: &SheetTable, field: CanonicalColumn) -> MappingSource {
    if table.column_index(field.as_str()).is_some() {
        return MappingSource::Exact;
    }

    // Best-fill wins; the first column seen keeps a tie.
    let mut best: Option<(usize, usize)> = None;
    for (index, column) in table.columns().iter().enumerate() {
        if !field
            .synonyms()
            .iter()
            .any(|synonym| column_mentions(column, synonym))
        {
            continue;
        }
        let filled = table.fill_count(index);
        if best.is_none_or(|(_, best_filled)| filled > best_filled) {
            best = Some((index, filled));
        }
    }
    if let Some((index, _)) = best {
        return MappingSource::Synonym {
            column: table.columns()[index].clone(),
        };
    }

    for column in table.columns() {
        let score = similarity(field.as_str(), column);
        if score > FUZZY_MATCH_THRESHOLD {
            return MappingSource::Fuzzy {
                column: column.clone(),
                similarity: score,
            };
        }
    }

    MappingSource::Missing
}

/// Guarantee all six canonical columns exist, copying values from the best
/// matching source column or filling with empty strings.
pub fn map_canonical(table: &SheetTable) -> (SheetTable, ColumnMapping) {
    let mut output = table.clone();
    let mut mapping = ColumnMapping::default();

    for field in CanonicalColumn::ALL {
        let source = resolve_source(table, field);
        match &source {
            MappingSource::Exact => {}
            MappingSource::Synonym { column } | MappingSource::Fuzzy { column, .. } => {
                let values = table
                    .column_index(column)
                    .map(|index| table.column_values(index))
                    .unwrap_or_else(|| vec![String::new(); table.len()]);
                tracing::debug!("mapped column '{}' to '{}'", column, field);
                output.push_column(field.as_str(), values);
            }
            MappingSource::Missing => {
                tracing::warn!(
                    "no source column found for '{}', filling with empty values",
                    field
                );
                output.push_column(field.as_str(), vec![String::new(); table.len()]);
            }
        }
        mapping.entries.push((field, source));
    }

    (output, mapping)
}
