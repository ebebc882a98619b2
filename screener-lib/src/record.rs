use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::column_normalizer::{CanonicalColumn, ColumnMapping, SheetTable};
use crate::ranking::RankedResult;

/// Records shown as samples in [`TableStats`]
const SAMPLE_RECORDS: usize = 3;

/// One company entry. Absent data is an empty string, never a missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub description: String,
    pub stage: String,
    pub revenue: String,
    pub industry: String,
    pub location: String,
    /// Non-canonical source columns as (column name, value), in sheet order
    #[serde(skip)]
    pub extras: Vec<(String, String)>,
}

impl Record {
    pub fn field(&self, field: CanonicalColumn) -> &str {
        match field {
            CanonicalColumn::Name => &self.name,
            CanonicalColumn::Description => &self.description,
            CanonicalColumn::Stage => &self.stage,
            CanonicalColumn::Revenue => &self.revenue,
            CanonicalColumn::Industry => &self.industry,
            CanonicalColumn::Location => &self.location,
        }
    }

    fn field_mut(&mut self, field: CanonicalColumn) -> &mut String {
        match field {
            CanonicalColumn::Name => &mut self.name,
            CanonicalColumn::Description => &mut self.description,
            CanonicalColumn::Stage => &mut self.stage,
            CanonicalColumn::Revenue => &mut self.revenue,
            CanonicalColumn::Industry => &mut self.industry,
            CanonicalColumn::Location => &mut self.location,
        }
    }

    /// Build a record from the six canonical values, without extras.
    pub fn new(
        name: &str,
        description: &str,
        stage: &str,
        revenue: &str,
        industry: &str,
        location: &str,
    ) -> Self {
        Record {
            name: name.to_string(),
            description: description.to_string(),
            stage: stage.to_string(),
            revenue: revenue.to_string(),
            industry: industry.to_string(),
            location: location.to_string(),
            extras: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub total_firms: usize,
    pub columns: Vec<String>,
    /// Empty values per canonical field
    pub missing_data: BTreeMap<String, usize>,
    pub sample_firms: Vec<Record>,
}

/// Ordered sequence of records produced by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(records: Vec<Record>) -> Self {
        RecordTable { records }
    }

    /// Build records from a table that carries all six canonical columns.
    /// Columns that fed a canonical field through `mapping` are not repeated in extras.
    pub fn from_sheet(table: &SheetTable, mapping: &ColumnMapping) -> Self {
        let consumed = mapping.source_columns();
        let mut canonical_indexes = Vec::new();
        let mut extra_indexes = Vec::new();

        for (index, column) in table.columns().iter().enumerate() {
            match CanonicalColumn::from_name(column) {
                Some(field) => canonical_indexes.push((index, field)),
                None if !consumed.contains(&column.as_str()) => extra_indexes.push(index),
                None => {}
            }
        }

        let records = table
            .rows()
            .iter()
            .map(|row| {
                let mut record = Record::default();
                for (index, field) in &canonical_indexes {
                    *record.field_mut(*field) = row[*index].trim().to_string();
                }
                record.extras = extra_indexes
                    .iter()
                    .filter(|index| !row[**index].trim().is_empty())
                    .map(|index| (table.columns()[*index].clone(), row[*index].clone()))
                    .collect();
                record
            })
            .collect();

        RecordTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn stats(&self) -> TableStats {
        let missing_data = CanonicalColumn::ALL
            .iter()
            .map(|field| {
                let missing = self
                    .records
                    .iter()
                    .filter(|record| record.field(*field).is_empty())
                    .count();
                (field.as_str().to_string(), missing)
            })
            .collect();

        TableStats {
            total_firms: self.records.len(),
            columns: CanonicalColumn::ALL
                .iter()
                .map(|field| field.as_str().to_string())
                .collect(),
            missing_data,
            sample_firms: self.records.iter().take(SAMPLE_RECORDS).cloned().collect(),
        }
    }

    /// Write the six canonical columns to a CSV file.
    pub fn export_to_csv<P: AsRef<Path>>(&self, csv_path: P) -> anyhow::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .has_headers(false)
            .from_path(csv_path)?;

        // Written explicitly so an empty table still gets a header line
        wtr.write_record(CanonicalColumn::ALL.iter().map(|field| field.as_str()))?;
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;

        Ok(())
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Stored company row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub description: String,
    pub stage: String,
    pub revenue: String,
    pub industry: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyRecord {
    pub fn from_record(record: &Record, created_at: DateTime<Utc>) -> Self {
        CompanyRecord {
            name: record.name.clone(),
            description: record.description.clone(),
            stage: record.stage.clone(),
            revenue: record.revenue.clone(),
            industry: record.industry.clone(),
            location: record.location.clone(),
            created_at,
            updated_at: None,
        }
    }
}

/// Stored ranking outcome for one company under one criteria text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResultRecord {
    pub company_id: i64,
    pub heuristics: String,
    pub score: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl FilterResultRecord {
    pub fn from_result(
        company_id: i64,
        heuristics: &str,
        result: &RankedResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        FilterResultRecord {
            company_id,
            heuristics: heuristics.to_string(),
            score: result.score,
            reason: result.reason.clone(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_normalizer::map_canonical;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_record_serializes_exactly_six_keys() {
        let mut record = Record::new("Acme", "", "Seed", "", "Robotics", "Berlin");
        record.extras.push(("employees".to_string(), "40".to_string()));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Acme",
                "description": "",
                "stage": "Seed",
                "revenue": "",
                "industry": "Robotics",
                "location": "Berlin"
            })
        );
    }

    #[test]
    fn test_from_sheet_collects_unmapped_extras() {
        let sheet = SheetTable::new(
            strings(&["company", "sector", "employees", "notes"]),
            vec![strings(&["Acme", "Robotics", "40", ""])],
        );
        let (mapped, mapping) = map_canonical(&sheet);
        let records = RecordTable::from_sheet(&mapped, &mapping);

        let record = &records.records()[0];
        assert_eq!(record.name, "Acme");
        assert_eq!(record.industry, "Robotics");
        assert_eq!(
            record.extras,
            vec![("employees".to_string(), "40".to_string())]
        );
    }

    #[test]
    fn test_stats_counts_missing_fields() {
        let table = RecordTable::new(vec![
            Record::new("Acme", "", "Seed", "", "Robotics", ""),
            Record::new("Globex", "Energy co", "", "", "Energy", ""),
        ]);
        let stats = table.stats();
        assert_eq!(stats.total_firms, 2);
        assert_eq!(stats.missing_data["revenue"], 2);
        assert_eq!(stats.missing_data["description"], 1);
        assert_eq!(stats.missing_data["name"], 0);
        assert_eq!(stats.sample_firms.len(), 2);
    }

    #[test]
    fn test_company_record_copies_canonical_fields() {
        let created_at = Utc::now();
        let stored = CompanyRecord::from_record(
            &Record::new("Acme", "Robots", "Seed", "1M", "Robotics", "Berlin"),
            created_at,
        );
        assert_eq!(stored.location, "Berlin");
        assert_eq!(stored.created_at, created_at);
        assert!(stored.updated_at.is_none());
    }

    #[test]
    fn test_filter_result_record_from_ranked_result() {
        let created_at = Utc::now();
        let result = RankedResult {
            name: "Acme".to_string(),
            score: 72.5,
            reason: "Industry match: robotics".to_string(),
        };
        let stored = FilterResultRecord::from_result(7, "robotics", &result, created_at);
        assert_eq!(stored.company_id, 7);
        assert_eq!(stored.score, 72.5);
        assert_eq!(stored.heuristics, "robotics");
        assert_eq!(stored.created_at, created_at);
    }
}
