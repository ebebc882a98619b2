use std::path::Path;

use crate::column_normalizer::{ColumnMapping, SheetTable, map_canonical, normalize_columns};
use crate::config::ScreenerConfig;
use crate::error::{LoadError, NormalizationWarning};
use crate::header_locator::{HEADER_SCAN_ROWS, locate_header};
use crate::loader::{RawTable, load_raw_table, load_raw_table_from_path};
use crate::record::RecordTable;
use crate::row_sanitizer::{clean_names, sanitize};

/// Result of normalizing one uploaded sheet.
#[derive(Debug, Clone)]
pub struct ProcessedSheet {
    pub records: RecordTable,
    /// Index of the row used as header in the raw sheet
    pub header_row: usize,
    pub mapping: ColumnMapping,
    pub warnings: Vec<NormalizationWarning>,
}

/// Entry point turning spreadsheet bytes into a [`RecordTable`].
/// Holds the configuration shared with the ranking engine and the
/// persistence layer; processing only logs its status.
#[derive(Debug, Clone, Default)]
pub struct SheetProcessor {
    config: ScreenerConfig,
}

impl SheetProcessor {
    pub fn new(config: ScreenerConfig) -> Self {
        SheetProcessor { config }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    pub fn process(&self, bytes: &[u8]) -> Result<ProcessedSheet, LoadError> {
        let raw = load_raw_table(bytes)?;
        Ok(self.process_raw(&raw))
    }

    pub fn process_path<P: AsRef<Path>>(&self, path: P) -> Result<ProcessedSheet, LoadError> {
        let raw = load_raw_table_from_path(path)?;
        Ok(self.process_raw(&raw))
    }

    /// Run header detection and normalization on an already loaded grid.
    pub fn process_raw(&self, raw: &RawTable) -> ProcessedSheet {
        tracing::debug!("processing sheet with {:?}", self.config.status());
        let header_row = locate_header(&raw.peek(HEADER_SCAN_ROWS));
        let sheet = SheetTable::from_raw(raw, header_row);

        let renamed = sheet.with_columns(normalize_columns(sheet.columns()));
        let sanitized = sanitize(&renamed);
        let (mapped, mapping) = map_canonical(&sanitized);
        let (cleaned, abort_warning) = clean_names(&mapped);

        let mut warnings = mapping.warnings();
        warnings.extend(abort_warning);

        let records = RecordTable::from_sheet(&cleaned, &mapping);
        tracing::info!(
            "normalized {} records (header row {}, {} warnings)",
            records.len(),
            header_row,
            warnings.len()
        );

        ProcessedSheet {
            records,
            header_row,
            mapping,
            warnings,
        }
    }
}
