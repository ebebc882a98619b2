use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

use crate::error::LoadError;
use crate::utils::excel_serial_to_string;

/// An untyped scalar read from one position of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String form of the cell as the rest of the pipeline sees it.
    /// Integral numbers render without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            RawCell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Float(f) => {
                if f.is_finite() {
                    RawCell::Number(*f)
                } else {
                    RawCell::Empty
                }
            }
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::DateTime(dt) => match excel_serial_to_string(dt.as_f64()) {
                Some(text) => RawCell::Text(text),
                None => RawCell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        }
    }
}

/// Row-major grid of cells; every row has the same width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Build a table, padding short rows with blanks up to the widest row.
    pub fn new(mut rows: Vec<Vec<RawCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, RawCell::Empty);
        }
        RawTable { rows }
    }

    /// Convenience constructor from string cells; blank strings become `Empty`.
    pub fn from_strings<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| {
                        let value = value.as_ref();
                        if value.trim().is_empty() {
                            RawCell::Empty
                        } else {
                            RawCell::Text(value.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        RawTable::new(rows)
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Copy of the first `n` rows.
    pub fn peek(&self, n: usize) -> RawTable {
        RawTable {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Copy of the table without its first `n` rows.
    pub fn skip_rows(&self, n: usize) -> RawTable {
        RawTable {
            rows: self.rows.iter().skip(n).cloned().collect(),
        }
    }
}

/// Read the first worksheet of a workbook (xlsx, xlsm, xlsb, xls, ods).
/// Bytes that are not a workbook but decode as UTF-8 are read as CSV.
pub fn load_raw_table(bytes: &[u8]) -> Result<RawTable, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let table = match read_workbook(bytes) {
        Ok(table) => table,
        Err(workbook_error) => match std::str::from_utf8(bytes) {
            Ok(text) => read_delimited(text)?,
            Err(_) => return Err(workbook_error),
        },
    };

    if table.is_empty() || table.rows().iter().all(|row| row.iter().all(RawCell::is_blank)) {
        return Err(LoadError::Empty);
    }

    tracing::debug!(
        "loaded sheet with {} rows and {} columns",
        table.len(),
        table.width()
    );
    Ok(table)
}

pub fn load_raw_table_from_path<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let bytes = std::fs::read(path)?;
    load_raw_table(&bytes)
}

fn read_workbook(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(LoadError::Workbook(e.to_string())),
        None => return Err(LoadError::NoWorksheet),
    };

    // The range starts at the first used cell; keep sheet coordinates intact
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(RawCell::Empty, first_col as usize)
            .chain(row.iter().map(RawCell::from))
            .collect()
    }));

    Ok(RawTable::new(rows))
}

fn read_delimited(text: &str) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::NotTabular(e.to_string()))?;
        let row = record
            .iter()
            .map(|value| {
                if value.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_are_padded() {
        let table = RawTable::from_strings(&[vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(table.width(), 3);
        assert_eq!(table.rows()[1], vec![
            RawCell::Text("d".to_string()),
            RawCell::Empty,
            RawCell::Empty
        ]);
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(RawCell::Number(2020.0).as_text(), "2020");
        assert_eq!(RawCell::Number(1.5).as_text(), "1.5");
        assert_eq!(RawCell::Bool(true).as_text(), "true");
        assert_eq!(RawCell::Empty.as_text(), "");
    }

    #[test]
    fn test_peek_and_skip_copy_rows() {
        let table = RawTable::from_strings(&[vec!["r0"], vec!["r1"], vec!["r2"]]);
        assert_eq!(table.peek(2).len(), 2);
        let rest = table.skip_rows(2);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.rows()[0][0], RawCell::Text("r2".to_string()));
        assert!(table.skip_rows(10).is_empty());
    }

    #[test]
    fn test_csv_text_is_loaded() {
        let table = load_raw_table(b"Company,Industry\nAcme,Robotics\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][1], RawCell::Text("Robotics".to_string()));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(load_raw_table(b""), Err(LoadError::Empty)));
        assert!(matches!(load_raw_table(b",,\n,,\n"), Err(LoadError::Empty)));
    }

    #[test]
    fn test_binary_garbage_is_rejected() {
        let garbage = [0xff_u8, 0xfe, 0x00, 0x9c, 0x80, 0x81];
        assert!(load_raw_table(&garbage).is_err());
    }
}
