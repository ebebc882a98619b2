use regex::Regex;
use std::sync::LazyLock;

use crate::loader::{RawCell, RawTable};

/// Number of leading rows inspected when looking for the header row
pub const HEADER_SCAN_ROWS: usize = 30;

/// Header-like cells a row needs before it can be a header candidate
pub const MIN_HEADER_CELLS: usize = 5;

/// Cells this long or longer are treated as prose, not column titles
const MAX_HEADER_CELL_CHARS: usize = 50;

/// Rows whose joined text contains any of these are export banners
pub const BANNER_KEYWORDS: [&str; 7] = [
    "downloaded",
    "created",
    "search",
    "criteria",
    "link",
    "export",
    "report",
];

/// A header row must mention at least one of these
pub const COMPANY_KEYWORDS: [&str; 6] = [
    "name",
    "company",
    "firm",
    "organization",
    "business",
    "companies",
];

// Pure numeric, currency or percentage tokens: "1,200", "$5M", "-3.5", "12%", "€ 40k"
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?\s*[$€£¥]?\s*[-+]?(\d[\d,]*(\.\d+)?|\.\d+)\s*([kmb]|mm|bn)?\s*%?$")
        .expect("numeric token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCandidate {
    pub row_index: usize,
    /// Number of header-like cells in the row
    pub score: usize,
}

/// Short, textual, non-numeric cell.
pub fn is_header_like(cell: &RawCell) -> bool {
    match cell {
        RawCell::Text(text) => {
            let text = text.trim();
            !text.is_empty()
                && text.chars().count() < MAX_HEADER_CELL_CHARS
                && !NUMERIC_TOKEN.is_match(&text.to_lowercase())
        }
        _ => false,
    }
}

fn joined_text(row: &[RawCell]) -> String {
    row.iter()
        .filter(|cell| !cell.is_blank())
        .map(|cell| cell.as_text().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the row's text contains an export banner keyword.
pub fn is_banner_row(row: &[RawCell]) -> bool {
    let joined = joined_text(row);
    BANNER_KEYWORDS.iter().any(|keyword| joined.contains(keyword))
}

/// Header-like cell count for a row, or `None` when the row is a banner or
/// does not mention anything company related.
pub fn score_header_row(row: &[RawCell], min_cells: usize) -> Option<usize> {
    if is_banner_row(row) {
        return None;
    }

    let joined = joined_text(row);
    let header_like = row.iter().filter(|cell| is_header_like(cell)).count();
    if header_like >= min_cells && COMPANY_KEYWORDS.iter().any(|keyword| joined.contains(keyword))
    {
        Some(header_like)
    } else {
        None
    }
}

/// Best header candidate among the peeked rows. A later row replaces the
/// current best only with a strictly higher score.
///
/// Rows need [`MIN_HEADER_CELLS`] header-like cells. Once a banner row has
/// been seen, a narrow sheet may qualify with as many cells as it is wide
/// (at least two).
pub fn find_header_candidate(raw_peek: &RawTable) -> Option<HeaderCandidate> {
    let narrow_min_cells = MIN_HEADER_CELLS.min(raw_peek.width()).max(2);
    let mut seen_banner = false;

    let mut best: Option<HeaderCandidate> = None;
    for (row_index, row) in raw_peek.rows().iter().take(HEADER_SCAN_ROWS).enumerate() {
        if is_banner_row(row) {
            seen_banner = true;
            continue;
        }

        let min_cells = if seen_banner {
            narrow_min_cells
        } else {
            MIN_HEADER_CELLS
        };
        if let Some(score) = score_header_row(row, min_cells) {
            let replaces = best.map(|current| score > current.score).unwrap_or(true);
            if replaces {
                best = Some(HeaderCandidate { row_index, score });
            }
        }
    }
    best
}

/// Index of the row most likely to be the true header, 0 when none qualifies.
pub fn locate_header(raw_peek: &RawTable) -> usize {
    match find_header_candidate(raw_peek) {
        Some(candidate) => {
            tracing::info!(
                "header row detected at index {} ({} header-like cells)",
                candidate.row_index,
                candidate.score
            );
            candidate.row_index
        }
        None => {
            tracing::debug!("no header candidate found, assuming header at row 0");
            0
        }
    }
}
