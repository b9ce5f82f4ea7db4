//! Header-row inference.
//!
//! Exported reports rarely start with their column names: banners, report
//! titles, blank spacer rows and "printed on" lines come first. Every row in a
//! short scan window is scored on five content features and the best one is
//! taken as the header.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use remitmatch_core::{Cell, Grid};

use crate::model::RowScore;

/// Rows examined from the top of the grid.
pub const SCAN_ROWS: usize = 10;

/// Rows below a candidate inspected for per-column type consistency.
pub const LOOKAHEAD_ROWS: usize = 4;

/// Best scores under this fall back to row 0.
pub const MIN_HEADER_SCORE: f64 = 0.2;

const W_FILL: f64 = 0.20;
const W_TEXT: f64 = 0.25;
const W_TERMS: f64 = 0.10;
const W_UNIQUE: f64 = 0.15;
const W_CONSISTENCY: f64 = 0.30;

const NOISE_PENALTY: f64 = 0.3;
const SINGLE_CELL_PENALTY: f64 = 0.2;

/// Words typically found in ledger / claims column names.
const HEADER_TERMS: &[&str] = &[
    "id", "name", "date", "amount", "amt", "total", "claim", "bill", "invoice", "number", "code",
    "type", "status", "description", "account", "patient", "member", "policy", "payer", "provider",
    "service", "paid", "balance", "reference", "ref", "customer", "qty", "quantity", "price",
    "remark", "remit", "due", "period", "category", "currency",
];

/// Banner / summary vocabulary that marks a row as report furniture.
const NOISE_TERMS: &[&str] = &[
    "report", "summary", "generated", "printed", "page ", "confidential", "statement of", "as of",
    "run date", "grand total",
];

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}|\d{1,2}[ -](jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[ ,-]*\d{2,4}|(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]* \d{1,2},? \d{2,4})")
        .unwrap()
});

/// Pick the most likely header row. Empty grids and weak candidates give 0.
pub fn locate(grid: &Grid) -> usize {
    best_row(&score_rows(grid))
}

/// Highest-scoring row, ties to the earliest; 0 when nothing clears
/// [`MIN_HEADER_SCORE`].
pub fn best_row(scores: &[RowScore]) -> usize {
    let mut best: Option<&RowScore> = None;
    for s in scores {
        if best.map_or(true, |b| s.score > b.score) {
            best = Some(s);
        }
    }
    match best {
        Some(b) if b.score >= MIN_HEADER_SCORE => b.row,
        _ => 0,
    }
}

/// Score every non-empty row in the scan window independently.
///
/// Zero-length rows are not scored but still use up the window.
pub fn score_rows(grid: &Grid) -> Vec<RowScore> {
    let window = grid.row_count().min(SCAN_ROWS);
    (0..window)
        .filter(|&r| !grid.row(r).is_empty())
        .map(|r| score_row(grid, r))
        .collect()
}

pub fn score_row(grid: &Grid, r: usize) -> RowScore {
    let row = grid.row(r);
    if row.is_empty() {
        return RowScore {
            row: r,
            fill_rate: 0.0,
            text_ratio: 0.0,
            term_score: 0.0,
            uniqueness: 0.0,
            consistency: 0.0,
            noise_penalty: false,
            single_cell_penalty: false,
            raw_score: 0.0,
            score: 0.0,
        };
    }
    let len = row.len() as f64;

    let non_empty: Vec<&Cell> = row.iter().filter(|c| !c.is_blank()).collect();
    let fill_rate = non_empty.len() as f64 / len;

    let text_cells = row
        .iter()
        .filter(|c| matches!(c, Cell::Text(s) if !s.trim().is_empty() && !is_numeric_text(s)))
        .count();
    let text_ratio = text_cells as f64 / len;

    let lowered: Vec<String> = non_empty.iter().map(|c| c.display().to_lowercase()).collect();

    let term_hits: usize = lowered
        .iter()
        .map(|text| HEADER_TERMS.iter().filter(|t| text.contains(*t)).count())
        .sum();
    let term_score = (term_hits as f64 / len).min(1.0);

    let uniqueness = if non_empty.is_empty() {
        0.0
    } else {
        let distinct: HashSet<&str> = lowered.iter().map(String::as_str).collect();
        distinct.len() as f64 / non_empty.len() as f64
    };

    let consistency = consistency_score(grid, r);

    let raw_score = W_FILL * fill_rate
        + W_TEXT * text_ratio
        + W_TERMS * term_score
        + W_UNIQUE * uniqueness
        + W_CONSISTENCY * consistency;

    let noise_penalty = lowered
        .iter()
        .any(|text| NOISE_TERMS.iter().any(|n| text.contains(n)));
    let single_cell_penalty = non_empty.len() == 1;

    let mut score = raw_score;
    if noise_penalty {
        score *= NOISE_PENALTY;
    }
    if single_cell_penalty {
        score *= SINGLE_CELL_PENALTY;
    }

    RowScore {
        row: r,
        fill_rate,
        text_ratio,
        term_score,
        uniqueness,
        consistency,
        noise_penalty,
        single_cell_penalty,
        raw_score,
        score,
    }
}

// ---------------------------------------------------------------------------
// Column type consistency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ValueKind {
    Number,
    DateLike,
    NumericText,
    PlainText,
    Boolean,
}

fn value_kind(cell: &Cell) -> Option<ValueKind> {
    match cell {
        _ if cell.is_blank() => None,
        Cell::Number(_) => Some(ValueKind::Number),
        Cell::DateTime(_) => Some(ValueKind::DateLike),
        Cell::Bool(_) => Some(ValueKind::Boolean),
        Cell::Text(s) if is_date_like(s) => Some(ValueKind::DateLike),
        Cell::Text(s) if is_numeric_text(s) => Some(ValueKind::NumericText),
        Cell::Text(_) => Some(ValueKind::PlainText),
        Cell::Empty => None,
    }
}

/// Fraction of labelled columns whose next few values stay within two kinds.
///
/// Columns with a blank candidate cell, or with nothing below it in the
/// lookahead, are left out entirely.
fn consistency_score(grid: &Grid, r: usize) -> f64 {
    let lookahead = LOOKAHEAD_ROWS.min(grid.row_count().saturating_sub(r + 1));
    let mut considered = 0usize;
    let mut consistent = 0usize;

    for (c, header) in grid.row(r).iter().enumerate() {
        if header.is_blank() {
            continue;
        }
        let kinds: HashSet<ValueKind> = (r + 1..=r + lookahead)
            .filter_map(|below| value_kind(grid.cell(below, c)))
            .collect();
        if kinds.is_empty() {
            continue;
        }
        considered += 1;
        if kinds.len() <= 2 {
            consistent += 1;
        }
    }

    if considered == 0 {
        0.0
    } else {
        consistent as f64 / considered as f64
    }
}

/// Text that reads as a bare number (`"42"`, `" -3.5 "`), no symbols.
pub fn is_numeric_text(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && t.parse::<f64>().map_or(false, f64::is_finite)
}

fn is_date_like(s: &str) -> bool {
    DATE_LIKE.is_match(s.trim())
}
