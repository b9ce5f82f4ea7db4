// Excel import (first worksheet only) and record export

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use remitmatch_core::{Cell, Grid, Record};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use crate::{column_labels, trim_trailing_blanks, ImportStats};

/// Maximum cells decoded from one worksheet
const MAX_CELLS: usize = 5_000_000;

/// Import the first worksheet of an Excel/ODS file (xlsx, xlsm, xlsb, xls, ods).
///
/// Rows are relative to the worksheet's used range. Trailing blank cells in
/// each row are dropped; blank rows in the middle are kept so header
/// positions stay meaningful.
pub fn import(path: &Path) -> Result<(Grid, ImportStats), String> {
    let start_time = Instant::now();

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(sheet_name) = sheet_names.first().cloned() else {
        return Err("Excel file contains no sheets".to_string());
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut stats = ImportStats {
        sheet_name: sheet_name.clone(),
        sheets_ignored: sheet_names.len() - 1,
        ..ImportStats::default()
    };
    if stats.sheets_ignored > 0 {
        log::debug!(
            "{}: reading '{}', ignoring {} other sheet(s)",
            path.display(),
            sheet_name,
            stats.sheets_ignored
        );
    }

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(range.height());
    let mut total_cells = 0usize;

    'rows: for data_row in range.rows() {
        let mut row = Vec::with_capacity(data_row.len());
        for data in data_row {
            if total_cells >= MAX_CELLS {
                stats.truncated = true;
                stats.warnings.push(format!(
                    "Import stopped at {} cells (limit reached)",
                    MAX_CELLS
                ));
                log::warn!("{}: import stopped at {} cells", path.display(), MAX_CELLS);
                trim_trailing_blanks(&mut row);
                rows.push(row);
                break 'rows;
            }

            let cell = convert(data, &mut stats);
            if !cell.is_blank() {
                stats.cells_imported += 1;
            }
            total_cells += 1;
            row.push(cell);
        }
        trim_trailing_blanks(&mut row);
        rows.push(row);
    }

    let grid = Grid::new(rows);
    stats.rows = grid.row_count();
    stats.cols = grid.width();
    stats.import_duration_ms = start_time.elapsed().as_millis();
    Ok((grid, stats))
}

fn convert(data: &Data, stats: &mut ImportStats) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return Cell::Number(dt.as_f64());
            }
            match dt.as_datetime() {
                Some(ts) => {
                    stats.dates_imported += 1;
                    Cell::DateTime(ts)
                }
                None => Cell::Number(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) => match parse_iso(s) {
            Some(ts) => {
                stats.dates_imported += 1;
                Cell::DateTime(ts)
            }
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write records to a single-sheet workbook: one header row of labels
/// (first-seen order across all records), then one row per record.
///
/// Numbers and booleans keep their type; timestamps are written as text.
/// `sheet_name` is reduced to a legal worksheet name first (see
/// [`worksheet_name`]).
pub fn export_records(records: &[Record], path: &Path, sheet_name: &str) -> Result<usize, String> {
    let labels = column_labels(records);
    let sheet_name = worksheet_name(sheet_name);
    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(&sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    for (col, label) in labels.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, label)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    let mut cells = 0usize;
    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, label) in labels.iter().enumerate() {
            let col = col as u16;
            let written = match record.get(label) {
                None | Some(Cell::Empty) => continue,
                Some(Cell::Number(n)) => worksheet.write_number(row, col, *n),
                Some(Cell::Bool(b)) => worksheet.write_boolean(row, col, *b),
                Some(other) => worksheet.write_string(row, col, other.display()),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            cells += 1;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(cells)
}

/// Excel caps worksheet names at 31 characters and forbids `[]:*?/\`,
/// leading or trailing apostrophes and the reserved name `History`.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Legal worksheet name for `name`: forbidden characters become `_`, the
/// result is cut to 31 characters and stripped of edge apostrophes.
pub fn worksheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Sheet1".to_string()
    } else if trimmed.eq_ignore_ascii_case("history") {
        format!("{trimmed}_")
    } else {
        trimmed.to_string()
    }
}
