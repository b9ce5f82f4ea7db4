// File I/O: decoding collaborators yield grids, encoding collaborators write
// record sets. Only the first worksheet of a workbook is ever read.

use std::path::Path;

use remitmatch_core::{Grid, Record};

pub mod csv;
pub mod json;
pub mod xlsx;

/// Statistics from decoding one input file.
#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    /// Worksheet that was read (CSV inputs report the file stem)
    pub sheet_name: String,
    /// Other worksheets present but ignored
    pub sheets_ignored: usize,
    pub rows: usize,
    pub cols: usize,
    /// Non-blank cells decoded
    pub cells_imported: usize,
    /// Date-time cells resolved to timestamps
    pub dates_imported: usize,
    /// Whether the cell limit cut the grid short
    pub truncated: bool,
    /// Actionable warnings (not boilerplate)
    pub warnings: Vec<String>,
    pub import_duration_ms: u128,
}

impl ImportStats {
    /// One-line summary suitable for display
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("sheet '{}'", self.sheet_name),
            format!("{} row{}", self.rows, if self.rows == 1 { "" } else { "s" }),
            format!("{} cells", self.cells_imported),
        ];
        if self.dates_imported > 0 {
            parts.push(format!("{} dates", self.dates_imported));
        }
        if self.sheets_ignored > 0 {
            parts.push(format!("{} other sheets ignored", self.sheets_ignored));
        }
        if self.truncated {
            parts.push("truncated".to_string());
        }
        format!("{} ({}ms)", parts.join(", "), self.import_duration_ms)
    }
}

/// Decode a file into a grid, picking the decoder from its extension.
pub fn decode(path: &Path) -> Result<(Grid, ImportStats), String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => csv::import(path),
        "tsv" | "tab" => csv::import_tsv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => xlsx::import(path),
        "" => Err(format!("{}: cannot tell file type without an extension", path.display())),
        other => Err(format!("{}: unsupported file type '.{other}'", path.display())),
    }
}

/// Union of record labels in first-seen order; the column layout for export.
pub fn column_labels(records: &[Record]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for record in records {
        for label in record.labels() {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }
    labels
}

/// Drop trailing blank cells so sparse rows keep their natural length.
pub(crate) fn trim_trailing_blanks(row: &mut Vec<remitmatch_core::Cell>) {
    while row.last().is_some_and(|c| c.is_blank()) {
        row.pop();
    }
}
