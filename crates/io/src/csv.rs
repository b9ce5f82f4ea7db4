// CSV/TSV import and record export

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use remitmatch_core::{Cell, Grid, Record};

use crate::{column_labels, trim_trailing_blanks, ImportStats};

pub fn import(path: &Path) -> Result<(Grid, ImportStats), String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!("{}: sniffed delimiter {:?}", path.display(), delimiter as char);
    import_from_string(path, &content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<(Grid, ImportStats), String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(path, &content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Report banners are often a single field, so any sampled line with
        // more than one field makes the candidate viable.
        let Some(&widest) = counts.iter().max() else {
            continue;
        };
        if widest <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == widest).count() as u64;
        let score = consistent * widest as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let mut content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    if content.starts_with('\u{feff}') {
        content.drain(..'\u{feff}'.len_utf8());
    }
    Ok(content)
}

fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<(Grid, ImportStats), String> {
    let start_time = Instant::now();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut stats = ImportStats {
        sheet_name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..ImportStats::default()
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let mut row: Vec<Cell> = record.iter().map(type_field).collect();
        trim_trailing_blanks(&mut row);
        stats.cells_imported += row.iter().filter(|c| !c.is_blank()).count();
        rows.push(row);
    }

    let grid = Grid::new(rows);
    stats.rows = grid.row_count();
    stats.cols = grid.width();
    stats.import_duration_ms = start_time.elapsed().as_millis();
    Ok((grid, stats))
}

/// Give a raw CSV field the type a spreadsheet would infer.
///
/// Bare decimal literals become numbers unless they carry a leading zero
/// (`"007"` stays text so zero-padded identifiers survive). Currency and
/// thousands separators are left as text.
fn type_field(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    if field.eq_ignore_ascii_case("true") {
        return Cell::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Cell::Bool(false);
    }
    if is_number_literal(field) {
        if let Ok(n) = field.parse::<f64>() {
            return Cell::Number(n);
        }
    }
    Cell::Text(field.to_string())
}

fn is_number_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let int_ok = !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit());
    let frac_ok = frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    let no_padding = int == "0" || !int.starts_with('0');
    int_ok && frac_ok && no_padding
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write records as CSV: a header row of labels (first-seen order), then one
/// row per record using display text. Absent fields are written empty.
pub fn export_records(records: &[Record], path: &Path) -> Result<usize, String> {
    export_with_delimiter(records, path, b',')
}

fn export_with_delimiter(records: &[Record], path: &Path, delimiter: u8) -> Result<usize, String> {
    let labels = column_labels(records);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    if !labels.is_empty() {
        writer.write_record(&labels).map_err(|e| e.to_string())?;
    }
    for record in records {
        let row: Vec<String> = labels
            .iter()
            .map(|label| record.get(label).map(Cell::display).unwrap_or_default())
            .collect();
        writer.write_record(&row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_claims_export() {
        let content = "Claim ID;Patient;Amt\nC-1;Ann;1600\nC-2;Bob;75\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_remittance() {
        let content = "BillNo,Paid Amount,Paid Date\nC-1,1200.00,2026-03-02\nC-2,75,2026-03-10\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_claims_export() {
        let content = "Claim No\tStatus\tAmt\nC-1\tOpen\t1600\nC-3\tDenied\t40\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_remittance() {
        let content = "Payer|BillNo|Paid Amount\nAcme Health|C-1|300.50\nAcme Health|C-2|75\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_quoted_commas() {
        let content = "Patient;Payer;Paid Amount\n\"Doe, Jane\";\"Acme Health, Inc.\";1200.00\nBob;Acme;75\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_past_banner_line() {
        let content = "Remittance Report\nID;Amt\nX;50\nY;10\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_field_typing() {
        assert_eq!(type_field(""), Cell::Empty);
        assert_eq!(type_field("42"), Cell::Number(42.0));
        assert_eq!(type_field("-3.5"), Cell::Number(-3.5));
        assert_eq!(type_field("0.25"), Cell::Number(0.25));
        assert_eq!(type_field("TRUE"), Cell::Bool(true));
        assert_eq!(type_field("false"), Cell::Bool(false));
        assert_eq!(type_field("007"), Cell::text("007"));
        assert_eq!(type_field("$1,200.00"), Cell::text("$1,200.00"));
        assert_eq!(type_field("1e5"), Cell::text("1e5"));
        assert_eq!(type_field("C-1"), Cell::text("C-1"));
        assert_eq!(type_field(" "), Cell::text(" "));
    }

    #[test]
    fn test_import_keeps_banners_and_trims_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remits.csv");
        fs::write(&path, "\u{feff}Remittance Report,,\nID,Amt,\nX,50,\n").unwrap();

        let (grid, stats) = import(&path).unwrap();
        assert_eq!(stats.sheet_name, "remits");
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.row(0), &[Cell::text("Remittance Report")]);
        assert_eq!(grid.row(1), &[Cell::text("ID"), Cell::text("Amt")]);
        assert_eq!(grid.row(2), &[Cell::text("X"), Cell::Number(50.0)]);
        assert_eq!(stats.cells_imported, 5);
        assert_eq!(stats.cols, 2);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Café" with 0xE9 (not valid UTF-8)
        fs::write(&path, b"Name,Amt\nCaf\xe9,1\n").unwrap();

        let (grid, _) = import(&path).unwrap();
        assert_eq!(grid.cell(1, 0), &Cell::text("Café"));
    }

    #[test]
    fn test_tsv_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("claims.tsv");
        fs::write(&path, "Claim ID\tAmt\nA, B\t12.5\n").unwrap();

        let (grid, _) = import_tsv(&path).unwrap();
        assert_eq!(grid.cell(1, 0), &Cell::text("A, B"));
        assert_eq!(grid.cell(1, 1), &Cell::Number(12.5));
    }

    #[test]
    fn test_export_records_unions_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unmatched.csv");
        let records = vec![
            Record::from_pairs([("Claim ID", Cell::text("Y")), ("Amt", Cell::Number(10.0))]),
            Record::from_pairs([("Claim ID", Cell::text("Z, Jr")), ("Note", Cell::Bool(false))]),
        ];

        assert_eq!(export_records(&records, &path).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Claim ID,Amt,Note\nY,10,\n\"Z, Jr\",,FALSE\n");
    }

    #[test]
    fn test_export_no_records_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(export_records(&[], &path).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
