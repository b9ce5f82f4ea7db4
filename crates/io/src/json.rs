// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use remitmatch_core::Record;

/// Export records as a JSON array of objects, keys in field order.
/// Empty cells are written as `null`.
pub fn export_records(records: &[Record], path: &Path) -> Result<usize, String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records).map_err(|e| e.to_string())?;
    Ok(records.len())
}
