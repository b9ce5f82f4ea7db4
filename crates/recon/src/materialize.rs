use remitmatch_core::{Grid, Record};

use crate::model::Dataset;

/// Turn every row below `header_row` into a labelled record.
///
/// Labels are the header cells' display strings; columns under a blank header
/// cell have no label and are skipped. Fully blank rows are dropped. Repeated
/// labels collapse to one field holding the rightmost column's value.
pub fn materialize(grid: &Grid, header_row: usize) -> Dataset {
    let header: Vec<Option<String>> = grid
        .row(header_row)
        .iter()
        .map(|c| if c.is_blank() { None } else { Some(c.display()) })
        .collect();

    let mut labels: Vec<String> = Vec::new();
    for label in header.iter().flatten() {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }

    let mut records = Vec::new();
    for r in header_row + 1..grid.row_count() {
        let row = grid.row(r);
        if row.iter().all(|c| c.is_blank()) {
            continue;
        }
        let mut record = Record::new();
        for (c, label) in header.iter().enumerate() {
            if let Some(label) = label {
                record.set(label.as_str(), grid.cell(r, c).clone());
            }
        }
        records.push(record);
    }

    Dataset {
        header_row,
        labels,
        records,
    }
}
