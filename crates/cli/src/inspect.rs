//! `remitmatch inspect`: header-locator score breakdown for one file.

use std::path::PathBuf;

use remitmatch_recon::columns::identify;
use remitmatch_recon::header::{best_row, score_rows, MIN_HEADER_SCORE};
use remitmatch_recon::materialize::materialize;
use remitmatch_recon::model::{ColumnRoles, RowScore};
use remitmatch_recon::Role;
use serde::Serialize;

use crate::run::decode;
use crate::CliError;

#[derive(Serialize)]
struct InspectReport {
    file: String,
    sheet: String,
    rows: usize,
    cells: usize,
    header_row: usize,
    labels: Vec<String>,
    records: usize,
    as_source: ColumnRoles,
    as_target: ColumnRoles,
    scores: Vec<RowScore>,
}

pub fn cmd_inspect(file: PathBuf, json: bool) -> Result<(), CliError> {
    let (grid, stats) = decode(&file)?;

    let scores = score_rows(&grid);
    let header_row = best_row(&scores);
    let dataset = materialize(&grid, header_row);

    let report = InspectReport {
        file: file.display().to_string(),
        sheet: stats.sheet_name,
        rows: grid.row_count(),
        cells: grid.non_empty_cells(),
        header_row,
        as_source: identify(&dataset.labels, Role::Source),
        as_target: identify(&dataset.labels, Role::Target),
        records: dataset.records.len(),
        labels: dataset.labels,
        scores,
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "{} [{}]: {} rows, {} non-empty cells",
        report.file, report.sheet, report.rows, report.cells
    );
    println!();
    println!("  row  score   raw    fill  text  terms uniq  cons  flags");
    for s in &report.scores {
        let mut flags = Vec::new();
        if s.noise_penalty {
            flags.push("noise");
        }
        if s.single_cell_penalty {
            flags.push("single");
        }
        println!(
            "{} {:>3}  {:.3}  {:.3}  {:.2}  {:.2}  {:.2}  {:.2}  {:.2}  {}",
            if s.row == report.header_row { "*" } else { " " },
            s.row,
            s.score,
            s.raw_score,
            s.fill_rate,
            s.text_ratio,
            s.term_score,
            s.uniqueness,
            s.consistency,
            flags.join(","),
        );
    }
    println!();

    let weak = report.scores.iter().all(|s| s.score < MIN_HEADER_SCORE);
    println!(
        "header row: {}{}",
        report.header_row,
        if weak { " (no row scored above threshold)" } else { "" }
    );
    println!("labels:     {}", report.labels.join(" | "));
    println!("records:    {}", report.records);
    println!(
        "as source:  id '{}', amount {}",
        report.as_source.id_field,
        report
            .as_source
            .amt_field
            .as_deref()
            .map(|a| format!("'{a}'"))
            .unwrap_or_else(|| "none".to_string())
    );
    println!("as target:  id '{}'", report.as_target.id_field);

    Ok(())
}
