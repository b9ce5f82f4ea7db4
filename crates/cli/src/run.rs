//! `remitmatch run`: decode both ledgers, reconcile, write the partitions.

use std::path::{Path, PathBuf};

use remitmatch_core::{Grid, Record};
use remitmatch_io::ImportStats;
use remitmatch_recon::config::OutputFormat;
use remitmatch_recon::model::{PreparedDataset, ReconReport};
use remitmatch_recon::{LogObserver, ReconConfig};
use serde::Serialize;

use crate::CliError;

pub struct RunArgs {
    pub source: PathBuf,
    pub target: PathBuf,
    pub config: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub format: Option<OutputFormat>,
    pub json: bool,
}

/// Paths of the files a run wrote.
#[derive(Serialize)]
struct Outputs {
    matched: String,
    unmatched: String,
}

#[derive(Serialize)]
struct RunReport {
    #[serde(flatten)]
    report: ReconReport,
    outputs: Outputs,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        config.output.format = format;
    }

    let (source_grid, source_stats) = decode(&args.source)?;
    let (target_grid, target_stats) = decode(&args.target)?;

    let mut output = remitmatch_recon::run(&source_grid, &target_grid, &config, &mut LogObserver);
    output.meta.run_at = Some(chrono::Utc::now().to_rfc3339());

    std::fs::create_dir_all(&args.out_dir).map_err(|e| {
        CliError::write(format!("cannot create {}: {e}", args.out_dir.display()))
    })?;

    let ext = config.output.format.extension();
    let matched_path = args.out_dir.join(format!("{}.{ext}", config.output.matched));
    let unmatched_path = args.out_dir.join(format!("{}.{ext}", config.output.unmatched));

    for out in [&matched_path, &unmatched_path] {
        for input in [&args.source, &args.target] {
            if same_file(out, input) {
                return Err(CliError::usage(format!(
                    "output {} would overwrite input {}",
                    out.display(),
                    input.display()
                ))
                .with_hint("choose another --out-dir or rename the outputs in [output]"));
            }
        }
    }

    let format = config.output.format;
    write_records(&output.result.matched, &matched_path, format, &config.output.matched)?;
    write_records(&output.result.unmatched, &unmatched_path, format, &config.output.unmatched)?;

    if args.json {
        let report = RunReport {
            report: output.report(),
            outputs: Outputs {
                matched: matched_path.display().to_string(),
                unmatched: unmatched_path.display().to_string(),
            },
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    // Human summary to stderr
    describe("source", &args.source, &source_stats, &output.source);
    describe("target", &args.target, &target_stats, &output.target);
    let s = &output.summary;
    eprintln!(
        "{} matched ({} enriched), {} unmatched; remitted {:.2}, rejected {:.2}",
        s.matched, s.enriched, s.unmatched, s.total_remit, s.total_rejected
    );
    eprintln!("wrote {}", matched_path.display());
    eprintln!("wrote {}", unmatched_path.display());

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::read(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {e}", path.display()))
            .with_hint("every key is optional; see [source], [target] and [output]")
    })
}

pub(crate) fn decode(path: &Path) -> Result<(Grid, ImportStats), CliError> {
    let (grid, stats) = remitmatch_io::decode(path).map_err(CliError::read)?;
    log::info!("{}: {}", path.display(), stats.summary());
    for warning in &stats.warnings {
        log::warn!("{}: {}", path.display(), warning);
    }
    Ok((grid, stats))
}

fn write_records(
    records: &[Record],
    path: &Path,
    format: OutputFormat,
    sheet_name: &str,
) -> Result<(), CliError> {
    let written = match format {
        OutputFormat::Xlsx => remitmatch_io::xlsx::export_records(records, path, sheet_name).map(|_| ()),
        OutputFormat::Csv => remitmatch_io::csv::export_records(records, path).map(|_| ()),
        OutputFormat::Json => remitmatch_io::json::export_records(records, path).map(|_| ()),
    };
    written.map_err(|e| CliError::write(format!("cannot write {}: {e}", path.display())))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn describe(role: &str, path: &Path, stats: &ImportStats, prepared: &PreparedDataset) {
    let columns = &prepared.columns;
    let amount = columns
        .amt_field
        .as_deref()
        .map(|a| format!(", amount '{a}'"))
        .unwrap_or_default();
    eprintln!(
        "{role}: {} [{}] header row {}{}: {} records, id '{}'{amount}",
        path.display(),
        stats.sheet_name,
        prepared.dataset.header_row,
        if prepared.header_forced { " (forced)" } else { "" },
        prepared.dataset.records.len(),
        columns.id_field,
    );
}
