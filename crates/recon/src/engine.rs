use remitmatch_core::Grid;

use crate::aggregate::aggregate;
use crate::columns::identify;
use crate::config::{DatasetConfig, ReconConfig};
use crate::evidence::compute_summary;
use crate::header::{best_row, score_rows};
use crate::materialize::materialize;
use crate::model::{ColumnRoles, PreparedDataset, ReconMeta, ReconOutput, Role};
use crate::observer::{ReconEvent, ReconObserver};
use crate::reconcile::reconcile_observed;

/// Run reconciliation of `target` against `source`.
///
/// Each grid is prepared independently (header, records, columns); the
/// reconciler is the join point. Business-data irregularities never fail a
/// run, so there is no error path here. The output depends only on the
/// inputs; `meta.run_at` is left for the caller to stamp.
pub fn run(
    source: &Grid,
    target: &Grid,
    config: &ReconConfig,
    observer: &mut dyn ReconObserver,
) -> ReconOutput {
    let source = prepare(source, Role::Source, &config.source, observer);
    let target = prepare(target, Role::Target, &config.target, observer);

    let aggregates = aggregate(
        &source.dataset.records,
        &source.columns.id_field,
        source.columns.amt_field.as_deref(),
    );
    observer.on_event(ReconEvent::Aggregated {
        identifiers: aggregates.len(),
        records: source.dataset.records.len(),
    });

    let result = reconcile_observed(
        &source.dataset.records,
        &target.dataset.records,
        &source.columns.id_field,
        &target.columns.id_field,
        &aggregates,
        observer,
    );

    let summary = compute_summary(&source, &target, &aggregates, &result);

    ReconOutput {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: None,
        },
        source,
        target,
        aggregates,
        result,
        summary,
    }
}

/// Locate the header, materialize records and pick columns for one grid.
pub fn prepare(
    grid: &Grid,
    role: Role,
    overrides: &DatasetConfig,
    observer: &mut dyn ReconObserver,
) -> PreparedDataset {
    let (header_row, score) = match overrides.header_row {
        Some(row) => (row, None),
        None => {
            let scores = score_rows(grid);
            let row = best_row(&scores);
            let score = scores.iter().find(|s| s.row == row).map(|s| s.score);
            (row, score)
        }
    };
    let header_forced = overrides.header_row.is_some();
    observer.on_event(ReconEvent::HeaderLocated {
        role,
        row: header_row,
        score,
        forced: header_forced,
    });

    let dataset = materialize(grid, header_row);
    observer.on_event(ReconEvent::RecordsMaterialized {
        role,
        records: dataset.records.len(),
        labels: dataset.labels.len(),
    });

    let inferred = identify(&dataset.labels, role);
    let columns = ColumnRoles {
        id_field: overrides.id_column.clone().unwrap_or(inferred.id_field),
        amt_field: match role {
            Role::Source => overrides.amount_column.clone().or(inferred.amt_field),
            Role::Target => None,
        },
    };
    observer.on_event(ReconEvent::ColumnsIdentified {
        role,
        columns: columns.clone(),
        id_missing: !dataset.labels.contains(&columns.id_field),
    });

    PreparedDataset {
        role,
        dataset,
        columns,
        header_forced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventLog, NoopObserver};
    use remitmatch_core::Cell;

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    #[test]
    fn repeated_runs_are_identical() {
        let source = Grid::new(vec![
            vec![t("ID"), t("Amt")],
            vec![t("X"), Cell::Number(50.0)],
        ]);
        let target = Grid::new(vec![
            vec![t("Claim ID"), t("Amt")],
            vec![t("X"), Cell::Number(80.0)],
        ]);
        let config = ReconConfig::default();

        let first = run(&source, &target, &config, &mut NoopObserver);
        let second = run(&source, &target, &config, &mut NoopObserver);
        assert!(first.meta.run_at.is_none());
        assert_eq!(
            serde_json::to_string(&first.report()).unwrap(),
            serde_json::to_string(&second.report()).unwrap()
        );
        assert_eq!(first.result.matched, second.result.matched);
    }

    #[test]
    fn prepare_reports_each_stage() {
        let grid = Grid::new(vec![
            vec![t("ID"), t("Amt")],
            vec![t("X"), Cell::Number(50.0)],
        ]);
        let mut events = EventLog::new();
        let prepared = prepare(&grid, Role::Source, &DatasetConfig::default(), &mut events);
        assert_eq!(prepared.dataset.header_row, 0);
        assert_eq!(prepared.columns.id_field, "ID");
        assert_eq!(prepared.columns.amt_field.as_deref(), Some("Amt"));

        let kinds: Vec<&str> = events
            .events()
            .iter()
            .map(|e| match e {
                ReconEvent::HeaderLocated { .. } => "header",
                ReconEvent::RecordsMaterialized { .. } => "records",
                ReconEvent::ColumnsIdentified { .. } => "columns",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["header", "records", "columns"]);
    }

    #[test]
    fn overrides_replace_inference() {
        let grid = Grid::new(vec![
            vec![t("Ref"), t("Paid"), t("Amount")],
            vec![t("Bill No"), t("Net"), t("Gross")],
            vec![t("X"), Cell::Number(5.0), Cell::Number(6.0)],
        ]);
        let overrides = DatasetConfig {
            header_row: Some(1),
            id_column: Some("Bill No".into()),
            amount_column: Some("Net".into()),
        };
        let prepared = prepare(&grid, Role::Source, &overrides, &mut NoopObserver);
        assert!(prepared.header_forced);
        assert_eq!(prepared.dataset.records.len(), 1);
        assert_eq!(prepared.columns.id_field, "Bill No");
        assert_eq!(prepared.columns.amt_field.as_deref(), Some("Net"));
    }

    #[test]
    fn target_never_gets_amount_column() {
        let grid = Grid::new(vec![vec![t("Claim ID"), t("Amount")]]);
        let overrides = DatasetConfig {
            amount_column: Some("Amount".into()),
            ..DatasetConfig::default()
        };
        let prepared = prepare(&grid, Role::Target, &overrides, &mut NoopObserver);
        assert_eq!(prepared.columns.amt_field, None);
    }

    #[test]
    fn missing_target_id_is_flagged() {
        let grid = Grid::new(vec![vec![t("Patient"), t("Amt")], vec![t("p"), t("1")]]);
        let mut events = EventLog::new();
        let prepared = prepare(&grid, Role::Target, &DatasetConfig::default(), &mut events);
        assert_eq!(prepared.columns.id_field, "Claim ID");
        assert!(events.events().iter().any(|e| matches!(
            e,
            ReconEvent::ColumnsIdentified { id_missing: true, .. }
        )));
    }
}
