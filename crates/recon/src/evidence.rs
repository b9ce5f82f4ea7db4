use remitmatch_core::Cell;

use crate::model::{AggregateTable, PreparedDataset, ReconSummary, ReconciliationResult};
use crate::reconcile::{REJECTED_FIELD, REMIT_FIELD};

/// Compute summary statistics for a finished run.
pub fn compute_summary(
    source: &PreparedDataset,
    target: &PreparedDataset,
    aggregates: &AggregateTable,
    result: &ReconciliationResult,
) -> ReconSummary {
    let mut total_remit = 0.0;
    let mut total_rejected = 0.0;

    for record in &result.matched {
        if let Some(Cell::Number(n)) = record.get(REMIT_FIELD) {
            total_remit += n;
        }
        if let Some(Cell::Number(n)) = record.get(REJECTED_FIELD) {
            total_rejected += n;
        }
    }

    ReconSummary {
        source_records: source.dataset.records.len(),
        target_records: target.dataset.records.len(),
        distinct_source_ids: aggregates.len(),
        matched: result.matched.len(),
        unmatched: result.unmatched.len(),
        enriched: result.enriched,
        total_remit,
        total_rejected,
    }
}
