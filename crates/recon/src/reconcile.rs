use std::collections::HashSet;

use remitmatch_core::{Cell, CellKey, Record};

use crate::amount::{parse_amount, round_cents};
use crate::model::{AggregateTable, ReconciliationResult};
use crate::observer::{NoopObserver, ReconEvent, ReconObserver};

pub const REMIT_FIELD: &str = "Remit Amt";
pub const REJECTED_FIELD: &str = "Rejected Amount";

/// Literal key read for the target's original amount. Case-sensitive, unlike
/// the positional `amt` search that decides where enrichment goes.
pub const ORIGINAL_AMOUNT_FIELD: &str = "Amt";

/// Distinct identifier values across the source records.
pub fn identifier_set(records: &[Record], id_field: &str) -> HashSet<CellKey> {
    records.iter().map(|r| CellKey::of(r.get(id_field))).collect()
}

/// Partition target records by source identifier membership and enrich the
/// matched ones. Both partitions keep target order.
pub fn reconcile(
    source: &[Record],
    target: &[Record],
    source_id_field: &str,
    target_id_field: &str,
    aggregates: &AggregateTable,
) -> ReconciliationResult {
    reconcile_observed(
        source,
        target,
        source_id_field,
        target_id_field,
        aggregates,
        &mut NoopObserver,
    )
}

/// [`reconcile`], reporting skipped enrichments and partition sizes.
pub fn reconcile_observed(
    source: &[Record],
    target: &[Record],
    source_id_field: &str,
    target_id_field: &str,
    aggregates: &AggregateTable,
    observer: &mut dyn ReconObserver,
) -> ReconciliationResult {
    let ids = identifier_set(source, source_id_field);
    let mut result = ReconciliationResult::default();

    for (index, record) in target.iter().enumerate() {
        let key = CellKey::of(record.get(target_id_field));
        if !ids.contains(&key) {
            result.unmatched.push(record.clone());
            continue;
        }
        match enrich(record, &key, aggregates) {
            Some(enriched) => {
                result.enriched += 1;
                result.matched.push(enriched);
            }
            None => {
                observer.on_event(ReconEvent::EnrichmentSkipped { target_index: index });
                result.matched.push(record.clone());
            }
        }
    }

    observer.on_event(ReconEvent::Partitioned {
        matched: result.matched.len(),
        unmatched: result.unmatched.len(),
    });
    result
}

/// Copy of `record` with remit and rejected amounts spliced in right after its
/// `amt` column. `None` when the record has no `amt` column.
///
/// Pre-existing `Remit Amt` / `Rejected Amount` fields are overwritten and
/// moved next to `amt`, wherever they were.
pub fn enrich(record: &Record, key: &CellKey, aggregates: &AggregateTable) -> Option<Record> {
    let pos = record.position(|label| label.eq_ignore_ascii_case("amt"))?;

    let remit = aggregates.total(key).unwrap_or(0.0);
    let original = parse_amount(record.get(ORIGINAL_AMOUNT_FIELD));
    let rejected = round_cents(original - remit);

    let mut enriched = record.clone();
    enriched.insert_after(
        pos,
        vec![
            (REMIT_FIELD.to_string(), Cell::Number(remit)),
            (REJECTED_FIELD.to_string(), Cell::Number(rejected)),
        ],
    );
    Some(enriched)
}
