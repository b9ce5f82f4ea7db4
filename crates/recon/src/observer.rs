//! Diagnostics side channel.
//!
//! The pipeline reports what it decided to an injected observer instead of
//! logging through globals. Callers choose: ignore ([`NoopObserver`]), collect
//! ([`EventLog`]) or forward to the `log` facade ([`LogObserver`]).

use serde::Serialize;

use crate::model::{ColumnRoles, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReconEvent {
    HeaderLocated {
        role: Role,
        row: usize,
        score: Option<f64>,
        forced: bool,
    },
    RecordsMaterialized {
        role: Role,
        records: usize,
        labels: usize,
    },
    ColumnsIdentified {
        role: Role,
        columns: ColumnRoles,
        /// The chosen identifier label is not among the header labels.
        id_missing: bool,
    },
    Aggregated {
        identifiers: usize,
        records: usize,
    },
    /// A matched record had no `amt` column and passed through unchanged.
    EnrichmentSkipped {
        target_index: usize,
    },
    Partitioned {
        matched: usize,
        unmatched: usize,
    },
}

/// Append-only sink for pipeline events.
pub trait ReconObserver {
    fn on_event(&mut self, event: ReconEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconObserver for NoopObserver {
    fn on_event(&mut self, _event: ReconEvent) {}
}

/// Collects events in arrival order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<ReconEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ReconEvent] {
        &self.events
    }
}

impl ReconObserver for EventLog {
    fn on_event(&mut self, event: ReconEvent) {
        self.events.push(event);
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReconObserver for LogObserver {
    fn on_event(&mut self, event: ReconEvent) {
        match event {
            ReconEvent::HeaderLocated { role, row, score, forced } => {
                if forced {
                    log::info!("{role}: header row {row} (from config)");
                } else {
                    log::info!("{role}: header row {row} (score {:.3})", score.unwrap_or(0.0));
                }
            }
            ReconEvent::RecordsMaterialized { role, records, labels } => {
                log::debug!("{role}: {records} records across {labels} labelled columns");
            }
            ReconEvent::ColumnsIdentified { role, columns, id_missing } => {
                log::info!(
                    "{role}: id column '{}', amount column {}",
                    columns.id_field,
                    columns.amt_field.as_deref().map_or("<none>".to_string(), |a| format!("'{a}'"))
                );
                if id_missing {
                    log::warn!(
                        "{role}: id column '{}' not present in header; every row resolves to a missing identifier",
                        columns.id_field
                    );
                }
            }
            ReconEvent::Aggregated { identifiers, records } => {
                log::debug!("aggregated {records} source records into {identifiers} identifiers");
            }
            ReconEvent::EnrichmentSkipped { target_index } => {
                log::debug!("target record {target_index}: no amt column, passed through");
            }
            ReconEvent::Partitioned { matched, unmatched } => {
                log::info!("{matched} matched, {unmatched} unmatched");
            }
        }
    }
}

impl<T: ReconObserver + ?Sized> ReconObserver for &mut T {
    fn on_event(&mut self, event: ReconEvent) {
        (**self).on_event(event);
    }
}
