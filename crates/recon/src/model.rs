use std::collections::BTreeMap;

use remitmatch_core::{CellKey, Record};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Roles + columns
// ---------------------------------------------------------------------------

/// Which side of the reconciliation a dataset plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Amount-bearing ledger; aggregated per identifier.
    Source,
    /// Dataset being partitioned and annotated.
    Target,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// Columns selected for a dataset's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub id_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amt_field: Option<String>,
}

// ---------------------------------------------------------------------------
// Header scoring
// ---------------------------------------------------------------------------

/// Feature breakdown for one scanned row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowScore {
    pub row: usize,
    pub fill_rate: f64,
    pub text_ratio: f64,
    pub term_score: f64,
    pub uniqueness: f64,
    pub consistency: f64,
    pub noise_penalty: bool,
    pub single_cell_penalty: bool,
    /// Weighted sum before penalties.
    pub raw_score: f64,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Materialized data
// ---------------------------------------------------------------------------

/// Records materialized below a header row.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub header_row: usize,
    /// Distinct labels in column order.
    pub labels: Vec<String>,
    pub records: Vec<Record>,
}

/// A dataset after header location, materialization and column selection.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub role: Role,
    pub dataset: Dataset,
    pub columns: ColumnRoles,
    /// True when the header row came from config rather than inference.
    pub header_forced: bool,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Amounts seen for one identifier, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateEntry {
    pub amounts: Vec<f64>,
    pub total: f64,
}

/// Identifier → summed source amount.
#[derive(Debug, Clone, Default)]
pub struct AggregateTable {
    pub(crate) groups: BTreeMap<CellKey, AggregateEntry>,
}

impl AggregateTable {
    pub fn get(&self, key: &CellKey) -> Option<&AggregateEntry> {
        self.groups.get(key)
    }

    pub fn total(&self, key: &CellKey) -> Option<f64> {
        self.groups.get(key).map(|e| e.total)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &AggregateEntry)> {
        self.groups.iter()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    /// Target records whose identifier is in the source identifier set.
    pub matched: Vec<Record>,
    /// Every other target record, untouched.
    pub unmatched: Vec<Record>,
    /// Matched records that received the remit / rejected fields.
    pub enriched: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub source_records: usize,
    pub target_records: usize,
    pub distinct_source_ids: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub enriched: usize,
    pub total_remit: f64,
    pub total_rejected: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    pub engine_version: String,
    /// RFC 3339 time of the run, stamped by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
}

/// Serializable description of one prepared dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub role: Role,
    pub header_row: usize,
    pub header_forced: bool,
    pub columns: ColumnRoles,
    pub records: usize,
}

impl From<&PreparedDataset> for DatasetReport {
    fn from(p: &PreparedDataset) -> Self {
        Self {
            role: p.role,
            header_row: p.dataset.header_row,
            header_forced: p.header_forced,
            columns: p.columns.clone(),
            records: p.dataset.records.len(),
        }
    }
}

/// JSON-facing run report (no record payloads).
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub source: DatasetReport,
    pub target: DatasetReport,
    pub summary: ReconSummary,
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct ReconOutput {
    pub meta: ReconMeta,
    pub source: PreparedDataset,
    pub target: PreparedDataset,
    pub aggregates: AggregateTable,
    pub result: ReconciliationResult,
    pub summary: ReconSummary,
}

impl ReconOutput {
    pub fn report(&self) -> ReconReport {
        ReconReport {
            meta: self.meta.clone(),
            source: DatasetReport::from(&self.source),
            target: DatasetReport::from(&self.target),
            summary: self.summary.clone(),
        }
    }
}
