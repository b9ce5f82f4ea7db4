//! `remitmatch-recon`: remittance reconciliation engine.
//!
//! Pure engine crate: receives decoded grids, returns matched / unmatched
//! records. No CLI or IO dependencies.

pub mod aggregate;
pub mod amount;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod header;
pub mod materialize;
pub mod model;
pub mod observer;
pub mod reconcile;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{ReconOutput, ReconciliationResult, Role};
pub use observer::{EventLog, LogObserver, NoopObserver, ReconEvent, ReconObserver};
