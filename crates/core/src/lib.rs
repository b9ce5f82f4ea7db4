//! `remitmatch-core`: the grid model shared by decoding, matching and encoding.
//!
//! A [`Grid`] is what a decoder hands over; a [`Record`] is one labelled row
//! materialized below the header. Neither knows anything about reconciliation.

pub mod cell;
pub mod grid;
pub mod record;

pub use cell::{Cell, CellKey};
pub use grid::Grid;
pub use record::Record;
