use crate::cell::Cell;

static EMPTY: Cell = Cell::Empty;

/// Rectangular view over decoded rows.
///
/// Rows may be ragged; any position past the end of a row reads as
/// [`Cell::Empty`]. A grid is never mutated after the decoder builds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The row's own cells, without padding.
    pub fn row(&self, index: usize) -> &[Cell] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Padding-aware cell access.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    pub fn non_empty_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| !c.is_blank()).count()
    }
}

impl From<Vec<Vec<Cell>>> for Grid {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Self::new(rows)
    }
}
