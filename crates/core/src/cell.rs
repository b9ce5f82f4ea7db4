use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

/// A single decoded cell value.
///
/// The variant is fixed by the decoder and never re-typed afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Empty, or text that is nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringified form used for labels, uniqueness checks and CSV output.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Cell::DateTime(dt) => format_datetime(dt),
        }
    }

    /// Type-sensitive identity of this cell. An empty cell keys the same as
    /// an absent field.
    pub fn key(&self) -> CellKey {
        match self {
            Cell::Empty => CellKey::Missing,
            Cell::Number(n) => CellKey::Number(OrderedFloat(*n)),
            Cell::Text(s) => CellKey::Text(s.clone()),
            Cell::Bool(b) => CellKey::Bool(*b),
            Cell::DateTime(dt) => CellKey::DateTime(*dt),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_unit(),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::DateTime(dt) => serializer.serialize_str(&format_datetime(dt)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Hashable identity of a field value, used as a join / grouping key.
///
/// Keys never coerce across types: `Number(7)` and `Text("7")` differ.
/// `Missing` is the key of a field that holds no value: either the label is
/// absent from the record or its cell is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Missing,
    Number(OrderedFloat<f64>),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellKey {
    /// Key of an optional field lookup.
    pub fn of(cell: Option<&Cell>) -> Self {
        cell.map(Cell::key).unwrap_or(CellKey::Missing)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "<missing>"),
            Self::Number(n) => write!(f, "{}", format_number(n.0)),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::DateTime(dt) => write!(f, "{}", format_datetime(dt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn display_formats_integral_numbers_without_decimals() {
        assert_eq!(Cell::Number(2024.0).display(), "2024");
        assert_eq!(Cell::Number(10.5).display(), "10.5");
        assert_eq!(Cell::Bool(true).display(), "TRUE");
        assert_eq!(Cell::Empty.display(), "");
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(Cell::text("  ").is_blank());
        assert!(Cell::Empty.is_blank());
        assert!(!Cell::text(" x ").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn display_drops_midnight_time() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(Cell::DateTime(d.and_hms_opt(0, 0, 0).unwrap()).display(), "2026-03-01");
        assert_eq!(
            Cell::DateTime(d.and_hms_opt(9, 30, 0).unwrap()).display(),
            "2026-03-01 09:30:00"
        );
    }

    #[test]
    fn keys_are_type_sensitive() {
        assert_ne!(Cell::Number(7.0).key(), Cell::text("7").key());
        assert_eq!(Cell::Number(7.0).key(), Cell::Number(7.0).key());
        assert_eq!(CellKey::of(None), CellKey::Missing);
        assert_ne!(CellKey::of(Some(&Cell::text(" "))), CellKey::Missing);
    }

    #[test]
    fn empty_cell_keys_as_absent_field() {
        assert_eq!(CellKey::of(Some(&Cell::Empty)), CellKey::of(None));
        assert_eq!(CellKey::Missing.to_string(), "<missing>");
    }

    #[test]
    fn serializes_as_plain_json_scalars() {
        let cells = vec![Cell::Empty, Cell::Number(1.5), Cell::text("x"), Cell::Bool(false)];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,1.5,"x",false]"#);
    }
}
