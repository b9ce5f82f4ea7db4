use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::cell::Cell;

/// One labelled row: an explicit ordered list of `(label, value)` pairs.
///
/// Labels are unique within a record. Field order is significant (encoders
/// render fields as columns in this order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, applying [`Record::set`] to each in turn.
    pub fn from_pairs<L, V, I>(pairs: I) -> Self
    where
        L: Into<String>,
        V: Into<Cell>,
        I: IntoIterator<Item = (L, V)>,
    {
        let mut record = Self::new();
        for (label, value) in pairs {
            record.set(label, value);
        }
        record
    }

    /// Last write wins: an existing label keeps its position, new labels append.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<Cell>) {
        let label = label.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((label, value)),
        }
    }

    /// Case-sensitive lookup.
    pub fn get(&self, label: &str) -> Option<&Cell> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn position(&self, mut pred: impl FnMut(&str) -> bool) -> Option<usize> {
        self.fields.iter().position(|(l, _)| pred(l))
    }

    /// Splice `new_fields` in directly after position `pos`.
    ///
    /// Existing fields sharing a label with any new field are removed first,
    /// so the spliced fields always land exactly after the anchor field. This
    /// changes the column layout: a same-named field that sat elsewhere (even
    /// before the anchor) moves to the splice point and takes the new value.
    /// A `pos` past the end appends.
    pub fn insert_after(&mut self, pos: usize, new_fields: Vec<(String, Cell)>) {
        let anchor = self.fields.get(pos).map(|(l, _)| l.clone());
        self.fields
            .retain(|(l, _)| !new_fields.iter().any(|(n, _)| n == l) || Some(l) == anchor.as_ref());

        let at = anchor
            .and_then(|a| self.fields.iter().position(|(l, _)| *l == a))
            .map(|i| i + 1)
            .unwrap_or(self.fields.len());
        // Anchor itself may share a label with a new field; it stays and the
        // duplicate is dropped from the splice.
        let splice: Vec<_> = new_fields
            .into_iter()
            .filter(|(n, _)| self.fields.iter().all(|(l, _)| l != n))
            .collect();
        self.fields.splice(at..at, splice);
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(r: &Record) -> Vec<&str> {
        r.labels().collect()
    }

    #[test]
    fn set_is_last_write_wins_in_place() {
        let mut r = Record::from_pairs([("Id", Cell::text("A")), ("Amt", Cell::Number(1.0))]);
        r.set("Id", "B");
        assert_eq!(labels(&r), vec!["Id", "Amt"]);
        assert_eq!(r.get("Id"), Some(&Cell::text("B")));
    }

    #[test]
    fn get_is_case_sensitive() {
        let r = Record::from_pairs([("AMT", 5.0)]);
        assert!(r.get("Amt").is_none());
        assert_eq!(r.get("AMT"), Some(&Cell::Number(5.0)));
    }

    #[test]
    fn insert_after_splices_in_order() {
        let mut r = Record::from_pairs([("Id", "A"), ("Amt", "100"), ("Note", "x")]);
        r.insert_after(
            1,
            vec![("Remit".into(), Cell::Number(1.0)), ("Rejected".into(), Cell::Number(2.0))],
        );
        assert_eq!(labels(&r), vec!["Id", "Amt", "Remit", "Rejected", "Note"]);
    }

    #[test]
    fn insert_after_replaces_existing_labels() {
        let mut r = Record::from_pairs([("Remit", "old"), ("Amt", "100"), ("Note", "x")]);
        r.insert_after(1, vec![("Remit".into(), Cell::Number(1.0))]);
        assert_eq!(labels(&r), vec!["Amt", "Remit", "Note"]);
        assert_eq!(r.get("Remit"), Some(&Cell::Number(1.0)));
    }

    #[test]
    fn insert_after_past_end_appends() {
        let mut r = Record::from_pairs([("Id", "A")]);
        r.insert_after(7, vec![("X".into(), Cell::Bool(true))]);
        assert_eq!(labels(&r), vec!["Id", "X"]);
    }

    #[test]
    fn serializes_in_field_order() {
        let r = Record::from_pairs([("b", Cell::Number(1.0)), ("a", Cell::Empty)]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"b":1.0,"a":null}"#);
    }
}
