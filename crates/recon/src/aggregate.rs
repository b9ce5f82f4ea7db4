use std::collections::BTreeMap;

use remitmatch_core::{CellKey, Record};

use crate::amount::parse_amount;
use crate::model::{AggregateEntry, AggregateTable};

/// Group source records by identifier and sum their amounts.
///
/// The identifier is used as-is (no coercion between numbers and text). With
/// no amount column every amount is 0, so each identifier still appears.
pub fn aggregate(records: &[Record], id_field: &str, amt_field: Option<&str>) -> AggregateTable {
    let mut groups: BTreeMap<CellKey, AggregateEntry> = BTreeMap::new();

    for record in records {
        let key = CellKey::of(record.get(id_field));
        let amount = amt_field.map_or(0.0, |f| parse_amount(record.get(f)));
        let entry = groups.entry(key).or_default();
        entry.amounts.push(amount);
        entry.total += amount;
    }

    AggregateTable { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitmatch_core::Cell;

    fn rec(id: impl Into<Cell>, amt: impl Into<Cell>) -> Record {
        let (id, amt): (Cell, Cell) = (id.into(), amt.into());
        Record::from_pairs([("ID", id), ("Amt", amt)])
    }

    fn text_key(s: &str) -> CellKey {
        CellKey::Text(s.into())
    }

    #[test]
    fn sums_mixed_representations() {
        let rows = vec![rec("A", 10.0), rec("A", 20.5), rec("A", "30.25 USD")];
        let table = aggregate(&rows, "ID", Some("Amt"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.total(&text_key("A")), Some(60.75));
    }

    #[test]
    fn keeps_encounter_order_per_identifier() {
        let rows = vec![rec("B", 3.0), rec("A", 1.0), rec("B", "4"), rec("B", true)];
        let table = aggregate(&rows, "ID", Some("Amt"));
        let b = table.get(&text_key("B")).unwrap();
        assert_eq!(b.amounts, vec![3.0, 4.0, 0.0]);
        assert_eq!(b.total, 7.0);
        assert_eq!(table.total(&text_key("A")), Some(1.0));
    }

    #[test]
    fn identifiers_are_not_coerced() {
        let rows = vec![rec(7.0, 1.0), rec("7", 2.0)];
        let table = aggregate(&rows, "ID", Some("Amt"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(&Cell::Number(7.0).key()), Some(1.0));
        assert_eq!(table.total(&text_key("7")), Some(2.0));
    }

    #[test]
    fn missing_amount_field_sums_to_zero() {
        let rows = vec![rec("A", 10.0), rec("A", 5.0)];
        let table = aggregate(&rows, "ID", None);
        let a = table.get(&text_key("A")).unwrap();
        assert_eq!(a.amounts, vec![0.0, 0.0]);
        assert_eq!(a.total, 0.0);
    }

    #[test]
    fn absent_identifier_groups_under_missing() {
        let rows = vec![rec("A", 10.0)];
        let table = aggregate(&rows, "Bill", Some("Amt"));
        assert_eq!(table.total(&CellKey::Missing), Some(10.0));
    }

    #[test]
    fn blank_identifier_groups_with_absent_ones() {
        let mut no_id = Record::new();
        no_id.set("Amt", Cell::Number(2.0));
        let rows = vec![rec(Cell::Empty, 3.0), no_id];
        let table = aggregate(&rows, "ID", Some("Amt"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.total(&CellKey::Missing), Some(5.0));
    }
}
