use crate::model::{ColumnRoles, Role};

/// Identifier column assumed for targets when no header label qualifies.
///
/// It may not exist in the data; lookups then resolve to a missing key.
pub const TARGET_ID_FALLBACK: &str = "Claim ID";

/// Select the identifier (and, for sources, amount) column from header labels.
pub fn identify(labels: &[String], role: Role) -> ColumnRoles {
    match role {
        Role::Source => ColumnRoles {
            id_field: source_id_field(labels),
            amt_field: amount_field(labels),
        },
        Role::Target => ColumnRoles {
            id_field: target_id_field(labels),
            amt_field: None,
        },
    }
}

fn amount_field(labels: &[String]) -> Option<String> {
    labels
        .iter()
        .find(|l| {
            let lower = l.to_lowercase();
            lower == "amt" || lower == "amount" || lower.contains("amount")
        })
        .cloned()
}

fn source_id_field(labels: &[String]) -> String {
    labels
        .iter()
        .find(|l| {
            let lower = l.to_lowercase();
            lower == "id" || lower == "billno"
        })
        .or_else(|| labels.first())
        .cloned()
        .unwrap_or_default()
}

fn target_id_field(labels: &[String]) -> String {
    labels
        .iter()
        .find(|l| {
            let lower = l.to_lowercase();
            lower.contains("claim") || lower == "id"
        })
        .cloned()
        .unwrap_or_else(|| TARGET_ID_FALLBACK.to_string())
}
