use serde::{Deserialize, Serialize};

use super::FieldValue;

/// One selectable entry of a reference list, e.g. a geographic state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: i64,
    #[serde(rename = "stateName", alias = "label")]
    pub label: String,
}

impl ReferenceItem {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self { id, label: label.into() }
    }
}

/// Does `value` designate `item`?
///
/// A draft may hold either a server-assigned id or a previously stored label,
/// so both are tried: the value read as a number against `id`, then the value
/// as-is against `label`.
pub fn matches(value: &FieldValue, item: &ReferenceItem) -> bool {
    match value {
        FieldValue::Reference(current) => current.id == item.id || current.label == item.label,
        FieldValue::Text(text) => numeric_id(text) == Some(item.id) || *text == item.label,
    }
}

/// First item matched by `value`, if any.
pub fn resolve_reference(value: &FieldValue, items: &[ReferenceItem]) -> Option<ReferenceItem> {
    items.iter().find(|item| matches(value, item)).cloned()
}

fn numeric_id(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let number: f64 = trimmed.parse().ok()?;
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(number as i64)
    } else {
        None
    }
}
