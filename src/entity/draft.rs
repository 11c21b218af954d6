use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EntityError, EntityKind, ReferenceItem};

/// Value held by a draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Resolved reference, kept as the object so the label can be shown and
    /// later extracted on submit.
    Reference(ReferenceItem),
    Text(String),
}

impl FieldValue {
    /// Text the field shows and validates against.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Reference(item) => &item.label,
            FieldValue::Text(text) => text,
        }
    }

    /// Outbound form: references collapse to their label.
    pub fn flatten(&self) -> Value {
        Value::String(self.as_text().to_string())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FieldValue::Reference(_))
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// In-memory, pre-submission copy of an entity.
///
/// Holds exactly the kind's declared fields, the identifier (never editable)
/// and any other keys the server sent, which are passed back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    kind: EntityKind,
    id: Option<Value>,
    fields: BTreeMap<&'static str, FieldValue>,
    passthrough: Map<String, Value>,
}

impl Draft {
    /// Blank draft for an "add" dialog.
    pub fn empty(kind: EntityKind) -> Self {
        let fields = kind
            .fields()
            .iter()
            .map(|spec| (spec.name, FieldValue::default()))
            .collect();

        Self {
            kind,
            id: None,
            fields,
            passthrough: Map::new(),
        }
    }

    /// Draft pre-filled from a server entity.
    pub fn from_json(kind: EntityKind, entity: &Value) -> Result<Self, EntityError> {
        let object = entity.as_object().ok_or(EntityError::NotAnObject)?;
        let mut draft = Self::empty(kind);

        for (key, value) in object {
            if key == kind.id_field() {
                if !value.is_null() {
                    draft.id = Some(value.clone());
                }
                continue;
            }

            match kind.field(key) {
                Some(spec) => {
                    let field_value = field_value_from_json(value)
                        .ok_or_else(|| EntityError::InvalidFieldValue { field: key.clone() })?;
                    draft.fields.insert(spec.name, field_value);
                }
                None => {
                    draft.passthrough.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(draft)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Identifier rendered for a URL path segment.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Replace a declared field's value. Unknown names are ignored.
    pub(crate) fn set(&mut self, field: &str, value: FieldValue) -> bool {
        match self.kind.field(field) {
            Some(spec) => {
                self.fields.insert(spec.name, value);
                true
            }
            None => false,
        }
    }

    /// Value of the kind's reference field, if it has one.
    pub fn reference_value(&self) -> Option<&FieldValue> {
        let spec = self.kind.reference_field()?;
        self.fields.get(spec.name)
    }

    /// Normalized outbound payload: references flattened to their label.
    pub fn to_payload(&self) -> Value {
        let mut payload = self.passthrough.clone();
        if let Some(id) = &self.id {
            payload.insert(self.kind.id_field().to_string(), id.clone());
        }
        for (name, value) in &self.fields {
            payload.insert(name.to_string(), value.flatten());
        }
        Value::Object(payload)
    }
}

fn field_value_from_json(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => Some(FieldValue::default()),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => Some(FieldValue::Text(n.to_string())),
        Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
        Value::Object(_) => serde_json::from_value::<ReferenceItem>(value.clone())
            .ok()
            .map(FieldValue::Reference),
        Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_splits_identifier_fields_and_passthrough() {
        let draft = Draft::from_json(
            EntityKind::Company,
            &json!({
                "companyId": 7,
                "companyName": "Acme",
                "companyZip": 73301,
                "companyState": {"id": 1, "stateName": "Texas"},
                "createdAt": "2024-01-01"
            }),
        )
        .unwrap();

        assert_eq!(draft.id_string().as_deref(), Some("7"));
        assert_eq!(draft.get("companyName"), Some(&FieldValue::Text("Acme".into())));
        assert_eq!(draft.get("companyZip"), Some(&FieldValue::Text("73301".into())));
        assert!(draft.reference_value().unwrap().is_resolved());
        // Declared but absent fields start empty
        assert_eq!(draft.get("companyCity"), Some(&FieldValue::default()));
    }

    #[test]
    fn payload_flattens_reference_and_keeps_passthrough() {
        let mut draft = Draft::from_json(
            EntityKind::Company,
            &json!({"companyId": "c-1", "createdAt": "2024-01-01"}),
        )
        .unwrap();
        draft.set("companyState", FieldValue::Reference(ReferenceItem::new(1, "Texas")));

        let payload = draft.to_payload();
        assert_eq!(payload["companyState"], json!("Texas"));
        assert_eq!(payload["companyId"], json!("c-1"));
        assert_eq!(payload["createdAt"], json!("2024-01-01"));
    }

    #[test]
    fn rejects_non_object_and_array_fields() {
        assert!(matches!(
            Draft::from_json(EntityKind::Product, &json!([1, 2])),
            Err(EntityError::NotAnObject)
        ));
        assert!(matches!(
            Draft::from_json(EntityKind::Product, &json!({"productName": ["a"]})),
            Err(EntityError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn set_ignores_undeclared_fields() {
        let mut draft = Draft::empty(EntityKind::Product);
        assert!(!draft.set("productId", FieldValue::Text("9".into())));
        assert!(draft.id().is_none());
    }
}
