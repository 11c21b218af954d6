use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{Draft, FieldClass, FieldSpec, FieldValue};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const NUMERIC_MESSAGE: &str = "Please enter a valid number";
pub const ALPHABETIC_MESSAGE: &str = "Only letters and spaces are allowed";

// Optional decimal number; partial input such as "12." is allowed
static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]*\.?[0-9]*$").expect("numeric pattern"));
static ALPHABETIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z ]*$").expect("alphabetic pattern"));

/// Input-shape filter: may `value` enter a field of this class at all?
pub fn accepts_input(class: FieldClass, value: &str) -> bool {
    match class {
        FieldClass::Numeric => NUMERIC.is_match(value),
        FieldClass::Alphabetic => ALPHABETIC.is_match(value),
        FieldClass::Required | FieldClass::FreeText => true,
    }
}

/// Error for a single field, or `None` when it is valid.
pub fn validate_field(spec: &FieldSpec, value: Option<&FieldValue>) -> Option<String> {
    let text = value.map(FieldValue::as_text).unwrap_or("");

    match spec.class {
        FieldClass::Required if text.trim().is_empty() => Some(REQUIRED_MESSAGE.to_string()),
        FieldClass::Numeric if !NUMERIC.is_match(text) => Some(NUMERIC_MESSAGE.to_string()),
        FieldClass::Alphabetic if !ALPHABETIC.is_match(text) => Some(ALPHABETIC_MESSAGE.to_string()),
        _ => None,
    }
}

/// Validate every declared field of `table` against `draft`.
pub fn validate(draft: &Draft, table: &[FieldSpec]) -> ErrorMap {
    let mut errors = ErrorMap::default();
    for spec in table {
        errors.set(spec.name, validate_field(spec, draft.get(spec.name)));
    }
    errors
}

/// Field name to error message, `None` meaning the field is currently valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, Option<String>>);

impl ErrorMap {
    pub fn set(&mut self, field: &str, error: Option<String>) {
        self.0.insert(field.to_string(), error);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|e| e.as_deref())
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(Option::is_some)
    }

    /// Fields currently in error, in name order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(field, error)| error.as_deref().map(|e| (field.as_str(), e)))
    }

    /// Failing fields only, shaped for an HTTP `field_errors` body.
    pub fn field_errors(&self) -> HashMap<String, String> {
        self.failures()
            .map(|(field, error)| (field.to_string(), error.to_string()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, ReferenceItem};
    use serde_json::json;

    #[test]
    fn numeric_filter_accepts_partial_decimals_only() {
        for ok in ["", "1", "12.", ".5", "3.14"] {
            assert!(accepts_input(FieldClass::Numeric, ok), "{ok:?} should pass");
        }
        for bad in ["a", "1a", "1.2.3", "-1", "1 ", "1,5", "\u{0661}\u{0662}", "\u{FF11}\u{FF12}"] {
            assert!(!accepts_input(FieldClass::Numeric, bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn alphabetic_filter_accepts_letters_and_spaces_only() {
        assert!(accepts_input(FieldClass::Alphabetic, "San Antonio"));
        assert!(accepts_input(FieldClass::Alphabetic, ""));
        assert!(!accepts_input(FieldClass::Alphabetic, "Area 51"));
        assert!(!accepts_input(FieldClass::Alphabetic, "O'Hare"));
        assert!(!accepts_input(FieldClass::Alphabetic, "tab\there"));
    }

    #[test]
    fn required_rejects_whitespace_only() {
        let spec = EntityKind::Company.field("companyName").unwrap();
        assert_eq!(
            validate_field(spec, Some(&FieldValue::Text("   ".into()))).as_deref(),
            Some(REQUIRED_MESSAGE)
        );
        assert_eq!(validate_field(spec, None).as_deref(), Some(REQUIRED_MESSAGE));
        assert!(validate_field(spec, Some(&FieldValue::Text("Acme".into()))).is_none());
    }

    #[test]
    fn resolved_reference_validates_by_label() {
        let spec = EntityKind::Company.field("companyState").unwrap();
        let value = FieldValue::Reference(ReferenceItem::new(1, "Texas"));
        assert!(validate_field(spec, Some(&value)).is_none());
    }

    #[test]
    fn validate_reports_every_failure_at_once() {
        let draft = Draft::from_json(
            EntityKind::Company,
            &json!({"companyName": "", "companyEmail": "a@b.c", "companyZip": "12a", "companyCity": "X1"}),
        )
        .unwrap();

        let errors = validate(&draft, EntityKind::Company.fields());
        assert!(errors.has_errors());
        assert_eq!(errors.get("companyName"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("companyState"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("companyZip"), Some(NUMERIC_MESSAGE));
        assert_eq!(errors.get("companyCity"), Some(ALPHABETIC_MESSAGE));
        assert_eq!(errors.get("companyEmail"), None);
        assert_eq!(errors.field_errors().len(), 4);
    }
}
