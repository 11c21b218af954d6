// Entity kinds edited through the console dialogs and the field-descriptor
// tables that drive both the input filter and the validator.

pub mod draft;
pub mod reference;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use draft::{Draft, FieldValue};
pub use reference::{resolve_reference, ReferenceItem};
pub use validate::{accepts_input, validate, validate_field, ErrorMap};

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Entity payload must be a JSON object")]
    NotAnObject,

    #[error("Field '{field}' has an unsupported value")]
    InvalidFieldValue { field: String },
}

/// Validation class of a draft field. Every field has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    Required,
    Numeric,
    Alphabetic,
    FreeText,
}

/// Server-fetched lists a draft field can be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    States,
}

impl ReferenceKind {
    /// Remote collection path segment.
    pub fn path(&self) -> &'static str {
        match self {
            ReferenceKind::States => "states",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub class: FieldClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceKind>,
}

const fn field(name: &'static str, class: FieldClass) -> FieldSpec {
    FieldSpec { name, class, reference: None }
}

const fn reference_field(name: &'static str, class: FieldClass, kind: ReferenceKind) -> FieldSpec {
    FieldSpec { name, class, reference: Some(kind) }
}

const COMPANY_FIELDS: &[FieldSpec] = &[
    field("companyName", FieldClass::Required),
    field("companyEmail", FieldClass::Required),
    field("companyPhone", FieldClass::Numeric),
    field("companyAddress", FieldClass::FreeText),
    field("companyCity", FieldClass::Alphabetic),
    reference_field("companyState", FieldClass::Required, ReferenceKind::States),
    field("companyZip", FieldClass::Numeric),
];

const LOCATION_FIELDS: &[FieldSpec] = &[
    field("locationName", FieldClass::Required),
    field("locationAddress", FieldClass::Required),
    field("locationPhone", FieldClass::Numeric),
    field("locationCity", FieldClass::Alphabetic),
    reference_field("locationState", FieldClass::Required, ReferenceKind::States),
    field("locationZip", FieldClass::Numeric),
];

const GATEWAY_FIELDS: &[FieldSpec] = &[
    field("gatewayName", FieldClass::Required),
    field("serialNumber", FieldClass::Required),
    field("macAddress", FieldClass::FreeText),
    field("gatewayCity", FieldClass::Alphabetic),
    reference_field("gatewayState", FieldClass::Required, ReferenceKind::States),
    field("gatewayZip", FieldClass::Numeric),
];

const PRODUCT_FIELDS: &[FieldSpec] = &[
    field("productName", FieldClass::Required),
    field("productPrice", FieldClass::Numeric),
    field("productQuantity", FieldClass::Numeric),
    field("productCategory", FieldClass::Alphabetic),
    field("productDescription", FieldClass::FreeText),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Company,
    Location,
    Gateway,
    Product,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Company,
        EntityKind::Location,
        EntityKind::Gateway,
        EntityKind::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Location => "location",
            EntityKind::Gateway => "gateway",
            EntityKind::Product => "product",
        }
    }

    /// Editable fields, in display order. The identifier is not among them.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Company => COMPANY_FIELDS,
            EntityKind::Location => LOCATION_FIELDS,
            EntityKind::Gateway => GATEWAY_FIELDS,
            EntityKind::Product => PRODUCT_FIELDS,
        }
    }

    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Company => "companyId",
            EntityKind::Location => "locationId",
            EntityKind::Gateway => "gatewayId",
            EntityKind::Product => "productId",
        }
    }

    /// Remote collection path segment.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::Location => "locations",
            EntityKind::Gateway => "gateways",
            EntityKind::Product => "products",
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    /// The field resolved against a reference list, if this kind has one.
    pub fn reference_field(&self) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.reference.is_some())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted || kind.collection() == wanted)
            .ok_or_else(|| EntityError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_names_are_unique_and_exclude_identifier() {
        for kind in EntityKind::ALL {
            let names: HashSet<_> = kind.fields().iter().map(|f| f.name).collect();
            assert_eq!(names.len(), kind.fields().len(), "duplicate field in {}", kind);
            assert!(!names.contains(kind.id_field()));
        }
    }

    #[test]
    fn at_most_one_reference_field_per_kind() {
        for kind in EntityKind::ALL {
            let count = kind.fields().iter().filter(|f| f.reference.is_some()).count();
            assert!(count <= 1);
        }
        assert_eq!(EntityKind::Company.reference_field().map(|f| f.name), Some("companyState"));
        assert!(EntityKind::Product.reference_field().is_none());
    }

    #[test]
    fn kind_parses_from_singular_or_collection_name() {
        assert_eq!("Company".parse::<EntityKind>().unwrap(), EntityKind::Company);
        assert_eq!("gateways".parse::<EntityKind>().unwrap(), EntityKind::Gateway);
        assert!("store".parse::<EntityKind>().is_err());
    }
}
