use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AddressFields, NameVariants};

/// Top-level keys owned by the document structure itself. Attributes and tags
/// with these names never overwrite them.
pub const RESERVED_KEYS: [&str; 6] = ["type", "pos", "created", "node_refs", "name", "address"];

/// Cleaned element, ready to be exported as JSON or inserted into a document store.

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CanonicalDocument {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f64; 2]>,

    pub created: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_refs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameVariants>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Plain attributes (`id`, `visible`, ...), valid postal codes and pass-through tags.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl CanonicalDocument {
    pub fn new(kind: &str) -> CanonicalDocument {
        CanonicalDocument {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    /// Sets a top-level field unless the key belongs to the document structure.
    /// Returns whether the value was stored.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        if RESERVED_KEYS.contains(&key) {
            return false;
        }
        self.fields.insert(key.to_string(), value.to_string());
        true
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|value| value.as_str())
    }

    /// The resolved display name, if the element had any name tags.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_ref()?.get("name").map(|name| name.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<StreetValue>,

    #[serde(flatten)]
    pub fields: AddressFields,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct StreetValue {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zh: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,

    /// Any other `addr:street:<variant>` values, keyed by variant.
    #[serde(flatten)]
    pub variants: BTreeMap<String, String>,
}
