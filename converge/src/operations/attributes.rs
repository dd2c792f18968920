use std::{borrow::Cow, collections::BTreeMap, fmt::Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Formatting attributes carried by a `Format` operation. Keys are ordered so
/// that equal maps always serialise identically. A `None` value is a
/// tombstone: the key is cleared rather than set.
pub type Attributes = BTreeMap<String, Option<AttributeValue>>;

/// The value types accepted for a formatting attribute. Anything else (floats,
/// lists, nested objects) is rejected when an operation is deserialised.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self { AttributeValue::Bool(value) }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self { AttributeValue::Number(value) }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self { AttributeValue::Text(value) }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self { AttributeValue::Text(value.to_owned()) }
}

impl<'a> From<Cow<'a, str>> for AttributeValue {
    fn from(value: Cow<'a, str>) -> Self { AttributeValue::Text(value.into_owned()) }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => write!(f, "'{value}'"),
        }
    }
}

/// Returns a map with the same keys as `attributes` where every key is
/// cleared.
#[must_use]
pub fn cleared(attributes: &Attributes) -> Attributes {
    attributes.keys().map(|key| (key.clone(), None)).collect()
}
