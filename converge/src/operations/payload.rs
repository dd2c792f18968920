#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Attributes, Operation, OperationKind};
use crate::errors::OperationError;

/// The wire form of an operation as submitted by a client. Every field apart
/// from `kind` and `position` is optional here; which ones must be present is
/// decided by the kind when converting into an `Operation`:
///
/// | kind   | required                        | forbidden             |
/// |--------|---------------------------------|-----------------------|
/// | insert | content                         | length, attributes    |
/// | delete | length                          | content, attributes   |
/// | retain | (length defaults to 0)          | content, attributes   |
/// | format | length, attributes              | content               |
///
/// `author` and `client_id` are provenance and never validated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPayload {
    pub kind: OperationKind,
    pub position: usize,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub length: Option<usize>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub content: Option<String>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub attributes: Option<Attributes>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub author: Option<String>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub client_id: Option<String>,
}

impl OperationPayload {
    #[must_use]
    pub fn new(kind: OperationKind, position: usize) -> Self {
        Self {
            kind,
            position,
            length: None,
            content: None,
            attributes: None,
            author: None,
            client_id: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>, client_id: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self.client_id = Some(client_id.into());
        self
    }

    /// Checks the payload against the field requirements of its kind without
    /// consuming it.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Malformed` describing the first offending
    /// field.
    pub fn validate(&self) -> Result<(), OperationError> { Operation::try_from(self).map(|_| ()) }

    fn require<'a, T>(&self, field: &str, value: Option<&'a T>) -> Result<&'a T, OperationError> {
        value.ok_or_else(|| {
            OperationError::malformed(self.kind, format!("missing required field `{field}`"))
        })
    }

    /// Rejects ranges whose end doesn't fit in a `usize`.
    fn ranged(&self, length: usize) -> Result<usize, OperationError> {
        match self.position.checked_add(length) {
            Some(_) => Ok(length),
            None => Err(OperationError::malformed(
                self.kind,
                "`position + length` overflows",
            )),
        }
    }

    fn forbid<T>(&self, field: &str, value: Option<&T>) -> Result<(), OperationError> {
        match value {
            Some(_) => Err(OperationError::malformed(
                self.kind,
                format!("field `{field}` is not allowed"),
            )),
            None => Ok(()),
        }
    }
}

impl TryFrom<&OperationPayload> for Operation {
    type Error = OperationError;

    fn try_from(payload: &OperationPayload) -> Result<Self, Self::Error> {
        let position = payload.position;

        match payload.kind {
            OperationKind::Insert => {
                payload.forbid("length", payload.length.as_ref())?;
                payload.forbid("attributes", payload.attributes.as_ref())?;
                let content = payload.require("content", payload.content.as_ref())?;

                if content.is_empty() {
                    return Err(OperationError::malformed(
                        payload.kind,
                        "field `content` must not be empty",
                    ));
                }

                Ok(Operation::insert(position, content.clone()))
            }
            OperationKind::Delete => {
                payload.forbid("content", payload.content.as_ref())?;
                payload.forbid("attributes", payload.attributes.as_ref())?;
                let length = payload.ranged(*payload.require("length", payload.length.as_ref())?)?;

                Ok(Operation::delete(position, length))
            }
            OperationKind::Retain => {
                payload.forbid("content", payload.content.as_ref())?;
                payload.forbid("attributes", payload.attributes.as_ref())?;

                let length = payload.ranged(payload.length.unwrap_or_default())?;

                Ok(Operation::retain(position, length))
            }
            OperationKind::Format => {
                payload.forbid("content", payload.content.as_ref())?;
                let length = payload.ranged(*payload.require("length", payload.length.as_ref())?)?;
                let attributes = payload.require("attributes", payload.attributes.as_ref())?;

                if attributes.is_empty() {
                    return Err(OperationError::malformed(
                        payload.kind,
                        "field `attributes` must not be empty",
                    ));
                }

                Ok(Operation::format(position, length, attributes.clone()))
            }
        }
    }
}

impl TryFrom<OperationPayload> for Operation {
    type Error = OperationError;

    fn try_from(payload: OperationPayload) -> Result<Self, Self::Error> { Operation::try_from(&payload) }
}

impl From<&Operation> for OperationPayload {
    fn from(operation: &Operation) -> Self {
        let payload = OperationPayload::new(operation.kind(), operation.position());

        match operation {
            Operation::Insert { content, .. } => payload.with_content(content.clone()),
            Operation::Delete { length, .. } | Operation::Retain { length, .. } => {
                payload.with_length(*length)
            }
            Operation::Format {
                length, attributes, ..
            } => payload
                .with_length(*length)
                .with_attributes(attributes.clone()),
        }
    }
}
