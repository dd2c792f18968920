mod attributes;
mod kind;
mod operation;
mod operation_sequence;
mod payload;
mod status;

pub use attributes::{AttributeValue, Attributes, cleared};
pub use kind::OperationKind;
pub use operation::Operation;
pub use operation_sequence::OperationSequence;
pub use payload::OperationPayload;
pub use status::OperationStatus;
