//! Operational transformation for plain-text documents edited by several
//! people at once.
//!
//! Concurrent edits generated against the same document are reconciled with
//! [`transform`] so that applying them in either order yields the same text:
//!
//! ```
//! use converge::{Operation, Side, apply_sequence, transform};
//!
//! let left = Operation::insert(1, "B");
//! let right = Operation::insert(1, "X");
//! let result = transform(&left, &right, Side::Left);
//!
//! let left_first = apply_sequence("AC", [&left].into_iter().chain(&result.right)).unwrap();
//! let right_first = apply_sequence("AC", [&right].into_iter().chain(&result.left)).unwrap();
//!
//! assert_eq!(left_first, "ABXC");
//! assert_eq!(left_first, right_first);
//! ```

mod compose;
mod document;
mod errors;
mod operations;
mod position;
mod transform;
mod utils;

pub use compose::{compose, invert, invert_sequence, try_compose};
pub use document::{apply, apply_sequence};
pub use errors::{ApplyError, OperationError, SequenceApplyError};
pub use operations::{
    AttributeValue, Attributes, Operation, OperationKind, OperationPayload, OperationSequence,
    OperationStatus, cleared,
};
pub use position::{
    CursorPosition, transform_cursors, transform_position, transform_position_through,
    transform_range,
};
pub use transform::{TransformResult, transform, transform_sequences};
pub use utils::{char_offset::char_count, side::Side};
