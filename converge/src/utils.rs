pub mod char_offset;
pub mod side;
