pub mod error;
pub mod field;
pub mod value;

// Common type aliases
pub type RowId = usize;
pub type FieldIndex = usize;
