use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Fields can be added only after creating the file and before adding any records")]
    SchemaFrozen,

    #[error("Table is open read-only")]
    ReadOnly,

    #[error("Invalid field name '{name}': must be 1-10 letters, digits, or underscore")]
    InvalidName { name: String },

    #[error("Invalid field type '{token}': must be String, Integer, Double, Logical, or Date")]
    InvalidType { token: String },

    #[error("Invalid field width {width}: must be greater than zero and less than 256")]
    InvalidWidth { width: i64 },

    #[error("Invalid field precision {precision}: must not be greater than width {width}")]
    InvalidPrecision { precision: i64, width: i64 },

    #[error("Record {row} out of range (record count: {count})")]
    RowOutOfRange { row: usize, count: usize },

    #[error("Field index {index} out of range (field count: {count})")]
    FieldOutOfRange { index: usize, count: usize },

    #[error("Field '{name}' does not match a field name in this table")]
    FieldNotFound { name: String },

    #[error("A value is required for {what}")]
    ValueRequired { what: String },

    #[error("Cannot interpret '{value}' as a number for field '{field}'")]
    InvalidNumber { field: String, value: String },

    #[error("Cannot interpret '{value}' as an integer for field '{field}'")]
    InvalidInteger { field: String, value: String },

    #[error("Cannot interpret '{value}' as a double for field '{field}'")]
    InvalidDouble { field: String, value: String },

    #[error("Failed to write deletion flag for record {row}")]
    FlagWriteFailed { row: usize },

    #[error("Invalid record target '{token}': expected a record number or 'end'")]
    InvalidRowTarget { token: String },
}

pub type Result<T> = std::result::Result<T, DbfError>;
