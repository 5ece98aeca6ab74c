use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    storage::{MAX_FIELD_NAME_LEN, MAX_FIELD_WIDTH},
    types::error::{DbfError, Result},
};

/// Semantic column type layered over the single-letter native code on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    Double,
    Logical,
    Date,
    Invalid,
}

impl FieldType {
    /// Parses a type token as accepted by `add_field`: either a long name or a
    /// native code. `N` maps to Double since every dBase numeric is stored the same way.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "String" | "C" => Ok(FieldType::String),
            "Integer" => Ok(FieldType::Integer),
            "Double" | "N" => Ok(FieldType::Double),
            "Logical" | "L" => Ok(FieldType::Logical),
            "Date" | "D" => Ok(FieldType::Date),
            _ => Err(DbfError::InvalidType {
                token: token.to_string(),
            }),
        }
    }

    /// Derives the semantic type of a column read back from a header.
    pub fn from_native(native: u8, width: u8, decimals: u8) -> Self {
        match native {
            b'C' => FieldType::String,
            b'N' | b'F' => {
                if decimals > 0 || width >= 10 {
                    FieldType::Double
                } else {
                    FieldType::Integer
                }
            }
            b'L' => FieldType::Logical,
            b'D' => FieldType::Date,
            _ => FieldType::Invalid,
        }
    }

    /// Native code written for a newly added column.
    pub fn native_code(&self) -> Option<u8> {
        match self {
            FieldType::String => Some(b'C'),
            FieldType::Integer | FieldType::Double => Some(b'N'),
            FieldType::Logical => Some(b'L'),
            FieldType::Date => Some(b'D'),
            FieldType::Invalid => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Integer => "Integer",
            FieldType::Double => "Double",
            FieldType::Logical => "Logical",
            FieldType::Date => "Date",
            FieldType::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column definition together with its byte offset inside a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub native: u8,
    pub width: u8,
    pub precision: u8,
    pub offset: usize,
}

impl Field {
    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            field_type: self.field_type,
            native_type: (self.native as char).to_string(),
            width: self.width,
            precision: self.precision,
        }
    }
}

/// Plain, serializable view of a column: `(name, semanticType, nativeTypeCode, width, precision)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub native_type: String,
    pub width: u8,
    pub precision: u8,
}

/// Field names are restricted to identifier-safe characters, stricter than the format needs.
pub fn validate_field_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_FIELD_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbfError::InvalidName {
            name: name.to_string(),
        })
    }
}

pub fn validate_width(width: i64) -> Result<u8> {
    if width < 1 || width > MAX_FIELD_WIDTH as i64 {
        return Err(DbfError::InvalidWidth { width });
    }
    Ok(width as u8)
}

pub fn validate_precision(field_type: FieldType, width: i64, precision: i64) -> Result<u8> {
    if field_type != FieldType::Double {
        return Ok(0);
    }
    if precision < 0 || precision > width {
        return Err(DbfError::InvalidPrecision { precision, width });
    }
    Ok(precision as u8)
}
