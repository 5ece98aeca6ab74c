use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::error::DbfError;

/// Textual rendering of one cell. Every stored type reads back as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// NULL renders as the empty string, the form handed to host wrappers.
    pub fn into_string(self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s,
        }
    }
}

/// Non-fatal condition raised while writing; the write still went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    StringTruncated { field: String, value: String },
    NumberTruncated { field: String, value: String },
    Unmappable { field: String, value: String },
    LogicalUnrecognized { field: String, value: String },
    DateUnparseable { field: String, value: String },
    UnwritableField { index: usize, field_type: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::StringTruncated { field, value } => {
                write!(f, "value truncated when writing to field {field}: \"{value}\"")
            }
            Diagnostic::NumberTruncated { field, value } => {
                write!(f, "failed to write number {value} to field {field}")
            }
            Diagnostic::Unmappable { field, value } => write!(
                f,
                "value for field {field} has characters outside the table code page: \"{value}\""
            ),
            Diagnostic::LogicalUnrecognized { field, value } => {
                write!(f, "logical value unrecognized for field {field}: \"{value}\"")
            }
            Diagnostic::DateUnparseable { field, value } => {
                write!(f, "date unparseable for field {field}, wrote 00000000: \"{value}\"")
            }
            Diagnostic::UnwritableField { index, field_type } => {
                write!(f, "field {index} is an unwritable field of type {field_type}")
            }
        }
    }
}

/// Success value of a write together with any warnings it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> WriteOutcome<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Record addressed by an insert: an explicit index or one past the last record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    Index(usize),
    End,
}

impl FromStr for RowTarget {
    type Err = DbfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "end" {
            return Ok(RowTarget::End);
        }
        s.trim()
            .parse::<usize>()
            .map(RowTarget::Index)
            .map_err(|_| DbfError::InvalidRowTarget {
                token: s.to_string(),
            })
    }
}

impl From<usize> for RowTarget {
    fn from(row: usize) -> Self {
        RowTarget::Index(row)
    }
}
