pub mod insert;
pub mod scan;
pub mod update;

use crate::{
    storage::{record, table::Table},
    types::{
        FieldIndex,
        error::{DbfError, Result},
        field::{Field, FieldType},
        value::Diagnostic,
    },
};

/// How text bound for a numeric cell is turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberParsing {
    /// Longest numeric prefix, for Integer and Double alike; fails `InvalidNumber`.
    Prefix,
    /// Whole value must be an integer (Integer) or a float (Double); fails
    /// `InvalidInteger` / `InvalidDouble`.
    Typed,
    /// Longest numeric prefix; fails `InvalidDouble`.
    PrefixDouble,
}

impl NumberParsing {
    pub fn parse(&self, field: &Field, value: &str) -> Result<f64> {
        let integer = field.field_type == FieldType::Integer;
        let parsed = match self {
            NumberParsing::Prefix | NumberParsing::PrefixDouble => {
                record::parse_leading_number(value)
            }
            NumberParsing::Typed if integer => value.trim().parse::<i64>().ok().map(|v| v as f64),
            NumberParsing::Typed => value.trim().parse::<f64>().ok(),
        }
        // Overflow such as "1e400" has no fixed-width rendering
        .filter(|v| v.is_finite());
        parsed.ok_or_else(|| {
            let field = field.name.clone();
            let value = value.to_string();
            match self {
                NumberParsing::Prefix => DbfError::InvalidNumber { field, value },
                NumberParsing::Typed if integer => DbfError::InvalidInteger { field, value },
                _ => DbfError::InvalidDouble { field, value },
            }
        })
    }
}

pub(crate) fn warn(diagnostic: Diagnostic) -> Diagnostic {
    log::warn!("{}", diagnostic);
    diagnostic
}

/// Writes one textual value into the buffered record `row` (already prepared).
/// Empty text is NULL. Fatal parse failures return an error; everything else that
/// goes wrong is reported as a diagnostic.
pub(crate) fn write_value(
    table: &mut Table,
    field_index: FieldIndex,
    value: &str,
    numbers: NumberParsing,
) -> Result<Vec<Diagnostic>> {
    let Some(field) = table.fields().get(field_index).cloned() else {
        return Ok(vec![warn(Diagnostic::UnwritableField {
            index: field_index,
            field_type: FieldType::Invalid.to_string(),
        })]);
    };

    let mut diagnostics = Vec::new();
    if value.is_empty() {
        table.write_null_cell(field_index);
        return Ok(diagnostics);
    }

    match field.field_type {
        FieldType::String => diagnostics.extend(table.write_string_cell(field_index, value)),
        FieldType::Integer | FieldType::Double => {
            let number = numbers.parse(&field, value)?;
            diagnostics.extend(table.write_number_cell(field_index, number));
        }
        FieldType::Logical => diagnostics.extend(table.write_logical_cell(field_index, value)),
        FieldType::Date => diagnostics.extend(table.write_date_cell(field_index, value)),
        FieldType::Invalid => diagnostics.push(Diagnostic::UnwritableField {
            index: field_index,
            field_type: field.field_type.to_string(),
        }),
    }
    Ok(diagnostics.into_iter().map(warn).collect())
}
