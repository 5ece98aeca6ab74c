use chrono::NaiveDate;

use crate::{
    codepage::Transcoder,
    storage::{RECORD_DELETED, RECORD_LIVE},
    types::{
        RowId,
        field::{Field, FieldType},
        value::CellValue,
    },
};

pub const ZERO_DATE: &str = "00000000";

const LOGICAL_CODES: &[u8] = b"TFYNtfyn?";

/// In-memory copy of the one record currently being read or written.
#[derive(Debug, Clone)]
pub struct RecordBuffer {
    pub row: RowId,
    pub bytes: Vec<u8>,
    pub dirty: bool,
}

impl RecordBuffer {
    /// A freshly appended record: live, every cell blank.
    pub fn blank(row: RowId, record_length: usize) -> Self {
        Self {
            row,
            bytes: vec![b' '; record_length],
            dirty: true,
        }
    }

    pub fn from_bytes(row: RowId, bytes: Vec<u8>) -> Self {
        Self {
            row,
            bytes,
            dirty: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.bytes.first() == Some(&RECORD_DELETED)
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.bytes[0] = if deleted { RECORD_DELETED } else { RECORD_LIVE };
        self.dirty = true;
    }

    pub fn cell(&self, field: &Field) -> &[u8] {
        &self.bytes[field.offset..field.offset + field.width()]
    }

    /// Stores `value` left-aligned in the cell, blank-padding the remainder.
    pub fn put_cell(&mut self, field: &Field, value: &[u8]) {
        let cell = &mut self.bytes[field.offset..field.offset + field.width()];
        let len = value.len().min(cell.len());
        cell[..len].copy_from_slice(&value[..len]);
        cell[len..].fill(b' ');
        self.dirty = true;
    }
}

pub fn is_null(field: &Field, cell: &[u8]) -> bool {
    let blank = cell.iter().all(|&b| b == b' ' || b == 0);
    match field.native {
        b'N' | b'F' => blank || cell.first() == Some(&b'*'),
        b'L' => blank || cell.first() == Some(&b'?'),
        _ => blank,
    }
}

/// Marker written for an explicit NULL, by native type.
pub fn null_fill(field: &Field) -> Vec<u8> {
    match field.native {
        b'N' | b'F' => vec![b'*'; field.width()],
        b'L' => vec![b'?'],
        _ => vec![b' '; field.width()],
    }
}

/// Text rendering of a stored cell. String cells go through the bound code page;
/// everything else is ASCII.
pub fn render_cell(field: &Field, cell: &[u8], transcoder: &Transcoder) -> CellValue {
    if is_null(field, cell) {
        return CellValue::Null;
    }
    match field.field_type {
        FieldType::String => {
            let text = transcoder.decode(cell);
            // Only the blank padding goes; leading spaces are part of the value
            CellValue::Text(text.trim_end_matches(|c| c == ' ' || c == '\0').to_string())
        }
        FieldType::Date => {
            let text = ascii_trimmed(cell);
            if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
                CellValue::Text(text)
            } else {
                CellValue::Text(ZERO_DATE.to_string())
            }
        }
        _ => CellValue::Text(ascii_trimmed(cell)),
    }
}

fn ascii_trimmed(cell: &[u8]) -> String {
    String::from_utf8_lossy(cell)
        .trim_matches(|c| c == ' ' || c == '\0')
        .to_string()
}

/// Right-justified `%{width}.{precision}f`; the flag reports truncation to the width.
pub fn format_number(value: f64, width: usize, precision: usize) -> (Vec<u8>, bool) {
    let mut text = format!("{:>width$.precision$}", value);
    let truncated = text.len() > width;
    text.truncate(width);
    (text.into_bytes(), truncated)
}

/// Longest numeric prefix after leading whitespace, the way `strtod` reads it.
/// `None` when no digits could be consumed at all.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    trimmed[..end].parse::<f64>().ok()
}

/// Eight-digit `YYYYMMDD` naming a real calendar day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[0..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn is_logical_code(code: u8) -> bool {
    LOGICAL_CODES.contains(&code)
}
