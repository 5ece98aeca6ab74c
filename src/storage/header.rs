use chrono::{Datelike, Local};

use crate::{
    storage::{DBF_HEADER_SIZE, DBF_VERSION, FIELD_DESCRIPTOR_SIZE, HEADER_TERMINATOR, LDID_OFFSET},
    types::error::DbfError,
};

/// Fixed 32-byte table header at the start of every .dbf file.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfHeader {
    pub version: u8,
    pub last_update: [u8; 3],
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
    pub language_driver: u8,
}

impl Default for DbfHeader {
    fn default() -> Self {
        Self {
            version: DBF_VERSION,
            last_update: today(),
            record_count: 0,
            header_length: (DBF_HEADER_SIZE + 1) as u16,
            record_length: 1,
            language_driver: 0,
        }
    }
}

/// Last-update stamp as stored on disk: years since 1900, month, day.
pub fn today() -> [u8; 3] {
    let now = Local::now();
    [
        (now.year() - 1900).clamp(0, 255) as u8,
        now.month() as u8,
        now.day() as u8,
    ]
}

impl DbfHeader {
    /// Descriptor slots in the header. Some writers leave the terminator out of
    /// `header_length`, so it is not subtracted here; parsing stops at `0x0D`.
    pub fn field_count(&self) -> usize {
        (self.header_length as usize).saturating_sub(DBF_HEADER_SIZE) / FIELD_DESCRIPTOR_SIZE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(DBF_HEADER_SIZE);

        buffer.push(self.version);
        buffer.extend_from_slice(&self.last_update);
        buffer.extend_from_slice(&self.record_count.to_le_bytes());
        buffer.extend_from_slice(&self.header_length.to_le_bytes());
        buffer.extend_from_slice(&self.record_length.to_le_bytes());

        buffer.resize(DBF_HEADER_SIZE, 0);
        buffer[LDID_OFFSET] = self.language_driver;
        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbfError> {
        if bytes.len() < DBF_HEADER_SIZE {
            return Err(DbfError::InvalidHeader {
                reason: "Header too short".to_string(),
            });
        }

        let version = bytes[0];
        let last_update = [bytes[1], bytes[2], bytes[3]];
        let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let header_length = u16::from_le_bytes([bytes[8], bytes[9]]);
        let record_length = u16::from_le_bytes([bytes[10], bytes[11]]);

        if (header_length as usize) < DBF_HEADER_SIZE {
            return Err(DbfError::InvalidHeader {
                reason: format!("Header length {} is shorter than the fixed header", header_length),
            });
        }
        if record_length == 0 {
            return Err(DbfError::InvalidHeader {
                reason: "Record length is zero".to_string(),
            });
        }

        Ok(Self {
            version,
            last_update,
            record_count,
            header_length,
            record_length,
            language_driver: bytes[LDID_OFFSET],
        })
    }
}

/// One 32-byte column descriptor following the table header.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Raw name bytes in the table's code page, without NUL padding.
    pub name: Vec<u8>,
    pub native: u8,
    pub width: u8,
    pub decimals: u8,
}

impl FieldEntry {
    pub fn to_bytes(&self) -> [u8; FIELD_DESCRIPTOR_SIZE] {
        let mut buffer = [0u8; FIELD_DESCRIPTOR_SIZE];
        let name_len = self.name.len().min(10);
        buffer[..name_len].copy_from_slice(&self.name[..name_len]);
        buffer[11] = self.native;
        buffer[16] = self.width;
        buffer[17] = self.decimals;
        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DbfError> {
        if bytes.len() < FIELD_DESCRIPTOR_SIZE {
            return Err(DbfError::InvalidHeader {
                reason: "Field descriptor too short".to_string(),
            });
        }
        let name_end = bytes[..11].iter().position(|&b| b == 0).unwrap_or(11);
        Ok(Self {
            name: bytes[..name_end].to_vec(),
            native: bytes[11],
            width: bytes[16],
            decimals: bytes[17],
        })
    }
}

/// Parses the descriptor array that follows the fixed header, stopping at the terminator.
pub fn parse_field_entries(header: &DbfHeader, bytes: &[u8]) -> Result<Vec<FieldEntry>, DbfError> {
    let mut entries = Vec::with_capacity(header.field_count());
    for chunk in bytes.chunks(FIELD_DESCRIPTOR_SIZE).take(header.field_count()) {
        if chunk[0] == HEADER_TERMINATOR {
            break;
        }
        entries.push(FieldEntry::from_bytes(chunk)?);
    }

    let data_width: usize = entries.iter().map(|e| e.width as usize).sum();
    if data_width + 1 > header.record_length as usize {
        return Err(DbfError::InvalidHeader {
            reason: format!(
                "Field widths ({}) exceed record length ({})",
                data_width, header.record_length
            ),
        });
    }
    Ok(entries)
}

/// Serializes header, descriptors, and terminator as one contiguous block.
pub fn encode_header_block(header: &DbfHeader, entries: &[FieldEntry]) -> Vec<u8> {
    let mut buffer = header.to_bytes();
    for entry in entries {
        buffer.extend_from_slice(&entry.to_bytes());
    }
    buffer.push(HEADER_TERMINATOR);
    buffer
}
