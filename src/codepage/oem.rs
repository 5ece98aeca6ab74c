//! DOS OEM code pages that have no WHATWG counterpart.
//!
//! The lower half of each page is ASCII; the upper 128 positions come from the
//! `oem_cp` tables.

use oem_cp::{
    code_table::{DECODING_TABLE_CP_MAP, ENCODING_TABLE_CP_MAP},
    encode_string_checked,
};

/// Single-byte OEM code page, identified by its IBM number.
#[derive(Debug)]
pub struct OemCodePage {
    pub name: &'static str,
    number: u16,
}

impl OemCodePage {
    /// Undefined positions decode to U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match DECODING_TABLE_CP_MAP.get(&self.number) {
            Some(table) => table.decode_string_lossy(bytes),
            None => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn decode_byte(&self, byte: u8) -> char {
        self.decode(&[byte]).chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Returns `None` for characters this page cannot represent.
    pub fn encode_char(&self, ch: char) -> Option<u8> {
        if ch.is_ascii() {
            return Some(ch as u8);
        }
        let table = ENCODING_TABLE_CP_MAP.get(&self.number)?;
        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        encode_string_checked(text, table)?.first().copied()
    }

    fn has_tables(&self) -> bool {
        DECODING_TABLE_CP_MAP.get(&self.number).is_some()
            && ENCODING_TABLE_CP_MAP.get(&self.number).is_some()
    }
}

pub static OEM_CODE_PAGES: &[OemCodePage] = &[
    OemCodePage { name: "cp437", number: 437 },
    OemCodePage { name: "cp737", number: 737 },
    OemCodePage { name: "cp850", number: 850 },
    OemCodePage { name: "cp852", number: 852 },
    OemCodePage { name: "cp857", number: 857 },
    OemCodePage { name: "cp860", number: 860 },
    OemCodePage { name: "cp861", number: 861 },
    OemCodePage { name: "cp863", number: 863 },
    OemCodePage { name: "cp865", number: 865 },
];

pub fn by_name(name: &str) -> Option<&'static OemCodePage> {
    OEM_CODE_PAGES
        .iter()
        .find(|page| page.name.eq_ignore_ascii_case(name))
        .filter(|page| page.has_tables())
}
