//! Language driver registry.
//!
//! A .dbf header carries a one-byte language driver id (LDID) naming the code page
//! its string cells are stored in. The same id is spelled `LDID/<n>` in code-page
//! tokens and `.cpg` sidecars. This module maps those ids to canonical encoding
//! names; [`transcoder`] turns a name into something that can convert text.

pub mod oem;
pub mod transcoder;

use std::fmt;

pub use transcoder::Transcoder;

/// Token used when a caller creates a table without choosing a code page:
/// the Windows ANSI default.
pub const DEFAULT_CODE_PAGE: &str = "LDID/87";

const LDID_PREFIX: &str = "LDID/";

/// Sparse LDID table. Ids missing here resolve to `None`.
const LDID_ENCODINGS: &[(u8, &str)] = &[
    (1, "cp437"),
    (2, "cp850"),
    (3, "cp1252"),
    (4, "macRoman"),
    (8, "cp865"),
    (9, "cp437"),
    (10, "cp850"),
    (11, "cp437"),
    (13, "cp437"),
    (14, "cp850"),
    (15, "cp437"),
    (16, "cp850"),
    (17, "cp437"),
    (18, "cp850"),
    (19, "cp932"),
    (20, "cp850"),
    (21, "cp437"),
    (22, "cp850"),
    (23, "cp865"),
    (24, "cp437"),
    (25, "cp437"),
    (26, "cp850"),
    (27, "cp437"),
    (28, "cp863"),
    (29, "cp850"),
    (31, "cp852"),
    (34, "cp852"),
    (35, "cp852"),
    (36, "cp860"),
    (37, "cp850"),
    (38, "cp866"),
    (55, "cp850"),
    (64, "cp852"),
    (77, "cp936"),
    (78, "cp949"),
    (79, "cp950"),
    (80, "cp874"),
    (87, "cp1252"),
    (88, "cp1252"),
    (89, "cp1252"),
    (100, "cp852"),
    (101, "cp866"),
    (102, "cp865"),
    (103, "cp861"),
    (104, "cp895"),
    (105, "cp620"),
    (106, "cp737"),
    (107, "cp857"),
    (108, "cp863"),
    (120, "cp950"),
    (121, "cp949"),
    (122, "cp936"),
    (123, "cp932"),
    (124, "cp874"),
    (134, "cp737"),
    (135, "cp852"),
    (136, "cp857"),
    (150, "macCyrillic"),
    (151, "macCentEuro"),
    (152, "macGreek"),
    (200, "cp1250"),
    (201, "cp1251"),
    (202, "cp1254"),
    (203, "cp1253"),
    (204, "cp1257"),
];

/// Code page selector: a language driver id, or a free-form encoding name as
/// found in a `.cpg` sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodePageToken {
    Ldid(i64),
    Name(String),
}

impl CodePageToken {
    /// `LDID/<n>` becomes [`CodePageToken::Ldid`]; anything else is kept as a name.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix(LDID_PREFIX) {
            if let Ok(id) = rest.parse::<i64>() {
                return CodePageToken::Ldid(id);
            }
        }
        CodePageToken::Name(token.to_string())
    }

    /// The byte that goes into the header, when this token fits in one.
    pub fn header_byte(&self) -> Option<u8> {
        match self {
            CodePageToken::Ldid(id) => u8::try_from(*id).ok(),
            CodePageToken::Name(_) => None,
        }
    }
}

impl From<u8> for CodePageToken {
    fn from(ldid: u8) -> Self {
        CodePageToken::Ldid(ldid as i64)
    }
}

impl fmt::Display for CodePageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePageToken::Ldid(id) => write!(f, "{LDID_PREFIX}{id}"),
            CodePageToken::Name(name) => f.write_str(name),
        }
    }
}

/// Resolves a token to a canonical encoding name, or `None` when the id is
/// unmapped, out of range, or names a code page with no converter (cp895,
/// cp620, macCentEuro, macGreek).
pub fn resolve_encoding(token: &CodePageToken) -> Option<&'static str> {
    lookup(token).filter(|name| Transcoder::supports(name))
}

fn lookup(token: &CodePageToken) -> Option<&'static str> {
    match token {
        CodePageToken::Ldid(id) => {
            let id = u8::try_from(*id).ok()?;
            LDID_ENCODINGS
                .iter()
                .find(|(ldid, _)| *ldid == id)
                .map(|(_, name)| *name)
        }
        CodePageToken::Name(name) => resolve_name(name),
    }
}

/// Names from sidecars: our own canonical names (any case), bare Windows code
/// page numbers such as `1252`, then WHATWG labels.
fn resolve_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Some((_, canonical)) = LDID_ENCODINGS
        .iter()
        .find(|(_, canonical)| canonical.eq_ignore_ascii_case(name))
    {
        return Some(canonical);
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        let prefixed = format!("cp{name}");
        if let Some((_, canonical)) = LDID_ENCODINGS.iter().find(|(_, c)| *c == prefixed) {
            return Some(canonical);
        }
    }
    encoding_rs::Encoding::for_label(name.as_bytes()).map(|encoding| encoding.name())
}
