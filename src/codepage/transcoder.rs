use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::codepage::oem::{self, OemCodePage};

/// Byte written in place of a character the bound code page cannot represent.
pub const REPLACEMENT_BYTE: u8 = b'?';

/// Text converter bound to a table for its whole open lifetime.
#[derive(Debug, Clone, Copy)]
pub enum Transcoder {
    /// No usable code page: UTF-8 bytes are stored as given and decoded lossily.
    PassThrough,
    Whatwg(&'static Encoding),
    Oem(&'static OemCodePage),
}

impl Transcoder {
    /// Binds a resolved encoding name. Names with no backend fall back to pass-through.
    pub fn bind(encoding: Option<&str>) -> Self {
        let Some(name) = encoding else {
            return Transcoder::PassThrough;
        };
        Self::backend(name).unwrap_or_else(|| {
            log::warn!(
                "no converter for code page {name}; string cells are passed through unchanged"
            );
            Transcoder::PassThrough
        })
    }

    /// Whether `name` has a real converter behind it.
    pub fn supports(name: &str) -> bool {
        Self::backend(name).is_some()
    }

    fn backend(name: &str) -> Option<Self> {
        if let Some(page) = oem::by_name(name) {
            return Some(Transcoder::Oem(page));
        }
        whatwg_encoding(name).map(Transcoder::Whatwg)
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Transcoder::PassThrough)
    }

    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Transcoder::PassThrough => String::from_utf8_lossy(bytes),
            Transcoder::Whatwg(encoding) => encoding.decode_without_bom_handling(bytes).0,
            Transcoder::Oem(page) => Cow::Owned(page.decode(bytes)),
        }
    }

    /// Encodes `text`; the flag reports whether any character had to be replaced.
    pub fn encode<'a>(&self, text: &'a str) -> (Cow<'a, [u8]>, bool) {
        match self {
            Transcoder::PassThrough => (Cow::Borrowed(text.as_bytes()), false),
            Transcoder::Whatwg(encoding) => {
                let (bytes, _, unmappable) = encoding.encode(text);
                if !unmappable {
                    return (bytes, false);
                }
                // encoding_rs substitutes HTML character references; store a plain
                // replacement byte per unmappable character instead.
                let mut out = Vec::with_capacity(text.len());
                let mut buf = [0u8; 4];
                for ch in text.chars() {
                    let (bytes, _, unmappable) = encoding.encode(ch.encode_utf8(&mut buf));
                    if unmappable {
                        out.push(REPLACEMENT_BYTE);
                    } else {
                        out.extend_from_slice(&bytes);
                    }
                }
                (Cow::Owned(out), true)
            }
            Transcoder::Oem(page) => {
                let mut replaced = false;
                let out: Vec<u8> = text
                    .chars()
                    .map(|ch| {
                        page.encode_char(ch).unwrap_or_else(|| {
                            replaced = true;
                            REPLACEMENT_BYTE
                        })
                    })
                    .collect();
                (Cow::Owned(out), replaced)
            }
        }
    }

    /// Encodes `text` and clips it to `width` bytes without splitting a character.
    /// Returns the stored bytes, whether characters were replaced, and whether it was clipped.
    pub fn encode_clipped(&self, text: &str, width: usize) -> (Vec<u8>, bool, bool) {
        let (encoded, replaced) = self.encode(text);
        if encoded.len() <= width {
            return (encoded.into_owned(), replaced, false);
        }
        let mut end = 0;
        for (offset, ch) in text.char_indices() {
            let prefix = &text[..offset + ch.len_utf8()];
            if self.encode(prefix).0.len() > width {
                break;
            }
            end = offset + ch.len_utf8();
        }
        let (clipped, _) = self.encode(&text[..end]);
        (clipped.into_owned(), replaced, true)
    }
}

fn whatwg_encoding(name: &str) -> Option<&'static Encoding> {
    let encoding = match name {
        "cp874" => encoding_rs::WINDOWS_874,
        "cp932" => encoding_rs::SHIFT_JIS,
        "cp936" => encoding_rs::GBK,
        "cp949" => encoding_rs::EUC_KR,
        "cp950" => encoding_rs::BIG5,
        "cp1250" => encoding_rs::WINDOWS_1250,
        "cp1251" => encoding_rs::WINDOWS_1251,
        "cp1252" => encoding_rs::WINDOWS_1252,
        "cp1253" => encoding_rs::WINDOWS_1253,
        "cp1254" => encoding_rs::WINDOWS_1254,
        "cp1255" => encoding_rs::WINDOWS_1255,
        "cp1256" => encoding_rs::WINDOWS_1256,
        "cp1257" => encoding_rs::WINDOWS_1257,
        "cp1258" => encoding_rs::WINDOWS_1258,
        "cp866" => encoding_rs::IBM866,
        "macRoman" => encoding_rs::MACINTOSH,
        "macCyrillic" => encoding_rs::X_MAC_CYRILLIC,
        _ => return Encoding::for_label(name.as_bytes()),
    };
    Some(encoding)
}
