pub mod header;
pub mod record;
pub mod table;

// Constants following the dBase III layout as written by shapelib
pub const DBF_VERSION: u8 = 0x03;
pub const DBF_HEADER_SIZE: usize = 32;
pub const FIELD_DESCRIPTOR_SIZE: usize = 32;
pub const HEADER_TERMINATOR: u8 = 0x0D;
pub const END_OF_FILE: u8 = 0x1A;
pub const LDID_OFFSET: usize = 29;

pub const RECORD_LIVE: u8 = b' ';
pub const RECORD_DELETED: u8 = b'*';

pub const MAX_FIELD_NAME_LEN: usize = 10;
pub const MAX_FIELD_WIDTH: usize = 255;
pub const DATE_WIDTH: u8 = 8;

pub const CODE_PAGE_SIDECAR_EXT: &str = "cpg";
