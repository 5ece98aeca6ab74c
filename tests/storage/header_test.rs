use dbfkit::{
    DbfError,
    storage::{
        DBF_HEADER_SIZE, FIELD_DESCRIPTOR_SIZE, HEADER_TERMINATOR,
        header::{DbfHeader, FieldEntry, encode_header_block, parse_field_entries},
    },
};

fn entry(name: &str, native: u8, width: u8, decimals: u8) -> FieldEntry {
    FieldEntry {
        name: name.as_bytes().to_vec(),
        native,
        width,
        decimals,
    }
}

#[test]
fn test_header_layout() {
    let header = DbfHeader {
        last_update: [124, 3, 9],
        record_count: 0x0102_0304,
        header_length: 97,
        record_length: 31,
        language_driver: 87,
        ..Default::default()
    };
    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), DBF_HEADER_SIZE);
    assert_eq!(bytes[0], 0x03);
    assert_eq!(&bytes[1..4], &[124, 3, 9]);
    assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&bytes[8..10], &97u16.to_le_bytes());
    assert_eq!(&bytes[10..12], &31u16.to_le_bytes());
    assert_eq!(bytes[29], 87);
    assert!(bytes[12..29].iter().all(|&b| b == 0));

    assert_eq!(DbfHeader::from_bytes(&bytes).unwrap(), header);
}

#[test]
fn test_header_too_short() {
    let result = DbfHeader::from_bytes(&[0x03; 16]);
    assert!(matches!(result, Err(DbfError::InvalidHeader { .. })));
}

#[test]
fn test_header_rejects_zero_record_length() {
    let mut bytes = DbfHeader::default().to_bytes();
    bytes[10] = 0;
    bytes[11] = 0;
    assert!(matches!(
        DbfHeader::from_bytes(&bytes),
        Err(DbfError::InvalidHeader { .. })
    ));
}

#[test]
fn test_header_block_parses_back() {
    let entries = vec![entry("NAME", b'C', 20, 0), entry("SCORE", b'N', 6, 2)];
    let header = DbfHeader {
        header_length: (DBF_HEADER_SIZE + 2 * FIELD_DESCRIPTOR_SIZE + 1) as u16,
        record_length: 27,
        ..Default::default()
    };
    let block = encode_header_block(&header, &entries);
    assert_eq!(block.len(), header.header_length as usize);
    assert_eq!(block[block.len() - 1], HEADER_TERMINATOR);

    let parsed = parse_field_entries(&header, &block[DBF_HEADER_SIZE..]).unwrap();
    assert_eq!(parsed, entries);
}

#[test]
fn test_descriptor_names_are_clipped_to_ten_bytes() {
    let long = entry("ABCDEFGHIJKL", b'C', 1, 0);
    let bytes = long.to_bytes();
    assert_eq!(&bytes[..11], b"ABCDEFGHIJ\0");
}

#[test]
fn test_widths_beyond_record_length_are_rejected() {
    let entries = vec![entry("A", b'C', 200, 0)];
    let header = DbfHeader {
        header_length: (DBF_HEADER_SIZE + FIELD_DESCRIPTOR_SIZE + 1) as u16,
        record_length: 10,
        ..Default::default()
    };
    let block = encode_header_block(&header, &entries);
    assert!(matches!(
        parse_field_entries(&header, &block[DBF_HEADER_SIZE..]),
        Err(DbfError::InvalidHeader { .. })
    ));
}

#[test]
fn test_header_length_without_terminator() {
    let entries = vec![entry("NAME", b'C', 20, 0), entry("SCORE", b'N', 6, 2)];
    let header = DbfHeader {
        header_length: (DBF_HEADER_SIZE + 2 * FIELD_DESCRIPTOR_SIZE) as u16,
        record_length: 27,
        ..Default::default()
    };
    assert_eq!(header.field_count(), 2);

    let block = encode_header_block(&header, &entries);
    let descriptors = &block[DBF_HEADER_SIZE..header.header_length as usize];
    assert_eq!(parse_field_entries(&header, descriptors).unwrap(), entries);
}
