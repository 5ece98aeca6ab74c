use std::fs;

use dbfkit::{
    CellValue, DbfError, FieldType, OpenMode, Table,
    storage::{END_OF_FILE, RECORD_DELETED},
    utils::mock::TempTable,
};

#[test]
fn test_create_empty_table() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("create_empty");
    let table = temp.create()?;
    assert_eq!(table.info(), (0, 0));
    assert_eq!(table.mode(), OpenMode::ReadWrite);
    table.close()?;

    // Header, terminator, end-of-file marker
    let bytes = fs::read(&temp.path).unwrap();
    assert_eq!(bytes.len(), 34);
    assert_eq!(bytes[0], 0x03);
    assert_eq!(bytes[32], 0x0D);
    assert_eq!(bytes[33], END_OF_FILE);
    Ok(())
}

#[test]
fn test_fields_echo_in_insertion_order() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("fields_echo");
    let mut table = temp.create()?;
    assert_eq!(table.add_field("NAME", FieldType::String, 20, 0)?, 0);
    assert_eq!(table.add_field("AGE", FieldType::Integer, 3, 0)?, 1);
    assert_eq!(table.add_field("SCORE", FieldType::Double, 6, 2)?, 2);
    assert_eq!(table.add_field("ACTIVE", FieldType::Logical, 1, 0)?, 3);
    assert_eq!(table.add_field("BORN", FieldType::Date, 8, 0)?, 4);

    let fields = table.field_descriptors();
    let summary: Vec<(&str, FieldType, &str, u8, u8)> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.field_type, f.native_type.as_str(), f.width, f.precision))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("NAME", FieldType::String, "C", 20, 0),
            ("AGE", FieldType::Integer, "N", 3, 0),
            ("SCORE", FieldType::Double, "N", 6, 2),
            ("ACTIVE", FieldType::Logical, "L", 1, 0),
            ("BORN", FieldType::Date, "D", 8, 0),
        ]
    );
    assert_eq!(table.info(), (0, 5));
    Ok(())
}

#[test]
fn test_add_field_validation() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("add_validation");
    let mut table = temp.create()?;

    assert!(matches!(
        table.add_field("", FieldType::String, 5, 0),
        Err(DbfError::InvalidName { .. })
    ));
    assert!(matches!(
        table.add_field("ELEVENCHARS", FieldType::String, 5, 0),
        Err(DbfError::InvalidName { .. })
    ));
    assert!(matches!(
        table.add_field("BAD-NAME", FieldType::String, 5, 0),
        Err(DbfError::InvalidName { .. })
    ));
    assert!(matches!(
        table.add_field("X", FieldType::Invalid, 5, 0),
        Err(DbfError::InvalidType { .. })
    ));
    assert!(matches!(
        table.add_field_token("X", "Memo", 5, 0),
        Err(DbfError::InvalidType { .. })
    ));
    assert!(matches!(
        table.add_field("X", FieldType::String, 0, 0),
        Err(DbfError::InvalidWidth { width: 0 })
    ));
    assert!(matches!(
        table.add_field("X", FieldType::String, 256, 0),
        Err(DbfError::InvalidWidth { width: 256 })
    ));
    assert!(matches!(
        table.add_field("X", FieldType::Double, 4, 5),
        Err(DbfError::InvalidPrecision { precision: 5, width: 4 })
    ));

    // Ten characters and underscores are fine
    assert_eq!(table.add_field("TEN_CHARS_", FieldType::String, 255, 0)?, 0);
    assert_eq!(table.add_field_token("N2", "N", 8, 3)?, 1);
    assert_eq!(table.fields()[1].field_type, FieldType::Double);
    Ok(())
}

#[test]
fn test_schema_frozen_once_records_exist() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("schema_frozen");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;

    for field_type in [
        FieldType::String,
        FieldType::Integer,
        FieldType::Double,
        FieldType::Logical,
        FieldType::Date,
    ] {
        assert!(matches!(
            table.add_field("LATE", field_type, 8, 0),
            Err(DbfError::SchemaFrozen)
        ));
    }
    assert_eq!(table.field_count(), 3);
    Ok(())
}

#[test]
fn test_read_only_table_rejects_mutation() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("read_only");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;
    table.close()?;

    let mut table = temp.open(OpenMode::ReadOnly)?;
    assert!(matches!(
        table.add_field("MORE", FieldType::String, 4, 0),
        Err(DbfError::SchemaFrozen)
    ));
    assert!(matches!(
        table.write_record(1, &["Bob"]),
        Err(DbfError::ReadOnly)
    ));
    assert!(matches!(
        table.set_deleted(0, Some(true)),
        Err(DbfError::FlagWriteFailed { row: 0 })
    ));
    assert_eq!(table.record_strings(0)?, vec!["Alice", "30", "91.50"]);
    Ok(())
}

#[test]
fn test_people_scenario() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("people");
    let mut table = temp.create_people()?;

    let outcome = table.write_record(0, &["Alice", "30", "91.50"])?;
    assert_eq!(outcome.value, 0);
    assert!(outcome.is_clean());

    assert_eq!(table.record_strings(0)?, vec!["Alice", "30", "91.50"]);
    assert_eq!(table.values("SCORE")?, vec!["91.50"]);
    Ok(())
}

#[test]
fn test_string_within_width_round_trips() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("leading_spaces");
    let mut table = temp.create_people()?;
    table.append_record(&["  Bob", "7"])?;
    table.close()?;

    let mut reopened = temp.open(OpenMode::ReadOnly)?;
    assert_eq!(reopened.record_strings(0)?, vec!["  Bob", "7", ""]);
    Ok(())
}

#[test]
fn test_empty_value_is_null() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("empty_null");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "", "91.50"])?;

    assert_eq!(table.read_cell(0, 1)?, CellValue::Null);
    assert_eq!(table.values("AGE")?, vec![""]);
    assert_eq!(
        table.read_record(0)?,
        vec![
            CellValue::Text("Alice".to_string()),
            CellValue::Null,
            CellValue::Text("91.50".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn test_double_renders_with_precision_digits() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("precision");
    let mut table = temp.create()?;
    table.add_field("P0", FieldType::Double, 10, 0)?;
    table.add_field("P3", FieldType::Double, 10, 3)?;
    table.append_record(&["2.4", "7"])?;
    table.append_record(&["-1", "0.12345"])?;

    assert_eq!(table.values("P3")?, vec!["7.000", "0.123"]);
    assert_eq!(table.values("P0")?, vec!["2", "-1"]);
    Ok(())
}

#[test]
fn test_row_bounds() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("row_bounds");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;

    let count = table.record_count();
    assert!(matches!(
        table.read_record(count),
        Err(DbfError::RowOutOfRange { row: 1, count: 1 })
    ));
    assert!(matches!(
        table.write_record(count + 1, &["Zed"]),
        Err(DbfError::RowOutOfRange { row: 2, count: 1 })
    ));
    assert_eq!(table.record_count(), count);

    assert_eq!(table.write_record(count, &["Bob"])?.value, count);
    assert_eq!(table.record_count(), count + 1);

    // Appending with no values still materializes the record
    assert_eq!(table.write_record(count + 1, &[] as &[&str])?.value, count + 1);
    assert_eq!(table.record_count(), count + 2);
    assert_eq!(table.record_strings(count + 1)?, vec!["", "", ""]);

    assert!(matches!(
        table.read_cell(0, 3),
        Err(DbfError::FieldOutOfRange { index: 3, count: 3 })
    ));
    Ok(())
}

#[test]
fn test_deletion_flag_toggles_and_persists() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("deleted");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;
    table.append_record(&["Bob", "41", "70.25"])?;

    assert!(!table.is_deleted(1)?);
    assert!(table.set_deleted(1, Some(true))?);
    assert!(table.is_deleted(1)?);
    assert!(table.set_deleted(1, None)?);
    assert!(!table.set_deleted(1, Some(false))?);
    assert!(!table.is_deleted(1)?);
    assert!(table.set_deleted(0, Some(true))?);
    assert!(matches!(
        table.set_deleted(2, Some(true)),
        Err(DbfError::RowOutOfRange { .. })
    ));
    table.close()?;

    let mut table = temp.open(OpenMode::ReadWrite)?;
    assert!(table.is_deleted(0)?);
    assert!(!table.is_deleted(1)?);

    // Soft delete keeps the data
    assert_eq!(table.record_strings(0)?, vec!["Alice", "30", "91.50"]);
    table.close()?;

    let bytes = fs::read(&temp.path).unwrap();
    let record_start = 32 + 3 * 32 + 1;
    assert_eq!(bytes[record_start], RECORD_DELETED);
    Ok(())
}

#[test]
fn test_write_null_for_every_type() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("write_null");
    let mut table = temp.create()?;
    table.add_field("S", FieldType::String, 4, 0)?;
    table.add_field("I", FieldType::Integer, 4, 0)?;
    table.add_field("D", FieldType::Double, 6, 2)?;
    table.add_field("L", FieldType::Logical, 1, 0)?;
    table.add_field("DT", FieldType::Date, 8, 0)?;
    table.append_record(&["abcd", "12", "1.5", "T", "20240131"])?;

    for field_index in 0..5 {
        table.write_null(0, field_index)?;
        assert_eq!(table.read_cell(0, field_index)?, CellValue::Null);
    }
    assert!(matches!(
        table.write_null(0, 5),
        Err(DbfError::FieldOutOfRange { .. })
    ));
    table.close()?;

    let mut table = temp.open(OpenMode::ReadOnly)?;
    assert!(table.read_record(0)?.iter().all(CellValue::is_null));
    Ok(())
}

#[test]
fn test_persistence_and_derived_types() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("persistence");
    {
        let mut table = temp.create()?;
        table.add_field("NAME", FieldType::String, 20, 0)?;
        table.add_field("AGE", FieldType::Integer, 3, 0)?;
        table.add_field("BIGINT", FieldType::Integer, 12, 0)?;
        table.add_field("SCORE", FieldType::Double, 6, 2)?;
        table.add_field("OK", FieldType::Logical, 1, 0)?;
        table.add_field("SEEN", FieldType::Date, 8, 0)?;
        for i in 0..25 {
            let name = format!("User{}", i);
            let age = i.to_string();
            table.append_record(&[
                name.as_str(),
                age.as_str(),
                "123456789012",
                "1.25",
                "T",
                "20200101",
            ])?;
        }
        table.close()?;
    }

    let mut table = temp.open(OpenMode::ReadWrite)?;
    assert_eq!(table.info(), (25, 6));
    let types: Vec<FieldType> = table.fields().iter().map(|f| f.field_type).collect();
    assert_eq!(
        types,
        vec![
            FieldType::String,
            FieldType::Integer,
            FieldType::Double,
            FieldType::Double,
            FieldType::Logical,
            FieldType::Date,
        ]
    );
    assert_eq!(
        table.record_strings(24)?,
        vec!["User24", "24", "123456789012", "1.25", "T", "20200101"]
    );
    table.close()?;

    let bytes = fs::read(&temp.path).unwrap();
    let header_length = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let record_length = u16::from_le_bytes([bytes[10], bytes[11]]) as usize;
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 25);
    assert_eq!(record_length, 1 + 20 + 3 + 12 + 6 + 1 + 8);
    assert_eq!(bytes.len(), header_length + 25 * record_length + 1);
    assert_eq!(bytes[bytes.len() - 1], END_OF_FILE);
    Ok(())
}

#[test]
fn test_drop_without_close_flushes() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("drop_flush");
    {
        let mut table = temp.create_people()?;
        table.append_record(&["Alice", "30", "91.50"])?;
    }
    let mut table = temp.open(OpenMode::ReadOnly)?;
    assert_eq!(table.record_count(), 1);
    assert_eq!(table.record_strings(0)?, vec!["Alice", "30", "91.50"]);
    Ok(())
}

#[test]
fn test_field_lookup_ignores_case() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("field_lookup");
    let table = temp.create_people()?;
    assert_eq!(table.field_index("score")?, 2);
    assert_eq!(table.field_descriptor("Age")?.name, "AGE");
    assert!(matches!(
        table.field_index("MISSING"),
        Err(DbfError::FieldNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_open_missing_file_fails() {
    let temp = TempTable::with_prefix("missing");
    assert!(matches!(
        Table::open(temp.dir().join("nope.dbf"), OpenMode::ReadOnly),
        Err(DbfError::Io(_))
    ));
}

#[test]
fn test_scan_records_skips_deleted() -> Result<(), DbfError> {
    use dbfkit::executor::scan::{RecordScanner, ScanIterator, Scanner};

    let temp = TempTable::with_prefix("scan_records");
    let mut table = temp.create_people()?;
    for name in ["A", "B", "C", "D"] {
        table.append_record(&[name])?;
    }
    table.set_deleted(1, Some(true))?;

    let all: Vec<_> = table.scan_records().collect::<Result<Vec<_>, DbfError>>()?;
    assert_eq!(all.len(), 4);
    assert!(all[1].1);

    let mut scanner = RecordScanner::new(&mut table).skip_deleted();
    let batch = scanner.scan_batch(2)?;
    assert_eq!(batch.iter().map(|(row, _, _)| *row).collect::<Vec<_>>(), vec![0, 2]);
    scanner.reset();
    let rows: Vec<usize> = ScanIterator::new(scanner)
        .map(|item| item.map(|(row, _, _)| row))
        .collect::<Result<Vec<_>, DbfError>>()?;
    assert_eq!(rows, vec![0, 2, 3]);
    Ok(())
}
