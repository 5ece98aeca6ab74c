use dbfkit::{CellValue, DbfError, OpenMode, utils::mock::TempTable};

#[test]
fn test_update_single_cell() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_cell");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;

    let outcome = table.write_cell(0, "NAME", "Bob")?;
    assert!(outcome.is_clean());
    assert_eq!(table.record_strings(0)?, vec!["Bob", "30", "91.50"]);
    table.close()?;

    let mut reopened = temp.open(OpenMode::ReadOnly)?;
    assert_eq!(reopened.record_strings(0)?, vec!["Bob", "30", "91.50"]);
    Ok(())
}

#[test]
fn test_update_requires_existing_row() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_bounds");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice"])?;

    // Unlike an insert, an update never appends
    assert!(matches!(
        table.write_cell(1, "NAME", "Bob"),
        Err(DbfError::RowOutOfRange { row: 1, count: 1 })
    ));
    assert_eq!(table.record_count(), 1);
    Ok(())
}

#[test]
fn test_update_unknown_field() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_unknown");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice"])?;

    match table.write_cell(0, "HEIGHT", "180") {
        Err(DbfError::FieldNotFound { name }) => assert_eq!(name, "HEIGHT"),
        other => panic!("Expected FieldNotFound, got {:?}", other.map(|o| o.value)),
    }
    Ok(())
}

#[test]
fn test_update_field_name_case_insensitive() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_case");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30"])?;

    table.write_cell(0, "age", "31")?;
    assert_eq!(table.values("AGE")?, vec!["31"]);
    Ok(())
}

#[test]
fn test_update_value_required() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_missing");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice"])?;

    assert!(matches!(
        table.update(0, "NAME", None),
        Err(DbfError::ValueRequired { .. })
    ));
    table.update(0, "NAME", Some("Eve"))?;
    assert_eq!(table.values("NAME")?, vec!["Eve"]);
    Ok(())
}

#[test]
fn test_update_numbers() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_numbers");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;

    // Both numeric types report InvalidDouble when no prefix parses
    assert!(matches!(
        table.write_cell(0, "AGE", "abc"),
        Err(DbfError::InvalidDouble { .. })
    ));
    assert!(matches!(
        table.write_cell(0, "SCORE", "x1"),
        Err(DbfError::InvalidDouble { .. })
    ));

    assert!(matches!(
        table.write_cell(0, "SCORE", "1e400"),
        Err(DbfError::InvalidDouble { .. })
    ));

    table.write_cell(0, "SCORE", "12.5kg")?;
    assert_eq!(table.values("SCORE")?, vec!["12.50"]);
    assert_eq!(table.values("AGE")?, vec!["30"]);
    Ok(())
}

#[test]
fn test_update_empty_value_is_null() -> Result<(), DbfError> {
    let temp = TempTable::with_prefix("update_null");
    let mut table = temp.create_people()?;
    table.append_record(&["Alice", "30", "91.50"])?;

    table.write_cell(0, "SCORE", "")?;
    table.write_cell(0, "NAME", "")?;
    assert_eq!(
        table.read_record(0)?,
        vec![
            CellValue::Null,
            CellValue::Text("30".to_string()),
            CellValue::Null
        ]
    );
    Ok(())
}
