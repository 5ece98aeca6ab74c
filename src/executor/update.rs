use crate::{
    executor::{NumberParsing, write_value},
    storage::table::Table,
    types::{
        RowId,
        error::{DbfError, Result},
        value::WriteOutcome,
    },
};

impl Table {
    /// Replaces one cell of an existing record, addressed by field name.
    ///
    /// Same per-type rules as an insert: empty text is NULL, numeric cells take the
    /// numeric prefix of the value (no prefix at all fails `InvalidDouble`), and
    /// truncation, bad logical codes and bad dates are warnings.
    pub fn write_cell(
        &mut self,
        row: RowId,
        field_name: &str,
        value: &str,
    ) -> Result<WriteOutcome<()>> {
        let count = self.record_count();
        if row >= count {
            return Err(DbfError::RowOutOfRange { row, count });
        }
        let field_index = self.field_index(field_name)?;
        self.prepare_write(row)?;
        let diagnostics = write_value(self, field_index, value, NumberParsing::PrefixDouble)?;
        Ok(WriteOutcome::new((), diagnostics))
    }

    /// [`Table::write_cell`] for callers whose value may be missing altogether.
    pub fn update(
        &mut self,
        row: RowId,
        field_name: &str,
        value: Option<&str>,
    ) -> Result<WriteOutcome<()>> {
        let value = value.ok_or_else(|| DbfError::ValueRequired {
            what: format!("field {field_name}"),
        })?;
        self.write_cell(row, field_name, value)
    }
}
