use crate::{
    executor::{NumberParsing, write_value},
    storage::table::Table,
    types::{
        RowId,
        error::Result,
        value::{Diagnostic, RowTarget, WriteOutcome},
    },
};

/// The two shapes in which a host can hand over a record's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Trailing positional arguments. Integer and Double cells take the numeric
    /// prefix of the value; `"3.7"` into an Integer field is stored as 4 (rounded by
    /// the zero-decimal format).
    Flat,
    /// One pre-structured list. Integer cells must hold a whole integer and Double
    /// cells a whole float.
    List,
}

impl ValueShape {
    fn number_parsing(&self) -> NumberParsing {
        match self {
            ValueShape::Flat => NumberParsing::Prefix,
            ValueShape::List => NumberParsing::Typed,
        }
    }
}

/// Trait for writing positional records into a table
pub trait Inserter {
    /// Write `values` into record `target`, first value to first field.
    /// Returns the effective record index.
    fn insert<S: AsRef<str>>(
        &mut self,
        target: RowTarget,
        values: &[S],
    ) -> Result<WriteOutcome<RowId>>;

    fn shape(&self) -> ValueShape;
}

/// Positional record writer bound to one table and one value shape.
///
/// Writing record `record_count` appends; any lower index overwrites that record's
/// cells in place. Nothing is shifted. A fatal parse failure stops the call, and
/// cells already written by the same call stay written.
pub struct RecordInserter<'a> {
    table: &'a mut Table,
    shape: ValueShape,
}

impl<'a> RecordInserter<'a> {
    pub fn new(table: &'a mut Table, shape: ValueShape) -> Self {
        Self { table, shape }
    }
}

impl Inserter for RecordInserter<'_> {
    fn insert<S: AsRef<str>>(
        &mut self,
        target: RowTarget,
        values: &[S],
    ) -> Result<WriteOutcome<RowId>> {
        let row = match target {
            RowTarget::Index(row) => row,
            RowTarget::End => self.table.record_count(),
        };
        self.table.prepare_write(row)?;

        let numbers = self.shape.number_parsing();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for (field_index, value) in values.iter().enumerate() {
            diagnostics.extend(write_value(self.table, field_index, value.as_ref(), numbers)?);
        }
        Ok(WriteOutcome::new(row, diagnostics))
    }

    fn shape(&self) -> ValueShape {
        self.shape
    }
}

impl Table {
    /// Positional write from flat arguments (lenient numeric parsing).
    pub fn write_record<S: AsRef<str>>(
        &mut self,
        row: RowId,
        values: &[S],
    ) -> Result<WriteOutcome<RowId>> {
        self.insert(RowTarget::Index(row), values, ValueShape::Flat)
    }

    /// Positional write from a structured list (typed numeric parsing).
    pub fn write_record_list<S: AsRef<str>>(
        &mut self,
        row: RowId,
        values: &[S],
    ) -> Result<WriteOutcome<RowId>> {
        self.insert(RowTarget::Index(row), values, ValueShape::List)
    }

    pub fn append_record<S: AsRef<str>>(&mut self, values: &[S]) -> Result<WriteOutcome<RowId>> {
        self.insert(RowTarget::End, values, ValueShape::Flat)
    }

    pub fn insert<S: AsRef<str>>(
        &mut self,
        target: RowTarget,
        values: &[S],
        shape: ValueShape,
    ) -> Result<WriteOutcome<RowId>> {
        RecordInserter::new(self, shape).insert(target, values)
    }
}
