use crate::{
    storage::table::Table,
    types::{FieldIndex, RowId, error::Result, value::CellValue},
};

pub trait Scanner {
    type Item;

    fn scan(&mut self) -> Result<Option<Self::Item>>;
    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Self::Item>>;
    fn reset(&mut self);
}

pub struct ScanIterator<S: Scanner> {
    scanner: S,
}

impl<S: Scanner> ScanIterator<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }
}

impl<S: Scanner> Iterator for ScanIterator<S> {
    type Item = Result<S::Item>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.scanner.scan() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Walks one column from the first record to the last.
pub struct ColumnScanner<'a> {
    table: &'a mut Table,
    field_index: FieldIndex,
    next_row: RowId,
}

impl<'a> ColumnScanner<'a> {
    pub fn new(table: &'a mut Table, field_name: &str) -> Result<Self> {
        let field_index = table.field_index(field_name)?;
        Ok(Self {
            table,
            field_index,
            next_row: 0,
        })
    }
}

impl Scanner for ColumnScanner<'_> {
    type Item = CellValue;

    fn scan(&mut self) -> Result<Option<CellValue>> {
        if self.next_row >= self.table.record_count() {
            return Ok(None);
        }
        let value = self.table.read_cell(self.next_row, self.field_index)?;
        self.next_row += 1;
        Ok(Some(value))
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<CellValue>> {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.scan()? {
                Some(value) => batch.push(value),
                None => break,
            }
        }
        Ok(batch)
    }

    fn reset(&mut self) {
        self.next_row = 0;
    }
}

/// Walks whole records, yielding `(row, deleted, cells)`.
pub struct RecordScanner<'a> {
    table: &'a mut Table,
    next_row: RowId,
    skip_deleted: bool,
}

impl<'a> RecordScanner<'a> {
    pub fn new(table: &'a mut Table) -> Self {
        Self {
            table,
            next_row: 0,
            skip_deleted: false,
        }
    }

    pub fn skip_deleted(mut self) -> Self {
        self.skip_deleted = true;
        self
    }
}

impl Scanner for RecordScanner<'_> {
    type Item = (RowId, bool, Vec<CellValue>);

    fn scan(&mut self) -> Result<Option<Self::Item>> {
        while self.next_row < self.table.record_count() {
            let row = self.next_row;
            self.next_row += 1;
            let deleted = self.table.is_deleted(row)?;
            if deleted && self.skip_deleted {
                continue;
            }
            return Ok(Some((row, deleted, self.table.read_record(row)?)));
        }
        Ok(None)
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Self::Item>> {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.scan()? {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        Ok(batch)
    }

    fn reset(&mut self) {
        self.next_row = 0;
    }
}

impl Table {
    /// Every record's cell for one field.
    pub fn read_column(&mut self, field_name: &str) -> Result<Vec<CellValue>> {
        ScanIterator::new(ColumnScanner::new(self, field_name)?).collect()
    }

    /// [`Table::read_column`] rendered for a host: NULL becomes the empty string.
    pub fn values(&mut self, field_name: &str) -> Result<Vec<String>> {
        Ok(self
            .read_column(field_name)?
            .into_iter()
            .map(CellValue::into_string)
            .collect())
    }

    pub fn scan_records(&mut self) -> ScanIterator<RecordScanner<'_>> {
        ScanIterator::new(RecordScanner::new(self))
    }
}
