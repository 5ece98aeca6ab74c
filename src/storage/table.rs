use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::{
    codepage::{self, CodePageToken, DEFAULT_CODE_PAGE, Transcoder},
    storage::{
        CODE_PAGE_SIDECAR_EXT, DATE_WIDTH, DBF_HEADER_SIZE, END_OF_FILE, FIELD_DESCRIPTOR_SIZE,
        header::{self, DbfHeader, FieldEntry},
        record::{self, RecordBuffer, ZERO_DATE},
    },
    types::{
        FieldIndex, RowId,
        error::{DbfError, Result},
        field::{self, Field, FieldDescriptor, FieldType},
        value::{CellValue, Diagnostic},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadWrite,
    ReadOnly,
}

/// An open .dbf attribute table.
///
/// The table keeps one record buffered in memory; cell writes land in that buffer
/// and reach the file when another record is touched, on [`Table::flush`], or on
/// [`Table::close`]. The header (record count, last-update date) is rewritten on
/// flush whenever records were appended.
pub struct Table {
    path: PathBuf,
    file: File,
    mode: OpenMode,
    header: DbfHeader,
    field_entries: Vec<FieldEntry>,
    fields: Vec<Field>,
    code_page: CodePageToken,
    encoding: Option<&'static str>,
    transcoder: Transcoder,
    current: Option<RecordBuffer>,
    header_dirty: bool,
    closed: bool,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)?;

        let mut header_buffer = vec![0u8; DBF_HEADER_SIZE];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header_buffer)?;
        let header = DbfHeader::from_bytes(&header_buffer)?;

        let mut descriptor_buffer = vec![0u8; header.header_length as usize - DBF_HEADER_SIZE];
        file.read_exact(&mut descriptor_buffer)?;
        let field_entries = header::parse_field_entries(&header, &descriptor_buffer)?;

        let code_page = match read_sidecar(path)? {
            Some(name) => CodePageToken::parse(&name),
            None => CodePageToken::from(header.language_driver),
        };
        let encoding = codepage::resolve_encoding(&code_page);
        let transcoder = Transcoder::bind(encoding);

        let mut offset = 1;
        let fields = field_entries
            .iter()
            .map(|entry| {
                let field = Field {
                    name: transcoder.decode(&entry.name).into_owned(),
                    field_type: FieldType::from_native(entry.native, entry.width, entry.decimals),
                    native: entry.native,
                    width: entry.width,
                    precision: entry.decimals,
                    offset,
                };
                offset += entry.width as usize;
                field
            })
            .collect();

        log::info!(
            "Opened table {} ({} records, {} fields, code page {})",
            path.display(),
            header.record_count,
            field_entries.len(),
            code_page
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mode,
            header,
            field_entries,
            fields,
            code_page,
            encoding,
            transcoder,
            current: None,
            header_dirty: false,
            closed: false,
        })
    }

    /// Creates an empty table: no fields, no records. `code_page` defaults to
    /// [`DEFAULT_CODE_PAGE`]. An `LDID/<n>` token within 0-255 is stamped into the
    /// header; anything else is recorded in a `.cpg` sidecar.
    pub fn create<P: AsRef<Path>>(path: P, code_page: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let code_page = CodePageToken::parse(code_page.unwrap_or(DEFAULT_CODE_PAGE));

        let sidecar = sidecar_path(path);
        match code_page.header_byte() {
            Some(_) => remove_if_exists(&sidecar)?,
            None => fs::write(&sidecar, code_page.to_string())?,
        }

        let header = DbfHeader {
            language_driver: code_page.header_byte().unwrap_or(0),
            ..Default::default()
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&header::encode_header_block(&header, &[]))?;
        file.write_all(&[END_OF_FILE])?;
        file.flush()?;

        let encoding = codepage::resolve_encoding(&code_page);
        log::info!("Created table {} (code page {})", path.display(), code_page);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mode: OpenMode::ReadWrite,
            header,
            field_entries: Vec::new(),
            fields: Vec::new(),
            transcoder: Transcoder::bind(encoding),
            code_page,
            encoding,
            current: None,
            header_dirty: false,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn record_count(&self) -> usize {
        self.header.record_count as usize
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// `(record_count, field_count)`
    pub fn info(&self) -> (usize, usize) {
        (self.record_count(), self.field_count())
    }

    /// Resolved encoding name, or the raw code page token when it is unmapped.
    pub fn codepage(&self) -> String {
        match self.encoding {
            Some(name) => name.to_string(),
            None => self.code_page.to_string(),
        }
    }

    pub fn code_page_token(&self) -> &CodePageToken {
        &self.code_page
    }

    pub fn encoding(&self) -> Option<&'static str> {
        self.encoding
    }

    pub fn transcoder(&self) -> Transcoder {
        self.transcoder
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_descriptors(&self) -> Vec<FieldDescriptor> {
        self.fields.iter().map(Field::descriptor).collect()
    }

    /// Field lookup ignores ASCII case, as dBase tools do.
    pub fn field_index(&self, name: &str) -> Result<FieldIndex> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DbfError::FieldNotFound {
                name: name.to_string(),
            })
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        let index = self.field_index(name)?;
        Ok(&self.fields[index])
    }

    pub fn field_descriptor(&self, name: &str) -> Result<FieldDescriptor> {
        self.field(name).map(Field::descriptor)
    }

    /// Parses a type token (`"String"`, `"C"`, `"N"`, ...) and adds the field.
    pub fn add_field_token(
        &mut self,
        name: &str,
        type_token: &str,
        width: i64,
        precision: i64,
    ) -> Result<FieldIndex> {
        field::validate_field_name(name)?;
        let field_type = FieldType::from_token(type_token)?;
        self.add_field(name, field_type, width, precision)
    }

    /// Appends a column. Only allowed on a writable table that holds no records yet.
    /// Date columns are always 8 wide and logical columns 1 wide.
    pub fn add_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        width: i64,
        precision: i64,
    ) -> Result<FieldIndex> {
        field::validate_field_name(name)?;
        let native = field_type.native_code().ok_or_else(|| DbfError::InvalidType {
            token: field_type.to_string(),
        })?;
        let mut width = field::validate_width(width)?;
        let precision = field::validate_precision(field_type, width as i64, precision)?;
        match field_type {
            FieldType::Date => width = DATE_WIDTH,
            FieldType::Logical => width = 1,
            _ => {}
        }

        if self.mode == OpenMode::ReadOnly || self.header.record_count > 0 {
            return Err(DbfError::SchemaFrozen);
        }
        let record_length = self.header.record_length as usize + width as usize;
        let header_length = self.header.header_length as usize + FIELD_DESCRIPTOR_SIZE;
        if record_length > u16::MAX as usize || header_length > u16::MAX as usize {
            return Err(DbfError::InvalidWidth {
                width: width as i64,
            });
        }

        let (name_bytes, _) = self.transcoder.encode(name);
        let entry = FieldEntry {
            name: name_bytes.into_owned(),
            native,
            width,
            decimals: precision,
        };
        self.fields.push(Field {
            name: name.to_string(),
            field_type,
            native,
            width,
            precision,
            offset: self.header.record_length as usize,
        });
        self.field_entries.push(entry);
        self.header.record_length = record_length as u16;
        self.header.header_length = header_length as u16;

        self.write_header()?;
        self.file.write_all(&[END_OF_FILE])?;
        self.file.set_len(header_length as u64 + 1)?;
        self.file.flush()?;

        Ok(self.fields.len() - 1)
    }

    fn check_row(&self, row: RowId) -> Result<()> {
        if row >= self.record_count() {
            return Err(DbfError::RowOutOfRange {
                row,
                count: self.record_count(),
            });
        }
        Ok(())
    }

    fn check_field(&self, index: FieldIndex) -> Result<()> {
        if index >= self.fields.len() {
            return Err(DbfError::FieldOutOfRange {
                index,
                count: self.fields.len(),
            });
        }
        Ok(())
    }

    pub fn read_cell(&mut self, row: RowId, field_index: FieldIndex) -> Result<CellValue> {
        self.check_row(row)?;
        self.check_field(field_index)?;
        let transcoder = self.transcoder;
        self.load_record(row)?;
        let field = &self.fields[field_index];
        Ok(match &self.current {
            Some(buffer) => record::render_cell(field, buffer.cell(field), &transcoder),
            None => CellValue::Null,
        })
    }

    pub fn read_record(&mut self, row: RowId) -> Result<Vec<CellValue>> {
        self.check_row(row)?;
        let transcoder = self.transcoder;
        self.load_record(row)?;
        let Some(buffer) = &self.current else {
            return Ok(Vec::new());
        };
        Ok(self
            .fields
            .iter()
            .map(|field| record::render_cell(field, buffer.cell(field), &transcoder))
            .collect())
    }

    /// One string per field, NULL rendered as the empty string.
    pub fn record_strings(&mut self, row: RowId) -> Result<Vec<String>> {
        Ok(self
            .read_record(row)?
            .into_iter()
            .map(CellValue::into_string)
            .collect())
    }

    pub fn is_deleted(&mut self, row: RowId) -> Result<bool> {
        self.check_row(row)?;
        Ok(self.load_record(row)?.is_deleted())
    }

    /// With `None` only reports the current flag; otherwise sets it and reports the result.
    pub fn set_deleted(&mut self, row: RowId, flag: Option<bool>) -> Result<bool> {
        self.check_row(row)?;
        let Some(flag) = flag else {
            return self.is_deleted(row);
        };
        if self.mode == OpenMode::ReadOnly {
            return Err(DbfError::FlagWriteFailed { row });
        }
        let buffer = self.load_record(row)?;
        buffer.set_deleted(flag);
        Ok(buffer.is_deleted())
    }

    /// Explicit NULL marker for any field type. `row` may be one past the last record.
    pub fn write_null(&mut self, row: RowId, field_index: FieldIndex) -> Result<()> {
        self.check_field(field_index)?;
        self.prepare_write(row)?;
        self.write_null_cell(field_index);
        Ok(())
    }

    pub(crate) fn write_null_cell(&mut self, field_index: FieldIndex) {
        let fill = record::null_fill(&self.fields[field_index]);
        self.store_cell(field_index, &fill);
    }

    /// Makes `row` the buffered record for writing, appending a blank record when
    /// `row == record_count`.
    pub(crate) fn prepare_write(&mut self, row: RowId) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(DbfError::ReadOnly);
        }
        let count = self.record_count();
        if row > count {
            return Err(DbfError::RowOutOfRange { row, count });
        }
        if row == count {
            self.append_blank_record()?;
        } else {
            self.load_record(row)?;
        }
        Ok(())
    }

    fn store_cell(&mut self, field_index: FieldIndex, bytes: &[u8]) {
        let field = &self.fields[field_index];
        if let Some(buffer) = self.current.as_mut() {
            buffer.put_cell(field, bytes);
        }
    }

    pub(crate) fn write_string_cell(
        &mut self,
        field_index: FieldIndex,
        value: &str,
    ) -> Vec<Diagnostic> {
        let field = &self.fields[field_index];
        let (bytes, replaced, clipped) = self.transcoder.encode_clipped(value, field.width());
        let mut diagnostics = Vec::new();
        if replaced {
            diagnostics.push(Diagnostic::Unmappable {
                field: field.name.clone(),
                value: value.to_string(),
            });
        }
        if clipped {
            diagnostics.push(Diagnostic::StringTruncated {
                field: field.name.clone(),
                value: value.to_string(),
            });
        }
        self.store_cell(field_index, &bytes);
        diagnostics
    }

    pub(crate) fn write_number_cell(
        &mut self,
        field_index: FieldIndex,
        value: f64,
    ) -> Option<Diagnostic> {
        let field = &self.fields[field_index];
        let (bytes, truncated) =
            record::format_number(value, field.width(), field.precision as usize);
        let diagnostic = truncated.then(|| Diagnostic::NumberTruncated {
            field: field.name.clone(),
            value: value.to_string(),
        });
        self.store_cell(field_index, &bytes);
        diagnostic
    }

    pub(crate) fn write_logical_cell(
        &mut self,
        field_index: FieldIndex,
        value: &str,
    ) -> Option<Diagnostic> {
        match value.bytes().next() {
            Some(code) if record::is_logical_code(code) => {
                self.store_cell(field_index, &[code]);
                None
            }
            _ => Some(Diagnostic::LogicalUnrecognized {
                field: self.fields[field_index].name.clone(),
                value: value.to_string(),
            }),
        }
    }

    pub(crate) fn write_date_cell(
        &mut self,
        field_index: FieldIndex,
        value: &str,
    ) -> Option<Diagnostic> {
        match record::parse_date(value) {
            Some(date) => {
                self.store_cell(field_index, record::format_date(date).as_bytes());
                None
            }
            None => {
                self.store_cell(field_index, ZERO_DATE.as_bytes());
                Some(Diagnostic::DateUnparseable {
                    field: self.fields[field_index].name.clone(),
                    value: value.to_string(),
                })
            }
        }
    }

    fn record_offset(&self, row: RowId) -> u64 {
        self.header.header_length as u64 + row as u64 * self.header.record_length as u64
    }

    fn read_record_bytes(&mut self, row: RowId) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; self.header.record_length as usize];
        self.file.seek(SeekFrom::Start(self.record_offset(row)))?;
        self.file.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn load_record(&mut self, row: RowId) -> Result<&mut RecordBuffer> {
        let buffer = match self.current.take() {
            Some(buffer) if buffer.row == row => buffer,
            previous => {
                if let Some(mut previous) = previous {
                    if let Err(e) = self.write_record_buffer(&mut previous) {
                        self.current = Some(previous);
                        return Err(e);
                    }
                }
                RecordBuffer::from_bytes(row, self.read_record_bytes(row)?)
            }
        };
        Ok(self.current.insert(buffer))
    }

    fn append_blank_record(&mut self) -> Result<()> {
        self.flush_record()?;
        let row = self.record_count();
        self.header.record_count += 1;
        self.header_dirty = true;
        self.current = Some(RecordBuffer::blank(row, self.header.record_length as usize));
        log::debug!("Appended record {} to {}", row, self.path.display());
        Ok(())
    }

    fn write_record_buffer(&mut self, buffer: &mut RecordBuffer) -> Result<()> {
        if !buffer.dirty {
            return Ok(());
        }
        self.file.seek(SeekFrom::Start(self.record_offset(buffer.row)))?;
        self.file.write_all(&buffer.bytes)?;
        if buffer.row + 1 == self.record_count() {
            self.file.write_all(&[END_OF_FILE])?;
        }
        buffer.dirty = false;
        Ok(())
    }

    fn flush_record(&mut self) -> Result<()> {
        if let Some(mut buffer) = self.current.take() {
            let result = self.write_record_buffer(&mut buffer);
            self.current = Some(buffer);
            result?;
        }
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.header.last_update = header::today();
        let bytes = header::encode_header_block(&self.header, &self.field_entries);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    /// Writes the buffered record and, if records were appended, the header.
    pub fn flush(&mut self) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Ok(());
        }
        self.flush_record()?;
        if self.header_dirty {
            self.write_header()?;
            self.header_dirty = false;
        }
        self.file.flush()?;
        log::debug!("Flushed {}", self.path.display());
        Ok(())
    }

    /// Flushes pending writes and releases the file. The table cannot be used afterwards.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush();
        self.closed = true;
        result
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        log::warn!("Table {} dropped without close; flushing", self.path.display());
        if let Err(e) = self.flush() {
            log::warn!("Failed to flush {}: {}", self.path.display(), e);
        }
    }
}

fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension(CODE_PAGE_SIDECAR_EXT)
}

/// First line of the `.cpg` sidecar, if one exists and is not blank.
fn read_sidecar(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(sidecar_path(path)) {
        Ok(contents) => Ok(contents
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
