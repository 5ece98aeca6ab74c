use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    storage::table::{OpenMode, Table},
    types::{error::Result, field::FieldType},
};

/// A table path inside a private temporary directory, removed on drop
/// together with any sidecar files.
pub struct TempTable {
    dir: TempDir,
    pub path: PathBuf,
}

impl TempTable {
    pub fn with_prefix(prefix: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .expect("failed to create temp dir");
        let path = dir.path().join(format!("{}.dbf", prefix));
        Self { dir, path }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn create(&self) -> Result<Table> {
        Table::create(&self.path, None)
    }

    pub fn create_with_code_page(&self, code_page: &str) -> Result<Table> {
        Table::create(&self.path, Some(code_page))
    }

    pub fn open(&self, mode: OpenMode) -> Result<Table> {
        Table::open(&self.path, mode)
    }

    /// NAME (String, 20), AGE (Integer, 3), SCORE (Double, 6.2)
    pub fn create_people(&self) -> Result<Table> {
        let mut table = self.create()?;
        table.add_field("NAME", FieldType::String, 20, 0)?;
        table.add_field("AGE", FieldType::Integer, 3, 0)?;
        table.add_field("SCORE", FieldType::Double, 6, 2)?;
        Ok(table)
    }
}
