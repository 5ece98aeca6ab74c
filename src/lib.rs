//! Read, create, and update dBase (.dbf) attribute tables.
//!
//! ```no_run
//! use dbfkit::{FieldType, Table};
//!
//! let mut table = Table::create("parcels.dbf", None)?;
//! table.add_field("NAME", FieldType::String, 20, 0)?;
//! table.add_field("AREA", FieldType::Double, 10, 2)?;
//! table.append_record(&["Lot 7", "1204.5"])?;
//! assert_eq!(table.record_strings(0)?, vec!["Lot 7", "1204.50"]);
//! table.close()?;
//! # Ok::<(), dbfkit::DbfError>(())
//! ```

pub mod codepage;
pub mod executor;
pub mod storage;
pub mod types;
pub mod utils;

pub use codepage::{CodePageToken, DEFAULT_CODE_PAGE, resolve_encoding};
pub use executor::insert::{Inserter, RecordInserter, ValueShape};
pub use storage::table::{OpenMode, Table};
pub use types::{
    error::{DbfError, Result},
    field::{Field, FieldDescriptor, FieldType},
    value::{CellValue, Diagnostic, RowTarget, WriteOutcome},
};
