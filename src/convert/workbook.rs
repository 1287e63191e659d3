//! Spreadsheet reading
//!
//! Wraps calamine: the whole file is read into memory and the format is
//! detected from its contents, not its extension.

use calamine::{open_workbook_auto_from_rs, Reader};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::error::ConvertError;
use super::table::Table;

/// Read the first sheet of a workbook into a [`Table`]
///
/// Other sheets are ignored.
pub fn read_first_sheet(path: &Path) -> Result<Table, ConvertError> {
    let bytes = fs::read(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let workbook_error = |source: calamine::Error| ConvertError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ConvertError::NoSheets {
            path: path.to_path_buf(),
        })?
        .map_err(workbook_error)?;

    Ok(Table::from_range(&range))
}
