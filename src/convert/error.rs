//! Converter error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure aborts the whole conversion run
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input missing or unreadable
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input is not a spreadsheet calamine understands
    #[error("'{}' is not a valid spreadsheet: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("'{}' contains no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
