//! Spreadsheet-to-CSV conversion
//!
//! Reads the first sheet of each input workbook and writes it out as CSV.
//! All inputs are read before any output is written, so a missing or broken
//! input leaves the output files untouched.

mod error;
mod table;
mod workbook;
mod writer;

use std::path::{Path, PathBuf};

pub use error::ConvertError;
pub use table::{normalize_headers, render_cell, Table};
pub use workbook::read_first_sheet;
pub use writer::write_csv;

/// Fixed input/output file names, relative to the working directory
pub const DEFAULT_JOBS: [(&str, &str); 2] = [
    ("African.xlsx", "African.csv"),
    ("Asian.xlsx", "Asian.csv"),
];

/// One workbook to convert and where its CSV goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// The fixed job list, resolved against `dir`
pub fn default_jobs(dir: &Path) -> Vec<ConversionJob> {
    DEFAULT_JOBS
        .iter()
        .map(|(input, output)| ConversionJob {
            input: dir.join(input),
            output: dir.join(output),
        })
        .collect()
}

/// Run every job, reading all inputs first
pub fn convert_all(jobs: &[ConversionJob]) -> Result<(), ConvertError> {
    let tables = jobs
        .iter()
        .map(|job| read_first_sheet(&job.input))
        .collect::<Result<Vec<_>, _>>()?;

    for (job, table) in jobs.iter().zip(&tables) {
        write_csv(table, &job.output)?;
    }
    Ok(())
}
