//! CSV output

use std::path::Path;

use super::error::ConvertError;
use super::table::Table;

/// Write a table as comma-separated UTF-8, header first, `\n` line endings
///
/// The file is created or truncated. Fields are quoted only when needed.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), ConvertError> {
    let write_error = |source: csv::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(write_error)?;

    if !table.is_empty() {
        writer.write_record(&table.headers).map_err(write_error)?;
        for row in &table.rows {
            writer.write_record(row).map_err(write_error)?;
        }
    }

    writer
        .flush()
        .map_err(|e| write_error(csv::Error::from(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table {
            headers: vec!["Country".into(), "Note".into()],
            rows: vec![
                vec!["Côte d'Ivoire".into(), "cocoa, coffee".into()],
                vec!["Chad".into(), "said \"hi\"".into()],
            ],
        };

        write_csv(&table, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Country,Note\nCôte d'Ivoire,\"cocoa, coffee\"\nChad,\"said \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_empty_table_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        write_csv(&Table::default(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");
        let err = write_csv(&Table::default(), &path).unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
    }
}
