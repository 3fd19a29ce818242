use crate::domain::errors::ExportError;
use crate::domain::table::DataTable;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Writes tables as CSV spreadsheets into one directory
#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    dir: PathBuf,
}

impl SpreadsheetExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `table` to `{dir}/{file_name}` and returns the full path.
    ///
    /// An empty table is refused so no header-only file is left behind.
    pub fn export(&self, table: &DataTable, file_name: &str) -> Result<PathBuf, ExportError> {
        if table.is_empty() {
            return Err(ExportError::EmptyTable {
                name: file_name.to_string(),
            });
        }

        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let path = self.dir.join(file_name);
        let bytes = to_bytes(table)?;
        let mut file = File::create(&path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if let Err(source) = file.write_all(&bytes) {
            error!("SpreadsheetExporter: Failed to write {}: {}", path.display(), source);
            return Err(ExportError::Io {
                path: path.display().to_string(),
                source,
            });
        }

        info!(
            "SpreadsheetExporter: Saved {} rows to '{}'",
            table.row_count(),
            path.display()
        );
        Ok(path)
    }
}

/// Serializes a table as CSV with a header row
pub fn to_bytes(table: &DataTable) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(&table.columns).map_err(format_error)?;
    for row in &table.rows {
        wtr.write_record(row).map_err(format_error)?;
    }

    wtr.into_inner().map_err(|e| ExportError::Format {
        reason: e.to_string(),
    })
}

/// Reads a spreadsheet written by [`SpreadsheetExporter::export`] back into a table
pub fn load(path: &Path) -> Result<DataTable, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    from_reader(BufReader::new(file))
}

pub fn from_reader(reader: impl Read) -> Result<DataTable, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers().map_err(format_error)?.clone();
    let mut table = DataTable::new(headers.iter());

    for record in rdr.records() {
        let record = record.map_err(format_error)?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

fn format_error(e: csv::Error) -> ExportError {
    ExportError::Format {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison_table() -> DataTable {
        let mut table = DataTable::new(["Metrics", "AAPL", "MSFT"]);
        table.push_row(vec!["Highest Open Value".into(), "237.45".into(), "467.00".into()]);
        table.push_row(vec!["Lowest Close Value".into(), "165.00".into(), "366.50".into()]);
        table
    }

    #[test]
    fn test_to_bytes_quotes_only_when_needed() {
        let mut table = DataTable::new(["Metrics", "Value"]);
        table.push_row(vec!["Volume".into(), "1,234,567".into()]);

        let csv = String::from_utf8(to_bytes(&table).unwrap()).unwrap();
        assert_eq!(csv, "Metrics,Value\nVolume,\"1,234,567\"\n");
    }

    #[test]
    fn test_from_reader_restores_table() {
        let bytes = to_bytes(&comparison_table()).unwrap();
        let table = from_reader(bytes.as_slice()).unwrap();
        assert_eq!(table, comparison_table());
    }

    #[test]
    fn test_empty_table_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SpreadsheetExporter::new(dir.path());
        let err = exporter
            .export(&DataTable::new(["Date", "Close"]), "AAPL_gap_analysis.csv")
            .unwrap_err();

        assert!(matches!(err, ExportError::EmptyTable { .. }));
        assert!(!dir.path().join("AAPL_gap_analysis.csv").exists());
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SpreadsheetExporter::new(dir.path().join("nested/out"));
        let path = exporter
            .export(&comparison_table(), "AAPL_vs_MSFT_comparison.csv")
            .unwrap();

        assert!(path.ends_with("nested/out/AAPL_vs_MSFT_comparison.csv"));
        assert_eq!(load(&path).unwrap().row_count(), 2);
    }
}
