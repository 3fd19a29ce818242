pub mod file_names;
pub mod spreadsheet;

pub use spreadsheet::SpreadsheetExporter;
