//! Error types for table operations.

use thiserror::Error;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that can occur while sorting, exporting or printing a table.
///
/// A body row that is shorter than the sorted column is not an error: its
/// value reads as the empty string.
#[derive(Error, Debug)]
pub enum TableError {
    /// Sort column does not name a header cell.
    #[error("column {column} is out of range (table has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    /// Event dispatched to a table the controller never initialized.
    #[error("table '{table_id}' has not been initialized")]
    NotInitialized { table_id: String },

    /// Collator could not be built for the locale.
    #[error("unsupported collation locale '{locale}': {reason}")]
    Locale { locale: String, reason: String },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// CSV buffer could not be turned into text.
    #[error("CSV encoding error: {0}")]
    Encoding(String),

    /// Download sink refused the export document.
    #[error("download of '{filename}' failed: {reason}")]
    Download { filename: String, reason: String },

    /// Print sink could not open the print view.
    #[error("print view could not be opened: {0}")]
    Print(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TableError> for odr_common::Error {
    fn from(err: TableError) -> Self {
        match err {
            TableError::ColumnOutOfRange { column, columns } => {
                odr_common::Error::ColumnOutOfRange { column, columns }
            }
            TableError::NotInitialized { table_id } => {
                odr_common::Error::NotInitialized { table_id }
            }
            TableError::Locale { locale, reason } => odr_common::Error::Locale { locale, reason },
            TableError::Csv(e) => odr_common::Error::Export(e.to_string()),
            TableError::Encoding(reason) => odr_common::Error::Export(reason),
            TableError::Download { filename, reason } => {
                odr_common::Error::Download { filename, reason }
            }
            TableError::Print(reason) => odr_common::Error::Print(reason),
            TableError::Json(e) => odr_common::Error::Json(e),
        }
    }
}
