//! Table input loading.
//!
//! Two formats are accepted, chosen by file extension:
//!
//! - `.json`: either a serialized [`Table`] (as written by `odr sort --output`,
//!   sort markers included) or the plain shape
//!   `{"id"?, "caption"?, "headers": [..], "rows": [[..], ..]}`
//! - `.csv`: first record is the header row; records may be ragged, so
//!   malformed rows survive loading. A leading byte-order mark is ignored,
//!   which lets an exported file be loaded again.
//!
//! Tables without an id take the file stem.

use odr_table::{Table, UTF8_BOM};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported input format '{extension}': expected .json or .csv")]
    UnsupportedFormat { extension: String },

    #[error("invalid JSON table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV table: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV input has no header row")]
    MissingHeader,
}

impl From<InputError> for odr_common::Error {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Io { source, .. } => odr_common::Error::Io(source),
            other => odr_common::Error::Input(other.to_string()),
        }
    }
}

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Format implied by a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            _ => Err(InputError::UnsupportedFormat { extension }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlainTable {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTable {
    Full(Table),
    Plain(PlainTable),
}

/// Load a table from `path`.
pub fn load_table(path: &Path) -> Result<Table, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = InputFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let fallback_id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("table");

    let table = parse_table(&text, format, fallback_id)?;
    debug!(
        path = %path.display(),
        table = %table.id,
        columns = table.column_count(),
        rows = table.row_count(),
        "Table loaded"
    );
    Ok(table)
}

/// Parse table text in the given format.
pub fn parse_table(text: &str, format: InputFormat, fallback_id: &str) -> Result<Table, InputError> {
    match format {
        InputFormat::Json => parse_json_table(text, fallback_id),
        InputFormat::Csv => parse_csv_table(text, fallback_id),
    }
}

pub fn parse_json_table(text: &str, fallback_id: &str) -> Result<Table, InputError> {
    let table = match serde_json::from_str::<JsonTable>(text)? {
        JsonTable::Full(table) => table,
        JsonTable::Plain(plain) => {
            let mut table = Table::new(
                plain.id.unwrap_or_else(|| fallback_id.to_string()),
                plain.headers,
            )
            .with_rows(plain.rows);
            table.caption = plain.caption;
            table
        }
    };
    Ok(table)
}

pub fn parse_csv_table(text: &str, fallback_id: &str) -> Result<Table, InputError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = records.next().ok_or(InputError::MissingHeader)??;
    let mut table = Table::new(fallback_id, header.iter());
    for record in records {
        table.push_row(record?.iter());
    }
    Ok(table)
}
