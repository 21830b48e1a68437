//! CSV export of a table's current state.
//!
//! Every field is quoted and inner quotes are doubled, fields are joined by
//! commas and lines by `\n`. The downloadable document carries a UTF-8
//! byte-order mark so spreadsheet tools detect the encoding of Japanese text.

use crate::error::{Result, TableError};
use crate::model::Table;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// MIME type of exported documents.
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

/// Byte-order mark prepended to exported documents.
pub const UTF8_BOM: &str = "\u{FEFF}";

/// A transient, downloadable CSV document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub mime_type: String,
    /// BOM followed by the CSV text.
    pub bytes: Vec<u8>,
}

impl ExportDocument {
    /// CSV text without the byte-order mark.
    pub fn csv_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes)
            .ok()
            .map(|text| text.strip_prefix(UTF8_BOM).unwrap_or(text))
    }
}

/// Receives export documents; models the client-side download.
///
/// Delivery is one-shot: the sink owns the document afterwards and the
/// exporter keeps nothing.
pub trait DownloadSink {
    fn deliver(&mut self, document: ExportDocument) -> Result<()>;
}

/// Collects documents in memory.
impl DownloadSink for Vec<ExportDocument> {
    fn deliver(&mut self, document: ExportDocument) -> Result<()> {
        self.push(document);
        Ok(())
    }
}

/// Export filename scheme: `<prefix>_<YYYYMMDD>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNaming {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "onedrive_report".to_string()
}

impl Default for ExportNaming {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl ExportNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn filename_for(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.prefix, date.format("%Y%m%d"))
    }
}

/// Default export filename for `date`.
pub fn export_filename(date: NaiveDate) -> String {
    ExportNaming::default().filename_for(date)
}

/// One fully quoted CSV line, without its terminator.
fn encode_record(record: &[&str]) -> Result<String> {
    if record.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;

    let buffer = writer
        .into_inner()
        .map_err(|e| TableError::Encoding(e.to_string()))?;
    let mut line = String::from_utf8(buffer).map_err(|e| TableError::Encoding(e.to_string()))?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Serializes tables to CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// CSV text of every row (header first), without a trailing newline.
    ///
    /// A record with no cells becomes an empty line.
    pub fn to_csv(&self, table: &Table) -> Result<String> {
        let lines = table
            .records()
            .map(|record| encode_record(&record))
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    /// Build the downloadable document for `table`.
    pub fn export(&self, table: &Table, filename: &str) -> Result<ExportDocument> {
        let csv = self.to_csv(table)?;
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + csv.len());
        bytes.extend_from_slice(UTF8_BOM.as_bytes());
        bytes.extend_from_slice(csv.as_bytes());

        debug!(
            table = %table.id,
            filename,
            rows = table.row_count() + 1,
            "CSV document built"
        );

        Ok(ExportDocument {
            filename: filename.to_string(),
            mime_type: CSV_MIME_TYPE.to_string(),
            bytes,
        })
    }

    /// Build the document and hand it to `sink`.
    pub fn export_to<S: DownloadSink + ?Sized>(
        &self,
        table: &Table,
        filename: &str,
        sink: &mut S,
    ) -> Result<()> {
        let document = self.export(table, filename)?;
        let bytes = document.bytes.len();
        sink.deliver(document)?;
        info!(table = %table.id, filename, bytes, "CSV export delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted() -> Table {
        Table::new("t", ["Name", "Comment"]).with_rows([vec!["a", r#"He said "hi", ok"#]])
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = CsvExporter::new().to_csv(&quoted()).unwrap();
        assert_eq!(
            csv,
            "\"Name\",\"Comment\"\n\"a\",\"He said \"\"hi\"\", ok\""
        );
    }

    #[test]
    fn test_every_field_quoted_including_empty() {
        let table = Table::new("t", ["x", "y"]).with_rows([vec!["", "1"]]);
        let csv = CsvExporter::new().to_csv(&table).unwrap();
        assert_eq!(csv, "\"x\",\"y\"\n\"\",\"1\"");
    }

    #[test]
    fn test_short_rows_export_their_own_cells() {
        let table = Table::new("t", ["x", "y"]).with_rows([vec!["only"]]);
        let csv = CsvExporter::new().to_csv(&table).unwrap();
        assert_eq!(csv, "\"x\",\"y\"\n\"only\"");
    }

    #[test]
    fn test_row_without_cells_exports_empty_line() {
        let mut table = Table::new("t", ["a"]).with_rows([vec!["1"]]);
        table.push_row(Vec::<String>::new());
        table.push_row(["2"]);
        let csv = CsvExporter::new().to_csv(&table).unwrap();
        assert_eq!(csv, "\"a\"\n\"1\"\n\n\"2\"");
    }

    #[test]
    fn test_multiline_field_stays_quoted() {
        let table = Table::new("t", ["note"]).with_rows([vec!["line one\nline two"]]);
        let csv = CsvExporter::new().to_csv(&table).unwrap();
        assert_eq!(csv, "\"note\"\n\"line one\nline two\"");
    }

    #[test]
    fn test_export_document_has_bom_and_mime() {
        let doc = CsvExporter::new()
            .export(&quoted(), "onedrive_report_20240305.csv")
            .unwrap();
        assert_eq!(&doc.bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(doc.mime_type, "text/csv;charset=utf-8;");
        assert_eq!(doc.filename, "onedrive_report_20240305.csv");
        assert!(doc.csv_text().unwrap().starts_with("\"Name\""));
    }

    #[test]
    fn test_export_to_sink() {
        let mut sink: Vec<ExportDocument> = Vec::new();
        CsvExporter::new()
            .export_to(&quoted(), "out.csv", &mut sink)
            .unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].filename, "out.csv");
    }

    #[test]
    fn test_filename_for_fixed_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_filename(date), "onedrive_report_20240305.csv");
        assert_eq!(
            ExportNaming::new("usage").filename_for(date),
            "usage_20240305.csv"
        );
    }

    #[test]
    fn test_japanese_text_survives() {
        let table = Table::new("t", ["ユーザー"]).with_rows([vec!["山田"]]);
        let doc = CsvExporter::new().export(&table, "x.csv").unwrap();
        assert_eq!(doc.csv_text(), Some("\"ユーザー\"\n\"山田\""));
    }
}
