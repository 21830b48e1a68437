//! Standalone print view of a table.

use crate::config::PrintConfig;
use crate::error::Result;
use crate::html::{html_escape, render_table};
use crate::model::Table;
use tracing::{debug, info};

/// Inline style of the print view.
pub const PRINT_STYLE: &str = r#"<style>
            table { border-collapse: collapse; width: 100%; }
            th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
            th { background-color: #f5f5f5; }
            @media print {
                button { display: none; }
                table { page-break-inside: avoid; }
            }
        </style>"#;

const AUTO_PRINT_SCRIPT: &str = "<script>window.onload = () => window.print();</script>";

/// A transient print document, alive only while the print view is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    /// Table the view was rendered from.
    pub table_id: String,
    pub title: String,
    pub html: String,
}

/// Opens print documents; models the new viewing context plus print dialog.
///
/// Fire-and-forget: a successful `open` only means the view was handed over.
/// The outcome of the print dialog is never observable.
pub trait PrintSink {
    fn open(&mut self, document: PrintDocument) -> Result<()>;
}

/// Collects documents in memory.
impl PrintSink for Vec<PrintDocument> {
    fn open(&mut self, document: PrintDocument) -> Result<()> {
        self.push(document);
        Ok(())
    }
}

/// Renders print views from table snapshots.
#[derive(Debug, Clone, Default)]
pub struct PrintRenderer {
    config: PrintConfig,
}

impl PrintRenderer {
    pub fn new(config: PrintConfig) -> Self {
        Self { config }
    }

    fn title_for(&self, table: &Table) -> String {
        table
            .caption
            .clone()
            .or_else(|| self.config.title.clone())
            .unwrap_or_else(|| table.id.clone())
    }

    /// Render the print document. The table is only read.
    pub fn render(&self, table: &Table) -> PrintDocument {
        let title = self.title_for(table);
        let script = if self.config.auto_print {
            AUTO_PRINT_SCRIPT
        } else {
            ""
        };

        let html = format!(
            r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="UTF-8">
        <title>{title}</title>
        {style}
    </head>
    <body>
        {table}
        {script}
    </body>
</html>"#,
            title = html_escape(&title),
            style = PRINT_STYLE,
            table = render_table(table),
            script = script,
        );

        debug!(table = %table.id, bytes = html.len(), "Print view rendered");

        PrintDocument {
            table_id: table.id.clone(),
            title,
            html,
        }
    }

    /// Render and hand the document to `sink`.
    pub fn print_to<S: PrintSink + ?Sized>(&self, table: &Table, sink: &mut S) -> Result<()> {
        let document = self.render(table);
        sink.open(document)?;
        info!(table = %table.id, "Print view opened");
        Ok(())
    }
}
