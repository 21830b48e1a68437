//! File-backed host collaborators for the CLI.
//!
//! Downloads land in an output directory under their export filename;
//! print views are written as `print_<table id>.html` next to them. The
//! host hooks have no charts or loading indicator to drive, so they only
//! log and remember the user-facing alert.

use odr_table::{
    DownloadSink, ExportDocument, PrintDocument, PrintSink, ReportHooks, Result, TableError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Alert shown to the user when an operation fails.
pub const ERROR_ALERT: &str = "エラーが発生しました。ページを更新してください。";

fn write_output(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Replace anything but ASCII alphanumerics, `-` and `_` with `_`.
pub fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes export documents into a directory.
#[derive(Debug)]
pub struct FileDownloadSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for FileDownloadSink {
    fn deliver(&mut self, document: ExportDocument) -> Result<()> {
        let path = write_output(&self.dir, &document.filename, &document.bytes).map_err(|e| {
            TableError::Download {
                filename: document.filename.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(path = %path.display(), mime = %document.mime_type, "Download written");
        self.written.push(path);
        Ok(())
    }
}

/// Writes print documents into a directory.
#[derive(Debug)]
pub struct FilePrintSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FilePrintSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn filename_for(table_id: &str) -> String {
        format!("print_{}.html", file_safe(table_id))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PrintSink for FilePrintSink {
    fn open(&mut self, document: PrintDocument) -> Result<()> {
        let name = Self::filename_for(&document.table_id);
        let path = write_output(&self.dir, &name, document.html.as_bytes())
            .map_err(|e| TableError::Print(format!("{}: {}", name, e)))?;
        info!(path = %path.display(), title = %document.title, "Print view written");
        self.written.push(path);
        Ok(())
    }
}

/// Hooks for a terminal host.
#[derive(Debug, Default)]
pub struct CliHooks {
    loading: bool,
    chart_refreshes: usize,
    alerts: Vec<String>,
}

impl CliHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn chart_refreshes(&self) -> usize {
        self.chart_refreshes
    }

    /// Alerts raised by failed operations.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl ReportHooks for CliHooks {
    fn refresh_charts(&mut self) {
        self.chart_refreshes += 1;
        debug!("No charts attached; refresh skipped");
    }

    fn show_loading(&mut self) {
        self.loading = true;
        debug!("Loading");
    }

    fn hide_loading(&mut self) {
        self.loading = false;
        debug!("Loading finished");
    }

    fn report_error(&mut self, err: &TableError) {
        error!(error = %err, "Table operation failed");
        self.loading = false;
        self.alerts.push(ERROR_ALERT.to_string());
    }
}
