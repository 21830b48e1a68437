//! Binds header clicks and toolbar actions to table operations.
//!
//! The controller replaces page-level event listeners with explicit calls:
//! [`TableController::initialize`] attaches a table once, and
//! [`TableController::dispatch`] routes a user event to the sorter, the CSV
//! exporter or the print renderer. Collaborators the core does not own
//! (charts, the loading indicator, the page-wide error alert) are reached
//! through [`ReportHooks`].

use crate::config::{TableConfig, ToolbarLabels};
use crate::csv_export::{CsvExporter, DownloadSink, ExportNaming};
use crate::error::{Result, TableError};
use crate::model::Table;
use crate::print::{PrintRenderer, PrintSink};
use crate::sort::{SortDirection, SortOutcome, TableSorter};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Toolbar container class.
pub const TOOLBAR_CLASS: &str = "export-container";

/// An action offered by a table toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarAction {
    ExportCsv,
    Print,
}

impl ToolbarAction {
    /// CSS class of the button.
    pub fn css_class(&self) -> &'static str {
        match self {
            ToolbarAction::ExportCsv => "csv-export",
            ToolbarAction::Print => "print-button",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarButton {
    pub action: ToolbarAction,
    pub label: String,
}

/// Export/print toolbar, placed immediately before its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolbar {
    pub table_id: String,
    pub container_class: &'static str,
    pub buttons: Vec<ToolbarButton>,
}

/// Click binding of one header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderBinding {
    pub column: usize,
    pub label: String,
}

/// Everything attached to a table by [`TableController::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub table_id: String,
    pub headers: Vec<HeaderBinding>,
    pub toolbar: Toolbar,
}

impl Binding {
    pub fn for_table(table: &Table, labels: &ToolbarLabels) -> Self {
        let headers = table
            .headers
            .iter()
            .enumerate()
            .map(|(column, header)| HeaderBinding {
                column,
                label: header.label.clone(),
            })
            .collect();

        let toolbar = Toolbar {
            table_id: table.id.clone(),
            container_class: TOOLBAR_CLASS,
            buttons: vec![
                ToolbarButton {
                    action: ToolbarAction::ExportCsv,
                    label: labels.csv_export.clone(),
                },
                ToolbarButton {
                    action: ToolbarAction::Print,
                    label: labels.print.clone(),
                },
            ],
        };

        Self {
            table_id: table.id.clone(),
            headers,
            toolbar,
        }
    }
}

/// A user interaction on an initialized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// Header cell clicked.
    HeaderClick(usize),
    /// CSV export button clicked; `date` names the file.
    ExportCsv { date: NaiveDate },
    /// Print button clicked.
    Print,
}

/// What a dispatched event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    Sorted(SortOutcome),
    Exported { filename: String },
    Printed { title: String },
}

/// Host collaborators. Every method defaults to a no-op.
pub trait ReportHooks {
    /// Redraw charts that mirror table data.
    fn refresh_charts(&mut self) {}

    fn show_loading(&mut self) {}

    fn hide_loading(&mut self) {}

    /// Page-wide fault handler; expected to hide the loading indicator and
    /// tell the user to reload.
    fn report_error(&mut self, _error: &TableError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ReportHooks for NoopHooks {}

/// Orchestrates sorting, export and print for a set of tables.
pub struct TableController<D, P, H = NoopHooks> {
    sorter: TableSorter,
    exporter: CsvExporter,
    printer: PrintRenderer,
    naming: ExportNaming,
    labels: ToolbarLabels,
    downloads: D,
    prints: P,
    hooks: H,
    bindings: HashMap<String, Binding>,
}

impl<D, P, H> TableController<D, P, H>
where
    D: DownloadSink,
    P: PrintSink,
    H: ReportHooks,
{
    pub fn new(config: &TableConfig, downloads: D, prints: P, hooks: H) -> Result<Self> {
        Ok(Self {
            sorter: TableSorter::for_locale(&config.locale)?,
            exporter: CsvExporter::new(),
            printer: PrintRenderer::new(config.print.clone()),
            naming: config.export.clone(),
            labels: config.toolbar.clone(),
            downloads,
            prints,
            hooks,
            bindings: HashMap::new(),
        })
    }

    /// Attach header and toolbar bindings to `table`. Calling this again for
    /// the same table id returns the existing binding unchanged.
    pub fn initialize(&mut self, table: &Table) -> &Binding {
        match self.bindings.entry(table.id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(
                    table = %table.id,
                    columns = table.column_count(),
                    "Table initialized"
                );
                entry.insert(Binding::for_table(table, &self.labels))
            }
        }
    }

    pub fn is_initialized(&self, table_id: &str) -> bool {
        self.bindings.contains_key(table_id)
    }

    pub fn binding(&self, table_id: &str) -> Option<&Binding> {
        self.bindings.get(table_id)
    }

    /// Handle one user event. Failures are passed to
    /// [`ReportHooks::report_error`] before being returned.
    pub fn dispatch(&mut self, table: &mut Table, event: TableEvent) -> Result<EventOutcome> {
        let result = self.ensure_initialized(table).and_then(|()| match event {
            TableEvent::HeaderClick(column) => {
                self.sorter.sort(table, column).map(EventOutcome::Sorted)
            }
            TableEvent::ExportCsv { date } => self.export(table, date),
            TableEvent::Print => self.print(table),
        });
        self.reported(result)
    }

    /// Sort an initialized table in an explicit direction, bypassing the
    /// header-click toggle. Failures reach the error hook like
    /// [`dispatch`](Self::dispatch) failures.
    pub fn sort_column(
        &mut self,
        table: &mut Table,
        column: usize,
        direction: SortDirection,
    ) -> Result<SortOutcome> {
        let result = self
            .ensure_initialized(table)
            .and_then(|()| self.sorter.sort_with_direction(table, column, direction));
        self.reported(result)
    }

    fn ensure_initialized(&self, table: &Table) -> Result<()> {
        if self.is_initialized(&table.id) {
            Ok(())
        } else {
            Err(TableError::NotInitialized {
                table_id: table.id.clone(),
            })
        }
    }

    fn reported<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|err| {
            self.hooks.report_error(&err);
            err
        })
    }

    fn export(&mut self, table: &Table, date: NaiveDate) -> Result<EventOutcome> {
        let filename = self.naming.filename_for(date);
        self.hooks.show_loading();
        self.exporter
            .export_to(table, &filename, &mut self.downloads)?;
        self.hooks.hide_loading();
        Ok(EventOutcome::Exported { filename })
    }

    fn print(&mut self, table: &Table) -> Result<EventOutcome> {
        self.hooks.show_loading();
        let document = self.printer.render(table);
        let title = document.title.clone();
        self.prints.open(document)?;
        self.hooks.hide_loading();
        Ok(EventOutcome::Printed { title })
    }

    /// Notify that table data changed outside the sort path.
    pub fn table_mutated(&mut self) {
        self.hooks.refresh_charts();
    }

    pub fn viewport_resized(&mut self) {
        self.hooks.refresh_charts();
    }

    pub fn sorter(&self) -> &TableSorter {
        &self.sorter
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn downloads(&self) -> &D {
        &self.downloads
    }

    pub fn prints(&self) -> &P {
        &self.prints
    }

    pub fn into_parts(self) -> (D, P, H) {
        (self.downloads, self.prints, self.hooks)
    }
}

/// Initialize every table on a page, returning one binding per table.
pub fn initialize_page<D, P, H>(
    controller: &mut TableController<D, P, H>,
    tables: &[Table],
) -> Vec<Binding>
where
    D: DownloadSink,
    P: PrintSink,
    H: ReportHooks,
{
    tables
        .iter()
        .map(|table| controller.initialize(table).clone())
        .collect()
}
