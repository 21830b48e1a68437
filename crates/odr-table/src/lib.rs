//! Interactive report tables: sort, CSV export and print.
//!
//! A [`Table`] is the single source of truth for header labels, sort markers
//! and row order. Operations mutate or read it directly; markup is rendered
//! from it on demand.
//!
//! # Components
//!
//! - [`ValueComparator`]: numeric-if-both-numeric, otherwise locale collation
//! - [`TableSorter`]: stable header-click sort with asc/desc toggling
//! - [`CsvExporter`]: fully quoted CSV with a UTF-8 byte-order mark
//! - [`PrintRenderer`]: standalone print document of the current state
//! - [`TableController`]: binds header clicks and toolbar buttons
//!
//! # Example
//!
//! ```no_run
//! use odr_table::{Table, TableConfig, TableController, TableEvent, NoopHooks};
//! use odr_table::{ExportDocument, PrintDocument};
//!
//! let mut table = Table::new("usage", ["User", "Size"])
//!     .with_rows([vec!["alice", "10"], vec!["bob", "2"]]);
//!
//! let downloads: Vec<ExportDocument> = Vec::new();
//! let prints: Vec<PrintDocument> = Vec::new();
//! let mut controller =
//!     TableController::new(&TableConfig::default(), downloads, prints, NoopHooks).unwrap();
//! controller.initialize(&table);
//! controller.dispatch(&mut table, TableEvent::HeaderClick(1)).unwrap();
//! ```

pub mod compare;
pub mod config;
pub mod controller;
pub mod csv_export;
pub mod error;
pub mod html;
pub mod model;
pub mod print;
pub mod sort;

pub use compare::{parse_leading_number, trim_key, CellValue, ValueComparator, DEFAULT_LOCALE};
pub use config::{PrintConfig, RenderConfig, TableConfig, ToolbarLabels};
pub use controller::{
    initialize_page, Binding, EventOutcome, HeaderBinding, NoopHooks, ReportHooks, TableController,
    TableEvent, Toolbar, ToolbarAction, ToolbarButton,
};
pub use csv_export::{
    export_filename, CsvExporter, DownloadSink, ExportDocument, ExportNaming, CSV_MIME_TYPE,
    UTF8_BOM,
};
pub use error::{Result, TableError};
pub use html::{
    render_bound_table, render_page, render_page_print_style, render_table, render_toolbar,
    PAGE_PRINT_STYLE,
};
pub use model::{Cell, HeaderCell, Row, RowId, SortState, Table};
pub use print::{PrintDocument, PrintRenderer, PrintSink};
pub use sort::{SortDirection, SortOutcome, TableSorter};
