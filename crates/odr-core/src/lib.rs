//! Command-line host for odr report tables.
//!
//! Loads tables from JSON or CSV, drives them through the
//! [`odr_table::TableController`] with file-backed download and print sinks,
//! and provides the CLI's config, logging and exit-code layers.

pub mod config;
pub mod exit_codes;
pub mod host;
pub mod input;
pub mod logging;

pub use config::{load_config, AppConfig, ConfigError, ConfigOptions, ResolvedConfig};
pub use exit_codes::ExitCode;
pub use host::{CliHooks, FileDownloadSink, FilePrintSink, ERROR_ALERT};
pub use input::{load_table, parse_table, InputError, InputFormat};
