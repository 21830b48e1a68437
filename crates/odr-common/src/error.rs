//! Error types for odr.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Column Out of Range
//!   Reason: column 7 is out of range (table has 3 columns)
//!   Fix: Pick a column index between 0 and the number of header cells minus one.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "table",
//!   "message": "column 7 is out of range (table has 3 columns)",
//!   "recoverable": true,
//!   "suggested_action": "fix_input",
//!   "context": { "column": 7, "columns": 3 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for odr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Table input loading errors.
    Input,
    /// Table structure and sorting errors.
    Table,
    /// CSV export and download errors.
    Export,
    /// Print view errors.
    Print,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Table => write!(f, "table"),
            ErrorCategory::Export => write!(f, "export"),
            ErrorCategory::Print => write!(f, "print"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested follow-up for scripts driving the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Validate the configuration file.
    CheckConfig,
    /// Correct the input table or arguments.
    FixInput,
    /// Manual intervention required.
    ManualIntervention,
    /// Abort the operation.
    Abort,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::CheckConfig => write!(f, "check_config"),
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
            SuggestedAction::Abort => write!(f, "abort"),
        }
    }
}

/// Unified error type for odr.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Input errors (20-29)
    #[error("invalid table input: {0}")]
    Input(String),

    #[error("column {column} is out of range (table has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("table '{table_id}' has not been initialized")]
    NotInitialized { table_id: String },

    #[error("unsupported collation locale '{locale}': {reason}")]
    Locale { locale: String, reason: String },

    // Export errors (30-39)
    #[error("CSV export failed: {0}")]
    Export(String),

    #[error("download of '{filename}' failed: {reason}")]
    Download { filename: String, reason: String },

    // Print errors (40-49)
    #[error("print view could not be opened: {0}")]
    Print(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input and table errors
    /// - 30-39: Export errors
    /// - 40-49: Print errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig(_) => 11,
            Error::Input(_) => 20,
            Error::ColumnOutOfRange { .. } => 21,
            Error::NotInitialized { .. } => 22,
            Error::Locale { .. } => 23,
            Error::Export(_) => 30,
            Error::Download { .. } => 31,
            Error::Print(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) => ErrorCategory::Config,
            Error::Input(_) => ErrorCategory::Input,
            Error::ColumnOutOfRange { .. } | Error::NotInitialized { .. } | Error::Locale { .. } => {
                ErrorCategory::Table
            }
            Error::Export(_) | Error::Download { .. } => ErrorCategory::Export,
            Error::Print(_) => ErrorCategory::Print,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Every table action is a one-shot user action, so most failures are
    /// recovered simply by fixing the input and running the action again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidConfig(_) => true,
            Error::Input(_) => true,
            Error::ColumnOutOfRange { .. } => true,
            Error::NotInitialized { .. } => false, // caller bug
            Error::Locale { .. } => true,
            Error::Export(_) => true,
            Error::Download { .. } => true,
            Error::Print(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for scripts.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::Locale { .. } => {
                SuggestedAction::CheckConfig
            }
            Error::Input(_) | Error::ColumnOutOfRange { .. } => SuggestedAction::FixInput,
            Error::NotInitialized { .. } => SuggestedAction::Abort,
            Error::Export(_) | Error::Download { .. } | Error::Print(_) | Error::Io(_) => {
                SuggestedAction::Retry
            }
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check the syntax of config.toml, or remove it to use built-in defaults.",
            Error::InvalidConfig(_) => {
                "One of the configured values is not accepted. Compare config.toml against the defaults."
            }
            Error::Input(_) => {
                "The table file could not be read. Use a .json or .csv file whose first row holds the column labels."
            }
            Error::ColumnOutOfRange { .. } => {
                "Pick a column index between 0 and the number of header cells minus one."
            }
            Error::NotInitialized { .. } => {
                "Initialize the table before dispatching events to it. This is a bug in the caller."
            }
            Error::Locale { .. } => "Use a BCP-47 locale tag with collation data, such as 'ja' or 'en'.",
            Error::Export(_) => "Retry the export. If it keeps failing, check the table for unusual content.",
            Error::Download { .. } => {
                "Check that the output directory exists and is writable, then export again."
            }
            Error::Print(_) => {
                "The print view could not be opened. Check the output directory and print again."
            }
            Error::Io(_) => "Check disk space and permissions, then retry the operation.",
            Error::Json(_) => "Invalid JSON. Check the file with 'jq .' or regenerate it.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig(_) => "Invalid Configuration",
            Error::Input(_) => "Invalid Table Input",
            Error::ColumnOutOfRange { .. } => "Column Out of Range",
            Error::NotInitialized { .. } => "Table Not Initialized",
            Error::Locale { .. } => "Unsupported Locale",
            Error::Export(_) => "Export Failed",
            Error::Download { .. } => "Download Failed",
            Error::Print(_) => "Print Failed",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for scripts.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., column, filename).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ColumnOutOfRange { column, columns } => {
                context.insert("column".to_string(), serde_json::json!(column));
                context.insert("columns".to_string(), serde_json::json!(columns));
            }
            Error::NotInitialized { table_id } => {
                context.insert("table_id".to_string(), serde_json::json!(table_id));
            }
            Error::Locale { locale, .. } => {
                context.insert("locale".to_string(), serde_json::json!(locale));
            }
            Error::Download { filename, .. } => {
                context.insert("filename".to_string(), serde_json::json!(filename));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
