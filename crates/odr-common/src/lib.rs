//! Common types shared by the odr crates.
//!
//! - Error taxonomy with stable codes, categories and remediation hints
//! - Output format selection for CLI payloads
//! - Schema version stamped into machine-readable output

pub mod error;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use output::OutputFormat;

/// Schema version of JSON payloads emitted on stdout.
pub const SCHEMA_VERSION: &str = "1.0.0";
