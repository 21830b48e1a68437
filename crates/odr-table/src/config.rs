//! Table component configuration types.

use crate::compare::DEFAULT_LOCALE;
use crate::csv_export::ExportNaming;
use serde::{Deserialize, Serialize};

/// Toolbar button labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarLabels {
    /// CSV export button.
    #[serde(default = "default_csv_label")]
    pub csv_export: String,
    /// Print button.
    #[serde(default = "default_print_label")]
    pub print: String,
}

fn default_csv_label() -> String {
    "CSVエクスポート".to_string()
}

fn default_print_label() -> String {
    "印刷".to_string()
}

impl Default for ToolbarLabels {
    fn default() -> Self {
        Self {
            csv_export: default_csv_label(),
            print: default_print_label(),
        }
    }
}

/// Print view options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Document title when the table has no caption.
    #[serde(default)]
    pub title: Option<String>,
    /// Invoke the print dialog once the view has loaded.
    #[serde(default = "default_true")]
    pub auto_print: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            title: None,
            auto_print: true,
        }
    }
}

/// Markup output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Minify rendered markup.
    #[serde(default = "default_minify")]
    pub minify: bool,
}

fn default_minify() -> bool {
    !cfg!(debug_assertions)
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

/// Complete table component configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Collation locale for text comparison.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Export filename scheme.
    #[serde(default)]
    pub export: ExportNaming,
    /// Toolbar labels.
    #[serde(default)]
    pub toolbar: ToolbarLabels,
    /// Print view options.
    #[serde(default)]
    pub print: PrintConfig,
    /// Markup output options.
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            export: ExportNaming::default(),
            toolbar: ToolbarLabels::default(),
            print: PrintConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collation locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the export filename prefix.
    pub fn with_export_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.export = ExportNaming::new(prefix);
        self
    }

    /// Set the print title used for tables without a caption.
    pub fn with_print_title(mut self, title: impl Into<String>) -> Self {
        self.print.title = Some(title.into());
        self
    }

    /// Enable or disable markup minification.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.render.minify = minify;
        self
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
