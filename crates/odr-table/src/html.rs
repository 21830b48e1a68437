//! Markup rendering for tables and their toolbars.
//!
//! The model is the source of truth; this module only reflects it. The
//! rendered `<table>` is the "outer markup" snapshot the print view embeds.

use crate::config::RenderConfig;
use crate::controller::{Binding, Toolbar};
use crate::model::Table;
use tracing::debug;

/// CSS class every rendered table carries.
pub const TABLE_CLASS: &str = "data-table";

/// Print rules for the host page itself: toolbars and page controls are
/// hidden, sections and tables do not break across pages.
pub const PAGE_PRINT_STYLE: &str = r#"@media print {
    body { background: white; }
    .container { box-shadow: none; }
    .controls, .csv-download, .export-container { display: none; }
    .section { break-inside: avoid; }
    table { page-break-inside: avoid; }
    @page { margin: 2cm; }
}"#;

/// The page print stylesheet as a `<style>` element.
pub fn render_page_print_style() -> String {
    format!("<style>\n{}\n</style>", PAGE_PRINT_STYLE)
}

/// Render a table as `<table class="data-table">` markup.
pub fn render_table(table: &Table) -> String {
    let caption = table
        .caption
        .as_deref()
        .map(|caption| format!("\n    <caption>{}</caption>", html_escape(caption)))
        .unwrap_or_default();

    let headers: String = table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let class = header
                .sort
                .marker_class()
                .map(|class| format!(r#" class="{}""#, class))
                .unwrap_or_default();
            format!(
                r#"
            <th data-column="{}"{}>{}</th>"#,
                index,
                class,
                html_escape(&header.label)
            )
        })
        .collect();

    let rows: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells
                .iter()
                .map(|cell| format!("<td>{}</td>", html_escape(&cell.text)))
                .collect();
            format!(
                r#"
        <tr data-row-id="{}">{}</tr>"#,
                row.id.0, cells
            )
        })
        .collect();

    format!(
        r#"<table class="{class}" id="{id}">{caption}
    <thead>
        <tr>{headers}
        </tr>
    </thead>
    <tbody>{rows}
    </tbody>
</table>"#,
        class = TABLE_CLASS,
        id = html_escape(&table.id),
        caption = caption,
        headers = headers,
        rows = rows,
    )
}

/// Render a toolbar as a button container.
pub fn render_toolbar(toolbar: &Toolbar) -> String {
    let buttons: Vec<String> = toolbar
        .buttons
        .iter()
        .map(|button| {
            format!(
                r#"<button type="button" class="{}" data-table="{}">{}</button>"#,
                button.action.css_class(),
                html_escape(&toolbar.table_id),
                html_escape(&button.label)
            )
        })
        .collect();

    format!(
        r#"<div class="{}">
    {}
</div>"#,
        toolbar.container_class,
        buttons.join("\n    ")
    )
}

/// Render a bound table: its toolbar immediately followed by the table.
pub fn render_bound_table(table: &Table, binding: &Binding, config: &RenderConfig) -> String {
    let markup = format!(
        "{}\n{}",
        render_toolbar(&binding.toolbar),
        render_table(table)
    );
    finish(markup, config)
}

/// Render a page fragment: the page print stylesheet followed by every
/// bound table in order.
pub fn render_page(tables: &[(&Table, &Binding)], config: &RenderConfig) -> String {
    let mut parts = vec![render_page_print_style()];
    for (table, binding) in tables {
        parts.push(render_toolbar(&binding.toolbar));
        parts.push(render_table(table));
    }
    finish(parts.join("\n"), config)
}

/// Apply output options (minification) to rendered markup.
pub fn finish(markup: String, config: &RenderConfig) -> String {
    if !config.minify {
        return markup;
    }

    let cfg = minify_html::Cfg {
        minify_js: true,
        minify_css: true,
        ..Default::default()
    };
    let minified = minify_html::minify(markup.as_bytes(), &cfg);
    debug!(
        before = markup.len(),
        after = minified.len(),
        "Markup minified"
    );
    String::from_utf8(minified).unwrap_or(markup)
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
