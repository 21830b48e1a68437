//! Table data model.
//!
//! A [`Table`] is an ordered list of body [`Row`]s under a designated header
//! row. Sorting moves `Row` values around; it never rebuilds them, so a
//! [`RowId`] keeps identifying the same record across any number of sorts.

use serde::{Deserialize, Serialize};

/// Stable identity of a body row, assigned once when the row is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u32);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Per-column sort marker carried by a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortState {
    /// Column is not the sort column.
    #[default]
    None,
    /// Column sorted ascending.
    Ascending,
    /// Column sorted descending.
    Descending,
}

impl SortState {
    /// CSS marker class rendered on the header cell, if any.
    pub fn marker_class(&self) -> Option<&'static str> {
        match self {
            SortState::None => None,
            SortState::Ascending => Some("sort-asc"),
            SortState::Descending => Some("sort-desc"),
        }
    }

    pub fn is_sorted(&self) -> bool {
        !matches!(self, SortState::None)
    }
}

/// A single cell's raw text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    pub text: String,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Header cell: column label plus sort marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub label: String,
    #[serde(default)]
    pub sort: SortState,
}

impl HeaderCell {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sort: SortState::None,
        }
    }
}

/// A body row. The number of cells may differ from the header width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Text of the cell at `column`, or `""` when the row has no such cell.
    pub fn text(&self, column: usize) -> &str {
        self.cells
            .get(column)
            .map(|cell| cell.text.as_str())
            .unwrap_or("")
    }
}

/// A report table owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Host-assigned identity (element id in rendered markup).
    pub id: String,
    /// Optional caption, also used as the print view title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Header row.
    pub headers: Vec<HeaderCell>,
    /// Body rows in display order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given column labels.
    pub fn new<I, S>(id: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            caption: None,
            headers: headers.into_iter().map(HeaderCell::new).collect(),
            rows: Vec::new(),
        }
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Append body rows.
    pub fn with_rows<R, I, S>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self.push_row(row);
        }
        self
    }

    /// Append a body row and return its identity.
    pub fn push_row<I, S>(&mut self, cells: I) -> RowId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.next_row_id();
        self.rows.push(Row {
            id,
            cells: cells.into_iter().map(Cell::new).collect(),
        });
        id
    }

    fn next_row_id(&self) -> RowId {
        self.rows
            .iter()
            .map(|row| row.id.0 + 1)
            .max()
            .map(RowId)
            .unwrap_or(RowId(0))
    }

    /// Number of header cells.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The column currently carrying a sort marker, with its state.
    pub fn sorted_column(&self) -> Option<(usize, SortState)> {
        self.headers
            .iter()
            .enumerate()
            .find(|(_, header)| header.sort.is_sorted())
            .map(|(index, header)| (index, header.sort))
    }

    /// Reset every header's sort marker.
    pub fn clear_sort_markers(&mut self) {
        for header in &mut self.headers {
            header.sort = SortState::None;
        }
    }

    /// Body row identities in display order.
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|row| row.id).collect()
    }

    /// Text of the cell at (`row`, `column`), or `""` when either is missing.
    pub fn cell_text(&self, row: usize, column: usize) -> &str {
        self.rows.get(row).map(|r| r.text(column)).unwrap_or("")
    }

    /// Text of one column across all body rows, in display order.
    pub fn column_values(&self, column: usize) -> Vec<&str> {
        self.rows.iter().map(|row| row.text(column)).collect()
    }

    /// Every row of the table as text records: the header row first, then
    /// the body rows in display order.
    pub fn records(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        let header = self
            .headers
            .iter()
            .map(|header| header.label.as_str())
            .collect::<Vec<_>>();
        std::iter::once(header).chain(
            self.rows
                .iter()
                .map(|row| row.cells.iter().map(|cell| cell.text.as_str()).collect()),
        )
    }

    /// Number of body rows with fewer cells than `column + 1`.
    pub fn short_rows(&self, column: usize) -> usize {
        self.rows.iter().filter(|row| row.cells.len() <= column).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new("usage", ["User", "Size"])
            .with_caption("Storage")
            .with_rows([vec!["alice", "10"], vec!["bob"]])
    }

    #[test]
    fn test_row_ids_are_sequential() {
        let mut table = sample();
        assert_eq!(table.row_ids(), vec![RowId(0), RowId(1)]);
        let id = table.push_row(["carol", "3"]);
        assert_eq!(id, RowId(2));
    }

    #[test]
    fn test_missing_cell_reads_empty() {
        let table = sample();
        assert_eq!(table.rows[1].text(1), "");
        assert_eq!(table.rows[1].text(99), "");
        assert_eq!(table.short_rows(1), 1);
        assert_eq!(table.column_values(1), vec!["10", ""]);
        assert_eq!(table.cell_text(0, 1), "10");
        assert_eq!(table.cell_text(5, 0), "");
    }

    #[test]
    fn test_sorted_column_and_clear() {
        let mut table = sample();
        assert_eq!(table.sorted_column(), None);

        table.headers[1].sort = SortState::Descending;
        assert_eq!(table.sorted_column(), Some((1, SortState::Descending)));

        table.clear_sort_markers();
        assert_eq!(table.sorted_column(), None);
    }

    #[test]
    fn test_records_start_with_header() {
        let table = sample();
        let records: Vec<_> = table.records().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], vec!["User", "Size"]);
        assert_eq!(records[2], vec!["bob"]);
    }

    #[test]
    fn test_marker_classes() {
        assert_eq!(SortState::None.marker_class(), None);
        assert_eq!(SortState::Ascending.marker_class(), Some("sort-asc"));
        assert_eq!(SortState::Descending.marker_class(), Some("sort-desc"));
    }

    #[test]
    fn test_json_shape() {
        let table = sample();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0]["cells"], serde_json::json!(["alice", "10"]));
        assert_eq!(json["rows"][1]["id"], serde_json::json!(1));
        assert_eq!(json["headers"][0]["sort"], serde_json::json!("none"));

        let parsed: Table = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, table);
    }
}
