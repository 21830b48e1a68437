//! Header-driven table sorting.

use crate::compare::{trim_key, ValueComparator};
use crate::error::{Result, TableError};
use crate::model::{SortState, Table};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Resolved direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Direction for a header click given the header's current marker:
    /// descending only when the column is already ascending.
    pub fn after_click(current: SortState) -> Self {
        if current == SortState::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Ascending)
    }
}

impl From<SortDirection> for SortState {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => SortState::Ascending,
            SortDirection::Descending => SortState::Descending,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

/// Summary of one completed sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOutcome {
    pub column: usize,
    pub direction: SortDirection,
    pub rows: usize,
    /// Rows that had no cell at `column` and sorted as the empty string.
    pub short_rows: usize,
}

/// Reorders a table's body rows by one column.
#[derive(Debug)]
pub struct TableSorter {
    comparator: ValueComparator,
}

impl TableSorter {
    pub fn new(comparator: ValueComparator) -> Self {
        Self { comparator }
    }

    /// Sorter collating text for `locale`.
    pub fn for_locale(locale: &str) -> Result<Self> {
        Ok(Self::new(ValueComparator::for_locale(locale)?))
    }

    pub fn comparator(&self) -> &ValueComparator {
        &self.comparator
    }

    /// Header-click sort: toggles ascending/descending on repeated clicks of
    /// the same column and starts ascending on any other column.
    pub fn sort(&self, table: &mut Table, column: usize) -> Result<SortOutcome> {
        let current = table
            .headers
            .get(column)
            .map(|header| header.sort)
            .ok_or(TableError::ColumnOutOfRange {
                column,
                columns: table.column_count(),
            })?;
        self.sort_with_direction(table, column, SortDirection::after_click(current))
    }

    /// Sort by `column` in an explicit direction.
    ///
    /// Clears every header marker, marks `column`, and stably reorders the
    /// body rows by their trimmed cell text. Rows are moved, never rebuilt.
    pub fn sort_with_direction(
        &self,
        table: &mut Table,
        column: usize,
        direction: SortDirection,
    ) -> Result<SortOutcome> {
        if column >= table.column_count() {
            return Err(TableError::ColumnOutOfRange {
                column,
                columns: table.column_count(),
            });
        }

        table.clear_sort_markers();
        table.headers[column].sort = direction.into();

        let short_rows = table.short_rows(column);
        if short_rows > 0 {
            warn!(
                table = %table.id,
                column,
                short_rows,
                "Rows without a cell in the sort column sort as empty text"
            );
        }

        let keys: Vec<String> = table
            .rows
            .iter()
            .map(|row| trim_key(row.text(column)).to_string())
            .collect();
        let ascending = direction.is_ascending();
        let order = stable_order(keys.len(), |a, b| {
            self.comparator.compare(&keys[a], &keys[b], ascending)
        });

        let mut slots: Vec<_> = table.rows.drain(..).map(Some).collect();
        table.rows = order.iter().filter_map(|&index| slots[index].take()).collect();

        debug!(
            table = %table.id,
            column,
            direction = %direction,
            rows = table.rows.len(),
            "Table sorted"
        );

        Ok(SortOutcome {
            column,
            direction,
            rows: table.rows.len(),
            short_rows,
        })
    }
}

/// Stable bottom-up merge sort over indices `0..len`.
///
/// Mixed numeric/text columns do not form a total order under the value
/// comparator, and `slice::sort_by` may panic on such comparators. This
/// merge never inspects consistency, only `Less` moves a right element ahead.
fn stable_order<F>(len: usize, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut buffer = Vec::with_capacity(len);
    let mut width = 1;

    while width < len {
        buffer.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                if compare(order[right], order[left]) == Ordering::Less {
                    buffer.push(order[right]);
                    right += 1;
                } else {
                    buffer.push(order[left]);
                    left += 1;
                }
            }
            buffer.extend_from_slice(&order[left..mid]);
            buffer.extend_from_slice(&order[right..end]);
            start = end;
        }
        std::mem::swap(&mut order, &mut buffer);
        width *= 2;
    }

    order
}
