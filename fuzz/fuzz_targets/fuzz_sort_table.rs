//! Fuzz target for header-click sorting.
//!
//! Ragged rows and mixed numeric/text columns must sort without panicking,
//! keep every row, and leave exactly one header marked.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odr_table::{Table, TableSorter};

#[derive(Debug, Arbitrary)]
struct Input {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    clicks: Vec<u8>,
}

thread_local! {
    static SORTER: TableSorter = TableSorter::for_locale("ja").expect("ja collator");
}

fuzz_target!(|input: Input| {
    if input.headers.is_empty() {
        return;
    }
    let mut table = Table::new("fuzz", input.headers).with_rows(input.rows);
    let mut ids = table.row_ids();
    ids.sort();

    for click in input.clicks.iter().take(8) {
        let column = usize::from(*click) % table.column_count();
        SORTER
            .with(|sorter| sorter.sort(&mut table, column))
            .expect("column in range");
        let marked = table.headers.iter().filter(|h| h.sort.is_sorted()).count();
        assert_eq!(marked, 1);
    }

    let mut after = table.row_ids();
    after.sort();
    assert_eq!(ids, after);
});
