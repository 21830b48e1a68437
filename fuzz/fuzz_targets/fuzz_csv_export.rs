//! Fuzz target for CSV export.
//!
//! Whatever the cell text, the export must re-parse to the same cells.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odr_table::{CsvExporter, Table};

#[derive(Debug, Arbitrary)]
struct Input {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fuzz_target!(|input: Input| {
    // An empty record cannot be told apart from a missing one.
    if input.headers.is_empty() || input.rows.iter().any(|row| row.is_empty()) {
        return;
    }
    let table = Table::new("fuzz", input.headers.clone()).with_rows(input.rows.clone());
    let csv = CsvExporter::new().to_csv(&table).expect("export");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv.as_bytes());
    let records: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.expect("re-parse").iter().map(str::to_string).collect())
        .collect();

    assert_eq!(records[0], input.headers);
    assert_eq!(&records[1..], &input.rows[..]);
});
