//! Property-based tests for sort and export invariants.

use odr_table::{CsvExporter, SortDirection, SortState, Table, TableSorter};
use proptest::prelude::*;

fn numeric_table(values: &[i32]) -> Table {
    Table::new("numbers", ["label", "value"]).with_rows(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![format!("row{i}"), v.to_string()]),
    )
}

fn sorter() -> TableSorter {
    TableSorter::for_locale("ja").expect("ja collator")
}

fn parsed(table: &Table, column: usize) -> Vec<i64> {
    table
        .column_values(column)
        .iter()
        .map(|v| v.parse::<i64>().expect("integer cell"))
        .collect()
}

fn marked_columns(table: &Table) -> usize {
    table.headers.iter().filter(|h| h.sort.is_sorted()).count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ascending_sort_orders_by_numeric_value(values in prop::collection::vec(-10_000i32..10_000, 0..40)) {
        let mut table = numeric_table(&values);
        sorter().sort(&mut table, 1).unwrap();

        let sorted = parsed(&table, 1);
        prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "not ascending: {:?}", sorted);
        prop_assert_eq!(table.headers[1].sort, SortState::Ascending);
    }

    #[test]
    fn second_click_orders_descending(values in prop::collection::vec(-10_000i32..10_000, 0..40)) {
        let mut table = numeric_table(&values);
        let sorter = sorter();
        sorter.sort(&mut table, 1).unwrap();
        sorter.sort(&mut table, 1).unwrap();

        let sorted = parsed(&table, 1);
        prop_assert!(sorted.windows(2).all(|w| w[0] >= w[1]), "not descending: {:?}", sorted);
        prop_assert_eq!(table.headers[1].sort, SortState::Descending);
    }

    #[test]
    fn equal_keys_keep_their_relative_order(keys in prop::collection::vec(0u8..4, 0..40)) {
        let values: Vec<i32> = keys.iter().map(|&k| i32::from(k)).collect();
        let mut table = numeric_table(&values);
        sorter().sort(&mut table, 1).unwrap();

        for pair in table.rows.windows(2) {
            if pair[0].text(1) == pair[1].text(1) {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn repeated_ascending_sort_is_idempotent(values in prop::collection::vec("[a-zあ-ん]{0,4}", 0..30)) {
        let mut table = Table::new("t", ["v"]).with_rows(values.iter().map(|v| vec![v.clone()]));
        let sorter = sorter();
        sorter.sort_with_direction(&mut table, 0, SortDirection::Ascending).unwrap();
        let first = table.row_ids();
        sorter.sort_with_direction(&mut table, 0, SortDirection::Ascending).unwrap();
        prop_assert_eq!(table.row_ids(), first);
    }

    #[test]
    fn at_most_one_column_is_marked(clicks in prop::collection::vec(0usize..3, 1..20)) {
        let mut table = Table::new("t", ["a", "b", "c"])
            .with_rows([vec!["1", "x", "あ"], vec!["2", "y"], vec!["3"]]);
        let sorter = sorter();
        for &column in &clicks {
            sorter.sort(&mut table, column).unwrap();
            prop_assert_eq!(marked_columns(&table), 1);
        }
        let last = *clicks.last().unwrap();
        prop_assert_eq!(table.sorted_column().map(|(c, _)| c), Some(last));
    }

    #[test]
    fn sort_preserves_row_multiset(values in prop::collection::vec("[a-z0-9 .-]{0,6}", 0..30)) {
        let mut table = Table::new("t", ["v"]).with_rows(values.iter().map(|v| vec![v.clone()]));
        let mut before = table.row_ids();
        sorter().sort(&mut table, 0).unwrap();
        let mut after = table.row_ids();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn csv_reparses_to_original_cells(
        cells in prop::collection::vec(prop::collection::vec("[a-zA-Z0-9 ,\"\n山田]{0,8}", 2), 0..10)
    ) {
        let table = Table::new("t", ["name", "comment"]).with_rows(cells.clone());
        let csv = CsvExporter::new().to_csv(&table).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv.as_bytes());
        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        prop_assert_eq!(records.len(), cells.len() + 1);
        prop_assert_eq!(&records[0], &vec!["name".to_string(), "comment".to_string()]);
        prop_assert_eq!(&records[1..], &cells[..]);
    }
}
