//! Fuzz target for cell value comparison.
//!
//! Numeric prefix parsing and collation must never panic, and reversing the
//! direction must reverse the ordering.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odr_table::{parse_leading_number, ValueComparator};

#[derive(Debug, Arbitrary)]
struct Pair {
    a: String,
    b: String,
}

thread_local! {
    static COMPARATOR: ValueComparator = ValueComparator::new().expect("default collator");
}

fuzz_target!(|pair: Pair| {
    let _ = parse_leading_number(&pair.a);

    COMPARATOR.with(|comparator| {
        let ascending = comparator.compare(&pair.a, &pair.b, true);
        let descending = comparator.compare(&pair.a, &pair.b, false);
        assert_eq!(ascending, descending.reverse());
    });
});
