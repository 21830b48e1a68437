//! Fuzz target for table input parsing.
//!
//! Tests that JSON and CSV table parsing handles arbitrary input without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use odr_core::input::{parse_table, InputFormat};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = parse_table(text, InputFormat::Json, "fuzz");
    let _ = parse_table(text, InputFormat::Csv, "fuzz");
});
