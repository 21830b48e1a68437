//! Cell value classification and comparison.
//!
//! Two cell texts compare numerically only when *both* parse as numbers;
//! any other pair (including a numeric/text mix) falls back to locale
//! collation of the whole pair. Classification is recomputed on every
//! comparison because cell text may change between sorts.

use crate::error::{Result, TableError};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use std::cmp::Ordering;

/// Collation locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "ja";

/// Raw cell text plus its numeric reading, if it has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellValue<'a> {
    pub raw: &'a str,
    pub number: Option<f64>,
}

impl<'a> CellValue<'a> {
    pub fn classify(raw: &'a str) -> Self {
        Self {
            raw,
            number: parse_leading_number(raw),
        }
    }
}

/// Whitespace or a byte-order mark.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Strip leading and trailing whitespace, byte-order marks included.
pub fn trim_key(text: &str) -> &str {
    text.trim_matches(is_blank)
}

/// Parse the longest numeric prefix of `text`.
///
/// Accepts optional leading whitespace (or byte-order marks) and sign, then either `Infinity` or
/// decimal digits with an optional fraction and exponent. Anything after the
/// prefix is ignored, so `"12kb"` reads as 12 and `"1,234"` as 1. Returns
/// `None` when no digits are found.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start_matches(is_blank);
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    let negative = matches!(bytes.first(), Some(b'-'));
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut cursor = frac_start;
        while cursor < len && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > frac_start {
            digits += cursor - frac_start;
            end = cursor;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut cursor = end + 1;
        if cursor < len && matches!(bytes[cursor], b'+' | b'-') {
            cursor += 1;
        }
        let exp_start = cursor;
        while cursor < len && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exp_start {
            end = cursor;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Compares cell texts: numerically when both parse, otherwise by collation.
pub struct ValueComparator {
    locale: String,
    collator: Collator,
}

impl std::fmt::Debug for ValueComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueComparator")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl ValueComparator {
    /// Comparator using Japanese collation.
    pub fn new() -> Result<Self> {
        Self::for_locale(DEFAULT_LOCALE)
    }

    /// Comparator collating text for the given BCP-47 locale tag.
    pub fn for_locale(tag: &str) -> Result<Self> {
        let locale = tag.parse::<Locale>().map_err(|e| TableError::Locale {
            locale: tag.to_string(),
            reason: e.to_string(),
        })?;
        let collator = Collator::try_new(&locale.into(), CollatorOptions::new()).map_err(|e| {
            TableError::Locale {
                locale: tag.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            locale: tag.to_string(),
            collator,
        })
    }

    /// Locale tag used for text collation.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Order `a` relative to `b`; `ascending == false` flips the result.
    pub fn compare(&self, a: &str, b: &str, ascending: bool) -> Ordering {
        let order = self.compare_values(&CellValue::classify(a), &CellValue::classify(b));
        if ascending {
            order
        } else {
            order.reverse()
        }
    }

    fn compare_values(&self, a: &CellValue<'_>, b: &CellValue<'_>) -> Ordering {
        match (a.number, b.number) {
            // Equal infinities have no defined difference and compare equal.
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => self.collator.compare(a.raw, b.raw),
        }
    }
}
