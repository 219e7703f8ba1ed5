//! Canonical ordering for bar data: ascending by date, one bar per date.

use crate::domain::Bar;

/// Sort bars ascending by date and drop duplicate dates (first occurrence wins).
pub fn canonicalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|bar| bar.date);
    bars.dedup_by_key(|bar| bar.date);
    bars
}
