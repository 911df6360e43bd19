use alloc::vec::Vec;

use crate::CellRange;

/// Sorts and merges `ranges` so that no two of them overlap or touch.
///
/// The output is the canonical form of a hidden-range set; reducing an already reduced set
/// returns it unchanged.
pub fn reduce_ranges(ranges: &[CellRange]) -> Vec<CellRange> {
    let mut sorted: Vec<CellRange> = ranges.to_vec();
    sorted.sort_unstable_by_key(|r| (r.start, r.end));

    let mut out: Vec<CellRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match out.last_mut() {
            // Inclusive ends: `end + 1 == start` means the two spans touch.
            Some(last) if range.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => out.push(range),
        }
    }
    out
}

/// Pairwise start/end equality of two range lists.
pub(crate) fn ranges_equal(a: &[CellRange], b: &[CellRange]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.start == y.start && x.end == y.end)
}

/// Returns `true` when `index` falls inside any of the reduced `ranges`.
pub fn ranges_contain(ranges: &[CellRange], index: usize) -> bool {
    let pos = ranges.partition_point(|r| r.end < index);
    ranges.get(pos).is_some_and(|r| r.contains(index))
}
