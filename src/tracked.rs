//! Tracked ranges: cell ranges that follow the cells they cover as the model is edited.

use alloc::collections::BTreeMap;

use crate::CellRange;

/// Identity of a tracked range inside a [`TrackedRanges`] store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackedRangeId(pub u64);

/// How a tracked range reacts to cells inserted exactly at one of its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stickiness {
    AlwaysGrowsWhenTypingAtEdges,
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    /// Grows to cover cells inserted right after its end, never cells inserted at its start.
    #[default]
    GrowsOnlyWhenTypingAfter,
}

impl Stickiness {
    fn grows_before(self) -> bool {
        matches!(
            self,
            Self::AlwaysGrowsWhenTypingAtEdges | Self::GrowsOnlyWhenTypingBefore
        )
    }

    fn grows_after(self) -> bool {
        matches!(
            self,
            Self::AlwaysGrowsWhenTypingAtEdges | Self::GrowsOnlyWhenTypingAfter
        )
    }
}

/// Storage for ranges that survive edits elsewhere in the model.
///
/// This is the notebook model's side of hidden-range persistence. The contract mirrors a
/// single upsert entry point:
/// - `set_tracked_range(None, Some(range), s)` creates a range and returns its id.
/// - `set_tracked_range(Some(id), Some(range), s)` replaces it and returns `Some(id)`.
/// - `set_tracked_range(Some(id), None, _)` releases it and returns `None`.
pub trait TrackedRanges {
    fn set_tracked_range(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<CellRange>,
        stickiness: Stickiness,
    ) -> Option<TrackedRangeId>;

    /// Current position of a tracked range, or `None` if it was released or its cells were
    /// all deleted.
    fn tracked_range(&self, id: TrackedRangeId) -> Option<CellRange>;
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    range: Option<CellRange>,
    stickiness: Stickiness,
}

/// An in-memory [`TrackedRanges`] implementation for notebook models.
///
/// Call [`TrackedRangeStore::apply_splice`] whenever cells are inserted or removed so that
/// every stored range keeps covering the same cells.
#[derive(Clone, Debug, Default)]
pub struct TrackedRangeStore {
    entries: BTreeMap<TrackedRangeId, Entry>,
    next_id: u64,
}

impl TrackedRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not released) ranges, collapsed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shifts, shrinks or grows every range for `delete_count` cells removed at `start`
    /// followed by `insert_count` cells inserted at `start`.
    pub fn apply_splice(&mut self, start: usize, delete_count: usize, insert_count: usize) {
        for entry in self.entries.values_mut() {
            let Some(range) = entry.range else {
                continue;
            };
            let range = apply_delete(range, start, delete_count);
            entry.range =
                range.map(|r| apply_insert(r, start, insert_count, entry.stickiness));
        }
    }
}

fn apply_delete(range: CellRange, at: usize, count: usize) -> Option<CellRange> {
    if count == 0 {
        return Some(range);
    }
    let del_end = at + count; // exclusive
    let start = if range.start < at {
        range.start
    } else if range.start >= del_end {
        range.start - count
    } else {
        at
    };
    let end = if range.end < at {
        range.end
    } else if range.end >= del_end {
        range.end - count
    } else {
        // The end was deleted; the range now ends right before the deleted span.
        at.checked_sub(1)?
    };
    (start <= end).then_some(CellRange { start, end })
}

fn apply_insert(range: CellRange, at: usize, count: usize, stickiness: Stickiness) -> CellRange {
    if count == 0 {
        return range;
    }
    let CellRange { start, end } = range;
    if at < start || (at == start && !stickiness.grows_before()) {
        CellRange {
            start: start + count,
            end: end + count,
        }
    } else if at <= end || (at == end + 1 && stickiness.grows_after()) {
        CellRange {
            start,
            end: end + count,
        }
    } else {
        range
    }
}

impl TrackedRanges for TrackedRangeStore {
    fn set_tracked_range(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<CellRange>,
        stickiness: Stickiness,
    ) -> Option<TrackedRangeId> {
        match (id, range) {
            (Some(id), None) => {
                self.entries.remove(&id);
                None
            }
            (None, None) => None,
            (Some(id), Some(range)) if self.entries.contains_key(&id) => {
                self.entries.insert(
                    id,
                    Entry {
                        range: Some(range),
                        stickiness,
                    },
                );
                Some(id)
            }
            (_, Some(range)) => {
                let id = TrackedRangeId(self.next_id);
                self.next_id += 1;
                self.entries.insert(
                    id,
                    Entry {
                        range: Some(range),
                        stickiness,
                    },
                );
                Some(id)
            }
        }
    }

    fn tracked_range(&self, id: TrackedRangeId) -> Option<CellRange> {
        self.entries.get(&id).and_then(|e| e.range)
    }
}
