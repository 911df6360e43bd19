use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::range::{ranges_equal, reduce_ranges};
use crate::{CellRange, IndexMode, Stickiness, TrackedRangeId, TrackedRanges};

/// Result of [`HiddenRangeIndex::set_hidden_ranges`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HiddenRangesUpdate {
    /// The reduced input equals the current set; nothing was rebuilt.
    Unchanged,
    /// The mapping was rebuilt. `old` and `new` are the reduced sets before and after.
    Changed {
        old: Vec<CellRange>,
        new: Vec<CellRange>,
    },
}

impl HiddenRangesUpdate {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Builds the weight array for `item_count` items with `ranges` hidden.
///
/// `ranges` must be reduced. Returns `(leading_hidden, weights)`:
/// - one weight per visible item, in order;
/// - a visible item directly followed by a hidden run weighs `run + 1`, every other visible
///   item weighs `1`;
/// - a run starting at index 0 has no visible item before it and is counted in
///   `leading_hidden` instead.
///
/// `leading_hidden + weights.iter().sum()` always equals `item_count`.
pub fn compute_weights(item_count: usize, ranges: &[CellRange]) -> (usize, Vec<u64>) {
    let mut leading = 0usize;
    let mut weights: Vec<u64> = Vec::with_capacity(item_count);
    let mut next = 0usize;

    for range in ranges {
        if range.start >= item_count {
            break;
        }
        debug_assert!(range.start >= next, "compute_weights: ranges are not reduced");
        let start = range.start.max(next);
        let end = range.end.saturating_add(1).min(item_count); // exclusive

        weights.extend(core::iter::repeat_n(1, start - next));
        let run = end.saturating_sub(start);
        match weights.last_mut() {
            Some(anchor) => *anchor += run as u64,
            None => leading += run,
        }
        next = end.max(next);
    }
    weights.extend(core::iter::repeat_n(1, item_count.saturating_sub(next)));

    (leading, weights)
}

/// Maps model indexes (positions in the full cell list) to view indexes (positions among
/// visible cells) and back, for the current set of hidden ranges.
///
/// Until hidden ranges are first set the mapping is the identity. Hidden ranges are persisted
/// as tracked ranges in the model, so they follow cell insertions and removals; call
/// [`Self::refresh`] after such edits.
#[derive(Clone, Debug, Default)]
pub struct HiddenRangeIndex {
    ranges: Vec<CellRange>,
    tracked_ids: Vec<TrackedRangeId>,
    leading: usize,
    sums: Option<Fenwick>,
}

impl HiddenRangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current reduced hidden-range set.
    pub fn hidden_ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    /// Whether no prefix array has been built (no model, or hidden ranges never set).
    pub fn is_identity(&self) -> bool {
        self.sums.is_none()
    }

    /// Number of hidden items before the first visible one.
    pub fn leading_hidden(&self) -> usize {
        self.leading
    }

    /// Number of visible items, or `None` while the mapping is the identity.
    pub fn view_len(&self) -> Option<usize> {
        self.sums.as_ref().map(Fenwick::len)
    }

    /// The per-visible-item weights (empty while the mapping is the identity).
    pub fn weights(&self) -> Vec<u64> {
        match &self.sums {
            Some(sums) => (0..sums.len()).map(|i| sums.value(i)).collect(),
            None => Vec::new(),
        }
    }

    /// Replaces the hidden ranges.
    ///
    /// The input is reduced first. If the result equals the ranges currently tracked in
    /// `store`, nothing happens and [`HiddenRangesUpdate::Unchanged`] is returned so callers
    /// can skip reconciliation. Otherwise the previous tracked ranges are released, new ones
    /// are created with [`Stickiness::GrowsOnlyWhenTypingAfter`], and the prefix array is
    /// rebuilt for `item_count` items.
    pub fn set_hidden_ranges<S: TrackedRanges + ?Sized>(
        &mut self,
        ranges: &[CellRange],
        item_count: usize,
        store: &mut S,
    ) -> HiddenRangesUpdate {
        let new = reduce_ranges(ranges);
        let old: Vec<CellRange> = self
            .tracked_ids
            .iter()
            .filter_map(|&id| store.tracked_range(id))
            .collect();

        if ranges_equal(&new, &old) && self.sums.is_some() {
            vtrace!(ranges = new.len(), "set_hidden_ranges: unchanged");
            return HiddenRangesUpdate::Unchanged;
        }

        self.release(store);
        self.tracked_ids = new
            .iter()
            .filter_map(|&r| {
                store.set_tracked_range(None, Some(r), Stickiness::GrowsOnlyWhenTypingAfter)
            })
            .collect();
        self.rebuild(new.clone(), item_count);

        vdebug!(
            old = old.len(),
            new = new.len(),
            view_len = self.view_len().unwrap_or(item_count),
            "set_hidden_ranges: rebuilt"
        );
        HiddenRangesUpdate::Changed { old, new }
    }

    /// Re-reads the tracked ranges from `store` and rebuilds the prefix array for
    /// `item_count` items. Call after the model inserted or removed cells.
    ///
    /// Does nothing while the mapping is the identity.
    pub fn refresh<S: TrackedRanges + ?Sized>(&mut self, item_count: usize, store: &S) {
        if self.sums.is_none() {
            return;
        }
        let current: Vec<CellRange> = self
            .tracked_ids
            .iter()
            .filter_map(|&id| store.tracked_range(id))
            .collect();
        self.rebuild(reduce_ranges(&current), item_count);
    }

    /// Releases every tracked range and returns to the identity mapping.
    pub fn reset<S: TrackedRanges + ?Sized>(&mut self, store: &mut S) {
        self.release(store);
        self.ranges.clear();
        self.leading = 0;
        self.sums = None;
    }

    fn release<S: TrackedRanges + ?Sized>(&mut self, store: &mut S) {
        for id in self.tracked_ids.drain(..) {
            store.set_tracked_range(Some(id), None, Stickiness::GrowsOnlyWhenTypingAfter);
        }
    }

    fn rebuild(&mut self, ranges: Vec<CellRange>, item_count: usize) {
        let (leading, weights) = compute_weights(item_count, &ranges);
        self.ranges = ranges;
        self.leading = leading;
        self.sums = Some(Fenwick::from_values(&weights));
    }

    /// Translates a model index into a view index.
    ///
    /// - [`IndexMode::Exact`]: `None` if the item is hidden.
    /// - [`IndexMode::UpperBound`]: a hidden item resolves to the first visible position after
    ///   its hidden run (or to the run's anchor when nothing visible follows). `None` only when
    ///   no item is visible at all.
    ///
    /// Indexes past the span covered by the prefix array map linearly past its end.
    pub fn model_index_to_view_index(&self, model_index: usize, mode: IndexMode) -> Option<usize> {
        let Some(sums) = &self.sums else {
            return Some(model_index);
        };
        let count = sums.len();

        if model_index < self.leading {
            return match mode {
                IndexMode::Exact => None,
                IndexMode::UpperBound => (count > 0).then_some(0),
            };
        }

        let rel = (model_index - self.leading) as u64;
        let total = sums.total();
        if rel >= total {
            return Some(count + (rel - total) as usize);
        }

        let index = sums.lower_bound(rel);
        let remainder = rel - sums.prefix_sum(index);
        if remainder == 0 {
            return Some(index);
        }
        match mode {
            IndexMode::Exact => None,
            IndexMode::UpperBound => Some(if index + 1 < count { index + 1 } else { index }),
        }
    }

    /// Translates a view index into the model index of the visible item at that position.
    pub fn view_index_to_model_index(&self, view_index: usize) -> usize {
        let Some(sums) = &self.sums else {
            return view_index;
        };
        let count = sums.len();
        if view_index < count {
            self.leading + sums.prefix_sum(view_index) as usize
        } else {
            self.leading + sums.total() as usize + (view_index - count)
        }
    }
}
