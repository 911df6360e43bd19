use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::CellHandle;
use crate::fenwick::Fenwick;
use crate::key::KeyMap;

/// The virtualized row engine that measures, mounts and positions rendered rows.
///
/// Every index here is a *view index*: a position among currently rendered (visible) cells.
/// Implementations must stay consistent with the splices they receive; the list never asks for
/// an index outside `0..len()`.
pub trait RenderView {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces `delete_count` rows at `start` with rows for `inserted`.
    fn splice(&mut self, start: usize, delete_count: usize, inserted: &[CellHandle]);

    fn element_top(&self, index: usize) -> u64;

    fn element_height(&self, index: usize) -> u32;

    /// Records a new measured height for a rendered row.
    fn update_element_height(&mut self, index: usize, height: u32);

    /// View index of the row covering a scroll-space `offset`.
    fn index_at(&self, offset: u64) -> Option<usize>;

    fn scroll_top(&self) -> u64;

    /// Moves the viewport. The engine may clamp the value and re-measure rows that become
    /// visible before returning.
    fn set_scroll_top(&mut self, top: u64);

    fn render_height(&self) -> u32;

    fn set_focus(&mut self, index: Option<usize>);

    fn set_selection(&mut self, indexes: &[usize]);

    /// Called after `handles` were deleted from the model and spliced out for good. Engines
    /// that cache per-cell state can drop it here.
    fn forget_cells(&mut self, _handles: &[CellHandle]) {}
}

/// Estimated row height used before a row has been measured.
pub type EstimateHeight = Arc<dyn Fn(CellHandle) -> u32 + Send + Sync>;

/// A headless [`RenderView`]: row heights live in prefix sums, nothing is drawn.
///
/// Heights start from an estimate and are replaced by measurements. Measurements are cached
/// by cell handle, so a row that is spliced out (hidden) and back in keeps its measured height.
/// Deleted cells lose theirs through [`RenderView::forget_cells`].
pub struct HeadlessView {
    rows: Vec<CellHandle>,
    sizes: Vec<u32>,
    sums: Fenwick,
    measured: KeyMap<CellHandle, u32>,
    estimate_height: EstimateHeight,
    scroll_top: u64,
    render_height: u32,
    focus: Option<usize>,
    selection: Vec<usize>,
}

impl HeadlessView {
    pub fn new(
        render_height: u32,
        estimate_height: impl Fn(CellHandle) -> u32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            rows: Vec::new(),
            sizes: Vec::new(),
            sums: Fenwick::new(),
            measured: KeyMap::default(),
            estimate_height: Arc::new(estimate_height),
            scroll_top: 0,
            render_height,
            focus: None,
            selection: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[CellHandle] {
        &self.rows
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn total_height(&self) -> u64 {
        self.sums.total()
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.total_height()
            .saturating_sub(self.render_height as u64)
    }

    pub fn set_render_height(&mut self, render_height: u32) {
        self.render_height = render_height;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    /// Records a measurement for a cell, whether or not it is currently rendered.
    pub fn measure(&mut self, handle: CellHandle, height: u32) {
        self.measured.insert(handle, height);
        if let Some(index) = self.rows.iter().position(|&h| h == handle) {
            self.resize(index, height);
        }
    }

    pub fn is_measured(&self, handle: CellHandle) -> bool {
        self.measured.contains_key(&handle)
    }

    fn height_for(&self, handle: CellHandle) -> u32 {
        match self.measured.get(&handle) {
            Some(&h) => h,
            None => (self.estimate_height)(handle),
        }
    }

    fn resize(&mut self, index: usize, height: u32) {
        let cur = self.sizes[index];
        if cur == height {
            return;
        }
        self.sizes[index] = height;
        self.sums.add(index, height as i64 - cur as i64);
    }

    fn rebuild(&mut self) {
        let values: Vec<u64> = self.sizes.iter().map(|&s| s as u64).collect();
        self.sums = Fenwick::from_values(&values);
    }
}

impl RenderView for HeadlessView {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn splice(&mut self, start: usize, delete_count: usize, inserted: &[CellHandle]) {
        let len = self.rows.len();
        if start + delete_count > len {
            vwarn!(start, delete_count, len, "HeadlessView: out-of-range splice");
            debug_assert!(
                start + delete_count <= len,
                "HeadlessView: out-of-range splice (start={start}, delete_count={delete_count}, len={len})"
            );
            return;
        }
        let heights: Vec<u32> = inserted.iter().map(|&h| self.height_for(h)).collect();
        self.rows
            .splice(start..start + delete_count, inserted.iter().copied());
        self.sizes.splice(start..start + delete_count, heights);
        self.rebuild();

        // Row indexes after the splice point moved; drop focus/selection that pointed into
        // the deleted span and shift the rest.
        let shift = |i: usize| -> Option<usize> {
            if i < start {
                Some(i)
            } else if i < start + delete_count {
                None
            } else {
                Some(i - delete_count + inserted.len())
            }
        };
        self.focus = self.focus.and_then(&shift);
        self.selection = self.selection.iter().filter_map(|&i| shift(i)).collect();
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    fn element_top(&self, index: usize) -> u64 {
        self.sums.prefix_sum(index)
    }

    fn element_height(&self, index: usize) -> u32 {
        self.sizes.get(index).copied().unwrap_or(0)
    }

    fn update_element_height(&mut self, index: usize, height: u32) {
        let Some(&handle) = self.rows.get(index) else {
            return;
        };
        self.measured.insert(handle, height);
        self.resize(index, height);
    }

    fn index_at(&self, offset: u64) -> Option<usize> {
        if self.rows.is_empty() || offset >= self.total_height() {
            return None;
        }
        Some(self.sums.lower_bound(offset).min(self.rows.len() - 1))
    }

    fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, top: u64) {
        self.scroll_top = top.min(self.max_scroll_top());
    }

    fn render_height(&self) -> u32 {
        self.render_height
    }

    fn set_focus(&mut self, index: Option<usize>) {
        self.focus = index.filter(|&i| i < self.rows.len());
    }

    fn set_selection(&mut self, indexes: &[usize]) {
        let len = self.rows.len();
        self.selection = indexes.iter().copied().filter(|&i| i < len).collect();
    }

    fn forget_cells(&mut self, handles: &[CellHandle]) {
        for handle in handles {
            self.measured.remove(handle);
        }
    }
}

impl core::fmt::Debug for HeadlessView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeadlessView")
            .field("rows", &self.rows.len())
            .field("total_height", &self.total_height())
            .field("scroll_top", &self.scroll_top)
            .field("render_height", &self.render_height)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}
