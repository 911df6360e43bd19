use alloc::vec::Vec;

use crate::diff::diff;
use crate::key::KeySet;
use crate::{
    CellHandle, CellKind, CellListEvent, CellRange, EventSink, HiddenRangeIndex, IndexMode,
    NotebookCell, NotebookModel, RenderView, SelectionState,
};

/// Returns the items whose index is not covered by any of the reduced `ranges`, in order.
pub fn visible_projection<T: Clone>(items: &[T], ranges: &[CellRange]) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    let mut next = 0usize;
    for range in ranges {
        if next >= items.len() {
            break;
        }
        if range.start > next {
            out.extend_from_slice(&items[next..range.start.min(items.len())]);
        }
        next = next.max(range.end.saturating_add(1));
    }
    if next < items.len() {
        out.extend_from_slice(&items[next..]);
    }
    out
}

/// Maps `handle` to its row in `rendered`.
///
/// The hidden-range index follows the model as soon as cells change, while `rendered` only
/// catches up on the next reconciliation. A row counts only when it holds the cell the index
/// places there; until then the handle does not resolve.
pub(crate) fn rendered_view_index<M: NotebookModel + ?Sized>(
    model: &M,
    hidden: &HiddenRangeIndex,
    rendered: &[M::Cell],
    handle: CellHandle,
    mode: IndexMode,
) -> Option<usize> {
    let model_index = model.cell_index(handle)?;
    let view_index = hidden.model_index_to_view_index(model_index, mode)?;
    let row = rendered.get(view_index)?;
    let expected = model.cell_at(hidden.view_index_to_model_index(view_index))?;
    (row.handle() == expected.handle()).then_some(view_index)
}

/// What one [`ViewReconciler::reconcile`] pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of splices applied to the rendered list.
    pub splices: usize,
    /// Cells that left the view because they no longer exist in the model.
    pub destroyed: Vec<CellHandle>,
    /// Whether the selection was reset because it no longer pointed at any cell.
    pub selection_repaired: bool,
}

/// Keeps the rendered cell list equal to (model cells) − (hidden cells) with minimal churn.
#[derive(Clone, Debug)]
pub struct ViewReconciler<C> {
    rendered: Vec<C>,
    frame_pending: bool,
}

impl<C> Default for ViewReconciler<C> {
    fn default() -> Self {
        Self {
            rendered: Vec::new(),
            frame_pending: false,
        }
    }
}

impl<C: NotebookCell> ViewReconciler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cells currently rendered, in view order.
    pub fn rendered(&self) -> &[C] {
        &self.rendered
    }

    /// Requests a reconciliation on the next frame. Returns `false` if one is already queued;
    /// multiple requests within a frame coalesce into one pass.
    pub fn schedule(&mut self) -> bool {
        !core::mem::replace(&mut self.frame_pending, true)
    }

    pub fn is_scheduled(&self) -> bool {
        self.frame_pending
    }

    /// Removes every rendered row without emitting events (model detach).
    pub fn clear<R: RenderView + ?Sized>(&mut self, view: &mut R) {
        self.frame_pending = false;
        let len = self.rendered.len();
        if len > 0 {
            view.splice(0, len, &[]);
        }
        self.rendered.clear();
    }

    /// Diffs the rendered list against `new_visible` and applies the result to both the
    /// rendered list and `view`.
    ///
    /// For every rendered cell that is spliced out, its outputs are reported as hidden when
    /// the cell still exists in `model` and as removed otherwise. Afterwards, an empty
    /// selection is reset to the model's first cell.
    pub fn reconcile<M, R>(
        &mut self,
        model: &mut M,
        view: &mut R,
        new_visible: Vec<C>,
        sink: &mut EventSink,
    ) -> ReconcileReport
    where
        M: NotebookModel<Cell = C> + ?Sized,
        R: RenderView + ?Sized,
    {
        self.frame_pending = false;

        let splices = {
            let old_uris: KeySet<&str> = self.rendered.iter().map(NotebookCell::uri).collect();
            diff(
                &self.rendered,
                &new_visible,
                |a, b| a.uri() == b.uri(),
                |c| old_uris.contains(c.uri()),
            )
        };

        let mut report = ReconcileReport {
            splices: splices.len(),
            ..ReconcileReport::default()
        };

        for splice in splices.into_iter().rev() {
            let mut hidden_outputs = Vec::new();
            let mut removed_outputs = Vec::new();
            let mut removed_markup = Vec::new();

            for cell in &self.rendered[splice.start..splice.end()] {
                let handle = cell.handle();
                if model.has_cell(handle) {
                    hidden_outputs.extend(cell.outputs());
                } else {
                    removed_outputs.extend(cell.outputs());
                    report.destroyed.push(handle);
                }
                if cell.kind() == CellKind::Markup {
                    removed_markup.push(handle);
                }
            }

            let inserted: Vec<CellHandle> = splice.inserted.iter().map(C::handle).collect();
            view.splice(splice.start, splice.delete_count, &inserted);
            self.rendered
                .splice(splice.start..splice.end(), splice.inserted);

            vtrace!(
                start = splice.start,
                delete_count = splice.delete_count,
                inserted = inserted.len(),
                hidden_outputs = hidden_outputs.len(),
                removed_outputs = removed_outputs.len(),
                "reconcile: splice"
            );

            if !hidden_outputs.is_empty() {
                sink.emit(CellListEvent::OutputsHidden(hidden_outputs));
            }
            if !removed_outputs.is_empty() {
                sink.emit(CellListEvent::OutputsRemoved(removed_outputs));
            }
            if !removed_markup.is_empty() {
                sink.emit(CellListEvent::CellsRemovedFromView(removed_markup));
            }
        }

        if !report.destroyed.is_empty() {
            view.forget_cells(&report.destroyed);
        }
        report.selection_repaired = repair_selection(model);
        report
    }
}

/// Resets the selection to the first cell when none of the selected cells exist any more.
fn repair_selection<M: NotebookModel + ?Sized>(model: &mut M) -> bool {
    let Some(first) = model.cell_at(0).map(NotebookCell::handle) else {
        return false;
    };
    let selection = model.selection();
    if selection.selections.iter().any(|&h| model.has_cell(h)) {
        return false;
    }
    vdebug!(first = first.0, "reconcile: selection emptied, resetting to first cell");
    model.set_selection(SelectionState::single(first));
    true
}
