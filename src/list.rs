use alloc::vec::Vec;

use crate::reconcile::rendered_view_index;
use crate::{
    CellHandle, CellListError, CellListEvent, CellListOptions, CellRange, CellsChange,
    EventSink, HiddenRangeIndex, IndexMode, ListViewState, NotebookCell, NotebookModel,
    ReconcileReport, RenderView, Result, RevealOutcome, RevealPolicy, RevealRequest,
    RevealScheduler, RevealTarget, SelectionState, TextRange, ViewReconciler,
    visible_projection,
};

/// A notebook cell list: the visible projection of a notebook model, rendered through a
/// [`RenderView`].
///
/// The list owns the attached model and the render engine. It keeps three pieces of state in
/// sync:
/// - the hidden-range index (model index ↔ view index),
/// - the rendered cells (model cells minus hidden cells),
/// - parked reveals waiting for a cell's editor to attach.
///
/// The list does not observe anything by itself. Drive it by forwarding the model's
/// notifications ([`Self::cells_changed`], [`Self::selection_changed`],
/// [`Self::editor_attach_changed`]) and by calling [`Self::run_frame`] once per frame.
pub struct CellList<M: NotebookModel, R: RenderView> {
    options: CellListOptions,
    model: Option<M>,
    view: R,
    hidden: HiddenRangeIndex,
    reconciler: ViewReconciler<M::Cell>,
    reveals: RevealScheduler,
    events: EventSink,
    focus: Option<CellHandle>,
}

impl<M: NotebookModel, R: RenderView> CellList<M, R> {
    pub fn new(view: R, options: CellListOptions) -> Self {
        vdebug!(
            list_user = %options.list_user,
            reveal_padding = options.reveal_padding,
            "CellList::new"
        );
        Self {
            reveals: RevealScheduler::new(options.reveal_padding),
            events: EventSink::new(options.on_event.clone()),
            options,
            model: None,
            view,
            hidden: HiddenRangeIndex::new(),
            reconciler: ViewReconciler::new(),
            focus: None,
        }
    }

    pub fn options(&self) -> &CellListOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: CellListOptions) {
        self.reveals.set_padding(options.reveal_padding);
        self.events.set_on_event(options.on_event.clone());
        self.options = options;
    }

    /// Attaches a model and renders all of its cells. Returns the previously attached model.
    pub fn attach(&mut self, model: M) -> Option<M> {
        let previous = self.detach();
        vdebug!(cells = model.cell_count(), "CellList::attach");
        self.model = Some(model);
        self.reconcile_now();
        previous
    }

    /// Detaches the model, releasing its tracked hidden ranges and clearing the view.
    ///
    /// Parked reveals are dropped.
    pub fn detach(&mut self) -> Option<M> {
        let mut model = self.model.take()?;
        vdebug!(cells = model.cell_count(), "CellList::detach");
        self.hidden.reset(&mut model);
        self.reconciler.clear(&mut self.view);
        self.reveals.clear();
        self.focus = None;
        Some(model)
    }

    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// Mutable access to the attached model. Report edits through [`Self::cells_changed`] and
    /// [`Self::selection_changed`].
    pub fn model_mut(&mut self) -> Option<&mut M> {
        self.model.as_mut()
    }

    pub fn view(&self) -> &R {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut R {
        &mut self.view
    }

    /// Handles a cell insertion/removal notification.
    ///
    /// The model must already have updated its cells and tracked ranges. Synchronous changes
    /// reconcile immediately (and absorb a queued frame); deferred ones wait for
    /// [`Self::run_frame`]. Until then, handles of cells whose rows have not caught up do not
    /// resolve.
    pub fn cells_changed(&mut self, change: &CellsChange) {
        let Some(model) = self.model.as_ref() else {
            return;
        };
        self.hidden.refresh(model.cell_count(), model);
        vtrace!(
            inserted = change.inserted(),
            deleted = change.deleted(),
            synchronous = change.synchronous,
            "CellList::cells_changed"
        );
        if change.synchronous {
            self.reconcile_now();
        } else {
            self.reconciler.schedule();
        }
    }

    /// Runs a queued reconciliation, if any. Returns whether one ran.
    pub fn run_frame(&mut self) -> bool {
        if !self.reconciler.is_scheduled() {
            return false;
        }
        self.reconcile_now();
        true
    }

    /// Whether a deferred reconciliation is waiting for [`Self::run_frame`].
    pub fn is_frame_pending(&self) -> bool {
        self.reconciler.is_scheduled()
    }

    /// Mirrors the model's focus and selection into the view.
    pub fn selection_changed(&mut self) {
        self.sync_selection();
    }

    /// Replaces the hidden ranges (model indexes, inclusive).
    ///
    /// Returns `false` when the reduced set is unchanged (or no model is attached); nothing is
    /// rebuilt in that case. With `trigger_view_update`, a changed set is reconciled into the
    /// view immediately.
    pub fn set_hidden_ranges(&mut self, ranges: &[CellRange], trigger_view_update: bool) -> bool {
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        let count = model.cell_count();
        if !self.hidden.set_hidden_ranges(ranges, count, model).is_changed() {
            return false;
        }
        if trigger_view_update {
            self.reconcile_now();
        }
        true
    }

    pub fn hidden_ranges(&self) -> &[CellRange] {
        self.hidden.hidden_ranges()
    }

    pub fn hidden_index(&self) -> &HiddenRangeIndex {
        &self.hidden
    }

    /// Number of rendered cells.
    pub fn len(&self) -> usize {
        self.reconciler.rendered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rendered cell at `view_index`.
    pub fn element(&self, view_index: usize) -> Option<&M::Cell> {
        self.reconciler.rendered().get(view_index)
    }

    /// The rendered cell covering scroll offset `offset`.
    pub fn element_at(&self, offset: u64) -> Option<&M::Cell> {
        self.view.index_at(offset).and_then(|i| self.element(i))
    }

    /// View index of a visible cell; `None` when the cell is hidden or unknown.
    pub fn view_index(&self, handle: CellHandle) -> Option<usize> {
        self.resolve(handle, IndexMode::Exact)
    }

    /// View index of a cell, or of the nearest visible cell after it when it is hidden.
    pub fn view_index_upper_bound(&self, handle: CellHandle) -> Option<usize> {
        self.resolve(handle, IndexMode::UpperBound)
    }

    pub fn model_index_to_view_index(&self, model_index: usize, mode: IndexMode) -> Option<usize> {
        self.hidden.model_index_to_view_index(model_index, mode)
    }

    pub fn view_index_to_model_index(&self, view_index: usize) -> usize {
        self.hidden.view_index_to_model_index(view_index)
    }

    pub fn element_top(&self, handle: CellHandle) -> Result<u64> {
        let index = self.rendered_index(handle)?;
        Ok(self.view.element_top(index))
    }

    pub fn element_height(&self, handle: CellHandle) -> Result<u32> {
        let index = self.rendered_index(handle)?;
        Ok(self.view.element_height(index))
    }

    pub fn update_element_height(&mut self, handle: CellHandle, height: u32) -> Result<()> {
        let index = self.rendered_index(handle)?;
        self.view.update_element_height(index, height);
        Ok(())
    }

    pub fn scroll_top(&self) -> u64 {
        self.view.scroll_top()
    }

    pub fn set_scroll_top(&mut self, top: u64) {
        self.view.set_scroll_top(top);
    }

    pub fn view_scroll_bottom(&self) -> u64 {
        self.view.scroll_top() + self.view.render_height() as u64
    }

    pub fn render_height(&self) -> u32 {
        self.view.render_height()
    }

    /// Focuses and selects a cell (or the nearest visible cell after it when it is hidden).
    ///
    /// Returns `false` and does nothing when the cell cannot be resolved.
    pub fn focus_element(&mut self, handle: CellHandle) -> bool {
        let Some(index) = self.resolve(handle, IndexMode::UpperBound) else {
            vtrace!(handle = handle.0, "focus_element: unresolvable target");
            return false;
        };
        let Some(target) = self.element(index).map(NotebookCell::handle) else {
            return false;
        };
        if let Some(model) = self.model.as_mut() {
            model.set_selection(SelectionState::single(target));
        }
        self.sync_selection();
        true
    }

    /// Selects cells, keeping the current focus. Hidden cells select the nearest visible cell
    /// after them; unresolvable handles are skipped. Returns the number of selected rows.
    pub fn select_elements(&mut self, handles: &[CellHandle]) -> usize {
        let mut indexes: Vec<usize> = handles
            .iter()
            .filter_map(|&h| self.resolve(h, IndexMode::UpperBound))
            .collect();
        indexes.sort_unstable();
        indexes.dedup();

        let selections: Vec<CellHandle> = indexes
            .iter()
            .filter_map(|&i| self.element(i).map(NotebookCell::handle))
            .collect();
        if let Some(model) = self.model.as_mut() {
            let focus = model.selection().focus;
            model.set_selection(SelectionState { focus, selections });
        }
        self.sync_selection();
        indexes.len()
    }

    /// Reveals `handle` as described by `request`.
    pub fn reveal(&mut self, handle: CellHandle, request: RevealRequest) -> RevealOutcome {
        let Some(model) = self.model.as_ref() else {
            return RevealOutcome::Skipped;
        };
        self.reveals.reveal(
            model,
            &self.hidden,
            self.reconciler.rendered(),
            &mut self.view,
            handle,
            request,
            &mut self.events,
        )
    }

    pub fn reveal_in_view(&mut self, handle: CellHandle) -> RevealOutcome {
        self.reveal_cell(handle, RevealPolicy::InView)
    }

    pub fn reveal_at_top(&mut self, handle: CellHandle) -> RevealOutcome {
        self.reveal_cell(handle, RevealPolicy::Top)
    }

    pub fn reveal_in_center(&mut self, handle: CellHandle) -> RevealOutcome {
        self.reveal_cell(handle, RevealPolicy::Center)
    }

    pub fn reveal_in_center_if_outside_viewport(&mut self, handle: CellHandle) -> RevealOutcome {
        self.reveal_cell(handle, RevealPolicy::CenterIfOutsideViewport)
    }

    pub fn reveal_line_in_view(&mut self, handle: CellHandle, line: u32) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(RevealTarget::Line(line), RevealPolicy::InView),
        )
    }

    pub fn reveal_line_in_center(&mut self, handle: CellHandle, line: u32) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(RevealTarget::Line(line), RevealPolicy::Center),
        )
    }

    pub fn reveal_line_in_center_if_outside_viewport(
        &mut self,
        handle: CellHandle,
        line: u32,
    ) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(
                RevealTarget::Line(line),
                RevealPolicy::CenterIfOutsideViewport,
            ),
        )
    }

    pub fn reveal_range_in_view(&mut self, handle: CellHandle, range: TextRange) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(RevealTarget::Range(range), RevealPolicy::InView),
        )
    }

    pub fn reveal_range_in_center(
        &mut self,
        handle: CellHandle,
        range: TextRange,
    ) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(RevealTarget::Range(range), RevealPolicy::Center),
        )
    }

    pub fn reveal_range_in_center_if_outside_viewport(
        &mut self,
        handle: CellHandle,
        range: TextRange,
    ) -> RevealOutcome {
        self.reveal(
            handle,
            RevealRequest::new(
                RevealTarget::Range(range),
                RevealPolicy::CenterIfOutsideViewport,
            ),
        )
    }

    fn reveal_cell(&mut self, handle: CellHandle, policy: RevealPolicy) -> RevealOutcome {
        self.reveal(handle, RevealRequest::new(RevealTarget::Cell, policy))
    }

    /// Handles a cell's editor attachment notification, finishing or abandoning the reveal
    /// parked for it.
    pub fn editor_attach_changed(&mut self, handle: CellHandle) -> RevealOutcome {
        let cell = self
            .model
            .as_ref()
            .and_then(|m| m.cell_index(handle).and_then(|i| m.cell_at(i)));
        match cell {
            Some(cell) => self
                .reveals
                .attach_state_changed(cell, &mut self.view, &mut self.events),
            None => {
                self.reveals.cancel(handle);
                RevealOutcome::Skipped
            }
        }
    }

    /// Number of reveals parked until a cell's editor attaches.
    pub fn pending_reveals(&self) -> usize {
        self.reveals.pending_count()
    }

    pub fn pending_events(&self) -> &[CellListEvent] {
        self.events.pending()
    }

    /// Drains the queued events.
    pub fn take_events(&mut self) -> Vec<CellListEvent> {
        self.events.take()
    }

    pub fn view_state(&self) -> ListViewState {
        ListViewState {
            scroll_top: self.view.scroll_top(),
            focus: self.model.as_ref().and_then(|m| m.selection().focus),
            hidden_ranges: self.hidden.hidden_ranges().to_vec(),
        }
    }

    /// Re-applies a snapshot taken by [`Self::view_state`]: hidden ranges first, then focus,
    /// then the scroll position.
    pub fn restore_view_state(&mut self, state: &ListViewState) {
        if self.model.is_none() {
            return;
        }
        self.set_hidden_ranges(&state.hidden_ranges, true);
        if let Some(focus) = state.focus {
            self.focus_element(focus);
        }
        self.view.set_scroll_top(state.scroll_top);
    }

    /// Maps a handle to its rendered row. While a deferred change waits for its frame, cells
    /// whose rows have not caught up yet do not resolve.
    fn resolve(&self, handle: CellHandle, mode: IndexMode) -> Option<usize> {
        let model = self.model.as_ref()?;
        rendered_view_index(model, &self.hidden, self.reconciler.rendered(), handle, mode)
    }

    fn rendered_index(&self, handle: CellHandle) -> Result<usize> {
        let Some(model_index) = self.model.as_ref().and_then(|m| m.cell_index(handle)) else {
            return Err(CellListError::UnknownCell {
                user: self.options.list_user.clone(),
                handle,
            });
        };
        self.resolve(handle, IndexMode::Exact)
            .ok_or_else(|| CellListError::InvalidIndex {
                user: self.options.list_user.clone(),
                index: model_index,
            })
    }

    fn reconcile_now(&mut self) -> ReconcileReport {
        let Some(model) = self.model.as_mut() else {
            return ReconcileReport::default();
        };
        let visible = visible_projection(model.cells(), self.hidden.hidden_ranges());
        let report = self
            .reconciler
            .reconcile(model, &mut self.view, visible, &mut self.events);
        if report.splices > 0 {
            let dropped = self.reveals.relocate(self.reconciler.rendered());
            if dropped > 0 {
                vtrace!(dropped, "reconcile: dropped parked reveals");
            }
        }
        self.sync_selection();
        report
    }

    fn sync_selection(&mut self) {
        let Some(selection) = self.model.as_ref().map(NotebookModel::selection) else {
            return;
        };
        let focus_index = selection
            .focus
            .and_then(|h| self.resolve(h, IndexMode::UpperBound));
        let mut indexes: Vec<usize> = selection
            .selections
            .iter()
            .filter_map(|&h| self.resolve(h, IndexMode::UpperBound))
            .collect();
        indexes.sort_unstable();
        indexes.dedup();

        self.view.set_focus(focus_index);
        self.view.set_selection(&indexes);

        if selection.focus != self.focus {
            self.focus = selection.focus;
            self.events.emit(CellListEvent::FocusChanged(selection.focus));
        }
    }
}

impl<M: NotebookModel, R: RenderView> core::fmt::Debug for CellList<M, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellList")
            .field("options", &self.options)
            .field("attached", &self.model.is_some())
            .field("rendered", &self.len())
            .field("hidden_ranges", &self.hidden.hidden_ranges())
            .field("pending_reveals", &self.reveals.pending_count())
            .field("frame_pending", &self.reconciler.is_scheduled())
            .finish_non_exhaustive()
    }
}
