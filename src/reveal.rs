use core::cmp;

use crate::key::KeyMap;
use crate::reconcile::rendered_view_index;
use crate::{
    CellHandle, CellListEvent, EventSink, HiddenRangeIndex, IndexMode, NotebookCell,
    NotebookModel, RenderView, RevealPolicy, RevealTarget, ScrollDirection,
};

/// How a cell's editor attachment settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// The cell was torn down (or its editor detached) before attaching.
    Detached,
}

/// A value parked until a cell's editor attachment settles.
///
/// It resolves exactly once: [`AttachWaiter::resolve`] consumes it. Dropping it without
/// resolving cancels the wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct AttachWaiter<T> {
    payload: T,
}

impl<T> AttachWaiter<T> {
    pub fn new(payload: T) -> Self {
        Self { payload }
    }

    /// Returns the payload when the editor attached, `None` when the wait was rejected.
    pub fn resolve(self, outcome: AttachOutcome) -> Option<T> {
        match outcome {
            AttachOutcome::Attached => Some(self.payload),
            AttachOutcome::Detached => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevealRequest {
    pub target: RevealTarget,
    pub policy: RevealPolicy,
}

impl RevealRequest {
    pub fn new(target: RevealTarget, policy: RevealPolicy) -> Self {
        Self { target, policy }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The target could not be resolved to a rendered row (or a deferred reveal was
    /// abandoned). Nothing scrolled.
    Skipped,
    /// The reveal completed.
    Revealed,
    /// A first-pass scroll happened; the rest waits for the cell's editor to attach.
    Deferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DeferredReveal {
    view_index: usize,
    request: RevealRequest,
    direction: Option<ScrollDirection>,
}

/// Computes and applies scroll offsets that bring cells, or lines inside them, into view.
///
/// Line and range targets need the cell's editor to know where the line is. When the editor is
/// not attached yet, a first-pass scroll brings the cell close enough for the render engine to
/// materialize it and the reveal is parked until [`Self::attach_state_changed`] reports the
/// outcome. At most one reveal is parked per cell; a newer request replaces the older one.
#[derive(Clone, Debug, Default)]
pub struct RevealScheduler {
    pending: KeyMap<CellHandle, AttachWaiter<DeferredReveal>>,
    padding: u32,
}

impl RevealScheduler {
    pub fn new(padding: u32) -> Self {
        Self {
            pending: KeyMap::default(),
            padding,
        }
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: u32) {
        self.padding = padding;
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: CellHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Drops the parked reveal for `handle`, if any.
    pub fn cancel(&mut self, handle: CellHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Resolves a cell handle to the view index a reveal should target.
    ///
    /// Hidden cells resolve to the nearest visible row at or after them. Returns `None` when
    /// the cell is not in the model or no rendered row corresponds to it, which includes a
    /// rendered list still waiting for a queued reconciliation.
    pub fn resolve<M: NotebookModel + ?Sized>(
        model: &M,
        hidden: &HiddenRangeIndex,
        rendered: &[M::Cell],
        handle: CellHandle,
    ) -> Option<usize> {
        rendered_view_index(model, hidden, rendered, handle, IndexMode::UpperBound)
    }

    /// Moves parked reveals to the rows their cells occupy in `rendered`.
    ///
    /// A reveal whose cell is no longer rendered is dropped. Returns how many were dropped.
    pub fn relocate<C: NotebookCell>(&mut self, rendered: &[C]) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let rows: KeyMap<CellHandle, usize> = rendered
            .iter()
            .enumerate()
            .filter(|(_, cell)| self.pending.contains_key(&cell.handle()))
            .map(|(row, cell)| (cell.handle(), row))
            .collect();
        let before = self.pending.len();
        self.pending.retain(|handle, waiter| match rows.get(handle) {
            Some(&row) => {
                waiter.payload.view_index = row;
                true
            }
            None => {
                vtrace!(handle = handle.0, "reveal: cell left the view, dropping parked reveal");
                false
            }
        });
        before - self.pending.len()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reveal<M, R>(
        &mut self,
        model: &M,
        hidden: &HiddenRangeIndex,
        rendered: &[M::Cell],
        view: &mut R,
        handle: CellHandle,
        request: RevealRequest,
        sink: &mut EventSink,
    ) -> RevealOutcome
    where
        M: NotebookModel + ?Sized,
        R: RenderView + ?Sized,
    {
        let rendered = &rendered[..cmp::min(rendered.len(), view.len())];
        let Some(view_index) = Self::resolve(model, hidden, rendered, handle) else {
            vtrace!(handle = handle.0, "reveal: unresolvable target");
            return RevealOutcome::Skipped;
        };
        let cell = &rendered[view_index];
        if self.cancel(cell.handle()) {
            vdebug!(handle = cell.handle().0, "reveal: superseding parked reveal");
        }
        vtrace!(handle = handle.0, view_index, ?request, "reveal");

        match request.target {
            RevealTarget::Cell => {
                reveal_cell(view, view_index, request.policy);
                RevealOutcome::Revealed
            }
            RevealTarget::Line(_) | RevealTarget::Range(_) => {
                self.reveal_position(view, view_index, cell, request, sink)
            }
        }
    }

    /// Finishes (or abandons) the reveal parked for `cell` once its editor attachment settled.
    ///
    /// The view index recorded when the reveal was parked is reused, as kept current by
    /// [`Self::relocate`].
    pub fn attach_state_changed<C, R>(
        &mut self,
        cell: &C,
        view: &mut R,
        sink: &mut EventSink,
    ) -> RevealOutcome
    where
        C: NotebookCell,
        R: RenderView + ?Sized,
    {
        let Some(waiter) = self.pending.remove(&cell.handle()) else {
            return RevealOutcome::Skipped;
        };
        let outcome = if cell.editor_attached() {
            AttachOutcome::Attached
        } else {
            AttachOutcome::Detached
        };
        let Some(deferred) = waiter.resolve(outcome) else {
            vtrace!(handle = cell.handle().0, "reveal: editor detached, abandoning");
            return RevealOutcome::Skipped;
        };
        if deferred.view_index >= view.len() {
            return RevealOutcome::Skipped;
        }
        self.finish(
            view,
            deferred.view_index,
            cell,
            deferred.request,
            deferred.direction,
            true,
            sink,
        );
        RevealOutcome::Revealed
    }

    fn reveal_position<C, R>(
        &mut self,
        view: &mut R,
        index: usize,
        cell: &C,
        request: RevealRequest,
        sink: &mut EventSink,
    ) -> RevealOutcome
    where
        C: NotebookCell,
        R: RenderView + ?Sized,
    {
        let scroll_top = view.scroll_top();
        let half = view.render_height() as u64 / 2;
        let bottom = scroll_top + view.render_height() as u64;
        let top = view.element_top(index);
        let attached = cell.editor_attached();

        let direction = match request.policy {
            RevealPolicy::InView => {
                if attached {
                    self.finish(view, index, cell, request, None, false, sink);
                    return RevealOutcome::Revealed;
                }
                let height = view.element_height(index) as u64;
                if top + height < scroll_top {
                    view.set_scroll_top(top);
                    Some(ScrollDirection::Backward)
                } else if top > bottom {
                    view.set_scroll_top(top.saturating_sub(half));
                    Some(ScrollDirection::Forward)
                } else {
                    None
                }
            }
            RevealPolicy::Top | RevealPolicy::Center => {
                let first = if request.policy == RevealPolicy::Top {
                    top
                } else {
                    top.saturating_sub(half)
                };
                view.set_scroll_top(first);
                if attached {
                    self.finish(view, index, cell, request, None, false, sink);
                    return RevealOutcome::Revealed;
                }
                direction_between(scroll_top, view.scroll_top())
            }
            RevealPolicy::CenterIfOutsideViewport => {
                let offset = local_offset(cell, request.target);
                let position = top + offset;
                let outside = position < scroll_top || position > bottom;
                if outside {
                    // Rows above may grow once rendered; settle re-reads the top.
                    settle(view, index, |t, _| (t + offset).saturating_sub(half));
                }
                if attached {
                    // The editor only centres a range the list did not have to scroll to.
                    if !outside {
                        reveal_in_editor(cell, request.target, sink);
                    }
                    return RevealOutcome::Revealed;
                }
                direction_between(scroll_top, view.scroll_top())
            }
        };

        vtrace!(handle = cell.handle().0, index, ?direction, "reveal: waiting for editor");
        self.pending.insert(
            cell.handle(),
            AttachWaiter::new(DeferredReveal {
                view_index: index,
                request,
                direction,
            }),
        );
        RevealOutcome::Deferred
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<C, R>(
        &self,
        view: &mut R,
        index: usize,
        cell: &C,
        request: RevealRequest,
        direction: Option<ScrollDirection>,
        newly_created: bool,
        sink: &mut EventSink,
    ) where
        C: NotebookCell,
        R: RenderView + ?Sized,
    {
        let offset = local_offset(cell, request.target);
        let half = view.render_height() as u64 / 2;
        match request.policy {
            RevealPolicy::InView => {
                let align_bottom = direction == Some(ScrollDirection::Forward);
                self.reveal_offset_in_view(view, index, offset, newly_created, align_bottom);
            }
            RevealPolicy::Top => settle(view, index, |t, _| t + offset),
            RevealPolicy::Center | RevealPolicy::CenterIfOutsideViewport => {
                settle(view, index, |t, _| (t + offset).saturating_sub(half));
            }
        }
        reveal_in_editor(cell, request.target, sink);
    }

    /// Scrolls just enough to show a position `offset` below the top of row `index`.
    ///
    /// A freshly materialized row is aligned with the edge the user was scrolling towards.
    fn reveal_offset_in_view<R: RenderView + ?Sized>(
        &self,
        view: &mut R,
        index: usize,
        offset: u64,
        newly_created: bool,
        align_bottom: bool,
    ) {
        let scroll_top = view.scroll_top();
        let render_height = view.render_height() as u64;
        let bottom = scroll_top + render_height;
        let padding = self.padding as u64;
        let position = view.element_top(index) + offset;

        let to_bottom = if position < scroll_top {
            false
        } else if position > bottom {
            true
        } else if newly_created {
            align_bottom
        } else {
            return;
        };

        settle(view, index, |t, _| {
            let position = t + offset;
            if to_bottom {
                (position + padding).saturating_sub(render_height)
            } else {
                position.saturating_sub(padding)
            }
        });
    }
}

/// Whole-cell reveal. Never waits for the editor.
fn reveal_cell<R: RenderView + ?Sized>(view: &mut R, index: usize, policy: RevealPolicy) {
    let scroll_top = view.scroll_top();
    let render_height = view.render_height() as u64;
    let bottom = scroll_top + render_height;
    let top = view.element_top(index);
    let element_bottom = top + view.element_height(index) as u64;

    let ignore_if_inside = matches!(
        policy,
        RevealPolicy::InView | RevealPolicy::CenterIfOutsideViewport
    );
    if ignore_if_inside && top >= scroll_top && top < bottom {
        // A cell that starts below the middle and runs past the bottom still gets centred.
        let below_center = element_bottom > bottom && top > (scroll_top + bottom) / 2;
        if !(policy == RevealPolicy::CenterIfOutsideViewport && below_center) {
            return;
        }
    }

    match policy {
        RevealPolicy::Top => settle(view, index, |t, _| t),
        RevealPolicy::Center | RevealPolicy::CenterIfOutsideViewport => {
            settle(view, index, |t, _| t.saturating_sub(render_height / 2));
        }
        RevealPolicy::InView => {
            settle(view, index, |t, h| (t + h as u64).saturating_sub(render_height));
        }
    }
}

/// Scrolls to `target(top, height)` of row `index`, then re-reads the row's geometry and
/// scrolls again: rows rendered by the first scroll may have changed height.
fn settle<R: RenderView + ?Sized>(view: &mut R, index: usize, target: impl Fn(u64, u32) -> u64) {
    let first = target(view.element_top(index), view.element_height(index));
    view.set_scroll_top(first);
    let second = target(view.element_top(index), view.element_height(index));
    view.set_scroll_top(second);
}

fn local_offset<C: NotebookCell>(cell: &C, target: RevealTarget) -> u64 {
    target
        .position()
        .map_or(0, |(line, column)| cell.position_offset(line, column) as u64)
}

fn reveal_in_editor<C: NotebookCell>(cell: &C, target: RevealTarget, sink: &mut EventSink) {
    if let RevealTarget::Range(range) = target {
        sink.emit(CellListEvent::RevealRangeInEditor {
            handle: cell.handle(),
            range,
        });
    }
}

fn direction_between(from: u64, to: u64) -> Option<ScrollDirection> {
    match to.cmp(&from) {
        cmp::Ordering::Greater => Some(ScrollDirection::Forward),
        cmp::Ordering::Less => Some(ScrollDirection::Backward),
        cmp::Ordering::Equal => None,
    }
}
