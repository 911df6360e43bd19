use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{CellHandle, OutputId, TextRange};

/// Notifications emitted by [`crate::CellList`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellListEvent {
    /// Outputs of cells that left the view but still exist in the model. Presentation
    /// surfaces may suspend them.
    OutputsHidden(Vec<OutputId>),
    /// Outputs of cells that were removed from the model. Resources keyed to them can be
    /// torn down.
    OutputsRemoved(Vec<OutputId>),
    /// Markup cells spliced out of the view (hidden or deleted).
    CellsRemovedFromView(Vec<CellHandle>),
    /// The focused cell changed.
    FocusChanged(Option<CellHandle>),
    /// A range reveal finished scrolling; the cell's editor should centre `range`.
    RevealRangeInEditor { handle: CellHandle, range: TextRange },
}

/// A callback fired for every emitted event.
pub type OnEventCallback = Arc<dyn Fn(&CellListEvent) + Send + Sync>;

/// Collects events for [`crate::CellList::take_events`] and forwards them to the optional
/// callback.
#[derive(Clone, Default)]
pub struct EventSink {
    queue: Vec<CellListEvent>,
    on_event: Option<OnEventCallback>,
}

impl EventSink {
    pub fn new(on_event: Option<OnEventCallback>) -> Self {
        Self {
            queue: Vec::new(),
            on_event,
        }
    }

    pub fn emit(&mut self, event: CellListEvent) {
        if let Some(cb) = &self.on_event {
            cb(&event);
        }
        self.queue.push(event);
    }

    pub fn pending(&self) -> &[CellListEvent] {
        &self.queue
    }

    pub fn take(&mut self) -> Vec<CellListEvent> {
        core::mem::take(&mut self.queue)
    }

    pub(crate) fn set_on_event(&mut self, on_event: Option<OnEventCallback>) {
        self.on_event = on_event;
    }
}

impl core::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSink")
            .field("queue", &self.queue)
            .field("on_event", &self.on_event.as_ref().map(|_| ".."))
            .finish()
    }
}
