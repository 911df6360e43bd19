use alloc::vec::Vec;

use crate::{CellHandle, CellKind, OutputId, SelectionState, TrackedRanges};

/// A cell as seen by the list.
///
/// Implementations are usually cheap handles to shared cell state (e.g. `Rc<MyCell>`): the list
/// keeps clones of rendered cells so it can still inspect a cell after the model dropped it.
pub trait NotebookCell: Clone {
    fn handle(&self) -> CellHandle;

    /// Resource locator identifying the cell's content. Used as diff identity.
    fn uri(&self) -> &str;

    fn kind(&self) -> CellKind;

    fn outputs(&self) -> Vec<OutputId>;

    /// Whether the cell's embedded editor has finished attaching.
    fn editor_attached(&self) -> bool;

    /// Offset of a 1-based text position from the top of the cell.
    ///
    /// Only meaningful once the editor is attached; before that implementations may return
    /// an estimate (or `0`).
    fn position_offset(&self, line: u32, column: u32) -> u32;
}

/// The notebook document the list displays.
///
/// The model owns its cells, their order and the selection. It also persists tracked ranges
/// (see [`TrackedRanges`]), which the list uses to store its hidden ranges.
pub trait NotebookModel: TrackedRanges {
    type Cell: NotebookCell;

    fn cells(&self) -> &[Self::Cell];

    fn cell_count(&self) -> usize {
        self.cells().len()
    }

    fn cell_at(&self, index: usize) -> Option<&Self::Cell> {
        self.cells().get(index)
    }

    fn cell_index(&self, handle: CellHandle) -> Option<usize> {
        self.cells().iter().position(|c| c.handle() == handle)
    }

    fn has_cell(&self, handle: CellHandle) -> bool {
        self.cell_index(handle).is_some()
    }

    fn selection(&self) -> SelectionState;

    fn set_selection(&mut self, selection: SelectionState);
}

/// `delete_count` cells removed at `start`, then `insert_count` cells inserted there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSplice {
    pub start: usize,
    pub delete_count: usize,
    pub insert_count: usize,
}

/// A change notification from the model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellsChange {
    pub splices: Vec<CellSplice>,
    /// Apply immediately (user edits) instead of on the next frame (bulk/external edits).
    pub synchronous: bool,
}

impl CellsChange {
    pub fn synchronous(splices: Vec<CellSplice>) -> Self {
        Self {
            splices,
            synchronous: true,
        }
    }

    pub fn deferred(splices: Vec<CellSplice>) -> Self {
        Self {
            splices,
            synchronous: false,
        }
    }

    /// Total number of inserted cells.
    pub fn inserted(&self) -> usize {
        self.splices.iter().map(|s| s.insert_count).sum()
    }

    /// Total number of removed cells.
    pub fn deleted(&self) -> usize {
        self.splices.iter().map(|s| s.delete_count).sum()
    }
}
