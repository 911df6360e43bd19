use alloc::vec::Vec;

use crate::{CellHandle, CellRange};

/// A lightweight, serializable snapshot of a list's view state.
///
/// Capture it with [`crate::CellList::view_state`] and hand it back to
/// [`crate::CellList::restore_view_state`] after re-attaching the same notebook. Hidden ranges
/// are stored as model indexes.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListViewState {
    pub scroll_top: u64,
    pub focus: Option<CellHandle>,
    pub hidden_ranges: Vec<CellRange>,
}
