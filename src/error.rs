//! Error types for the cell list.

use alloc::string::String;

use thiserror::Error;

use crate::CellHandle;

/// Errors raised by [`crate::CellList`] geometry queries.
///
/// Unresolvable reveal, focus and selection targets are not errors; those calls are no-ops.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CellListError {
    /// A geometry query named a cell that has no rendered row (it is hidden). `index` is the
    /// cell's model index.
    #[error("{user}: invalid index {index}")]
    InvalidIndex { user: String, index: usize },

    /// The cell is not part of the attached model, or no model is attached.
    #[error("{user}: cell {handle:?} is not in the notebook")]
    UnknownCell { user: String, handle: CellHandle },
}

/// Result type for cell list operations.
pub type Result<T> = core::result::Result<T, CellListError>;
