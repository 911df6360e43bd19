//! A headless notebook cell list.
//!
//! The list shows the cells of a notebook model minus the cells inside *hidden ranges* (folded
//! regions). It is UI-agnostic and built from three parts:
//! - [`HiddenRangeIndex`]: translates between model indexes (positions among all cells) and view
//!   indexes (positions among visible cells) using prefix sums over per-row weights.
//! - [`ViewReconciler`]: keeps the rendered cells equal to the visible projection of the model
//!   with minimal splices, and classifies the outputs of cells that leave the view as hidden
//!   (cell still exists) or removed (cell deleted).
//! - [`RevealScheduler`]: scrolls cells, or lines inside them, into view. Line reveals wait for
//!   the cell's editor to attach before settling.
//!
//! [`CellList`] ties them to a [`NotebookModel`] and a [`RenderView`]. [`HeadlessView`] is a
//! render engine that only keeps row geometry, useful for tests and non-graphical frontends.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod diff;
mod error;
mod events;
mod fenwick;
mod hidden;
mod key;
mod list;
mod model;
mod options;
mod range;
mod reconcile;
mod render;
mod reveal;
mod state;
mod tracked;
mod types;


pub use diff::{apply_splices, diff};
pub use error::{CellListError, Result};
pub use events::{CellListEvent, EventSink, OnEventCallback};
pub use hidden::{HiddenRangeIndex, HiddenRangesUpdate, compute_weights};
pub use list::CellList;
pub use model::{CellSplice, CellsChange, NotebookCell, NotebookModel};
pub use options::CellListOptions;
pub use range::{ranges_contain, reduce_ranges};
pub use reconcile::{ReconcileReport, ViewReconciler, visible_projection};
pub use render::{EstimateHeight, HeadlessView, RenderView};
pub use reveal::{AttachOutcome, AttachWaiter, RevealOutcome, RevealRequest, RevealScheduler};
pub use state::ListViewState;
pub use tracked::{Stickiness, TrackedRangeId, TrackedRangeStore, TrackedRanges};
pub use types::{
    CellHandle, CellKind, CellRange, IndexMode, OutputId, RevealPolicy, RevealTarget,
    ScrollDirection, SelectionState, Splice, TextRange,
};
