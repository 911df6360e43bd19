use alloc::vec::Vec;

/// Stable identity of a cell, assigned by the notebook model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellHandle(pub u64);

/// Identity of one output attached to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Code,
    Markup,
}

/// An inclusive span `[start, end]` of model indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    pub start: usize,
    pub end: usize, // inclusive
}

impl CellRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "CellRange: start > end ({start} > {end})");
        Self { start, end }
    }

    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// A text span inside a cell's editor. Lines and columns are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl TextRange {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn line(line: u32) -> Self {
        Self::new(line, 1, line, 1)
    }
}

/// What part of a cell a reveal request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevealTarget {
    /// The whole cell.
    Cell,
    /// A single line of the cell's editor.
    Line(u32),
    /// A text range of the cell's editor; the editor is asked to centre it once revealed.
    Range(TextRange),
}

impl RevealTarget {
    /// The text position whose local offset is brought into view, if any.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Cell => None,
            Self::Line(line) => Some((*line, 1)),
            Self::Range(range) => Some((range.start_line, range.start_column)),
        }
    }
}

/// How the viewport is moved to bring a target into view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevealPolicy {
    /// Scroll as little as possible; no-op when the target is already visible.
    InView,
    /// Align the target with the top edge of the viewport.
    Top,
    /// Centre the target in the viewport.
    Center,
    /// Centre the target only when it is currently outside the viewport.
    CenterIfOutsideViewport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    /// Content moved up: the target was below the viewport.
    Forward,
    /// Content moved down: the target was above the viewport.
    Backward,
}

/// Query mode for model index → view index translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexMode {
    /// Only visible items resolve; hidden items yield `None`.
    Exact,
    /// Hidden items resolve to the nearest visible position at or after them.
    UpperBound,
}

/// Focus and selection, expressed as cell handles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionState {
    pub focus: Option<CellHandle>,
    pub selections: Vec<CellHandle>,
}

impl SelectionState {
    pub fn single(handle: CellHandle) -> Self {
        Self {
            focus: Some(handle),
            selections: alloc::vec![handle],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.focus.is_none() && self.selections.is_empty()
    }
}

/// One contiguous edit `{start, delete_count, inserted}` over a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splice<T> {
    pub start: usize,
    pub delete_count: usize,
    pub inserted: Vec<T>,
}

impl<T> Splice<T> {
    pub fn end(&self) -> usize {
        self.start + self.delete_count
    }
}
