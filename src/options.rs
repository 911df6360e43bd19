use alloc::string::String;
use alloc::sync::Arc;

use crate::{CellListEvent, OnEventCallback};

/// Configuration for [`crate::CellList`].
///
/// Cheap to clone: the event callback is stored in an `Arc`.
pub struct CellListOptions {
    /// Name of the list's owner, reported in errors so a failing query can be traced back to
    /// the surface that issued it.
    pub list_user: String,

    /// Space kept between a line revealed "in view" and the viewport edge it is aligned with.
    pub reveal_padding: u32,

    /// Optional callback fired synchronously for every emitted event.
    ///
    /// Events are queued for [`crate::CellList::take_events`] either way.
    pub on_event: Option<OnEventCallback>,
}

impl CellListOptions {
    pub fn new(list_user: impl Into<String>) -> Self {
        Self {
            list_user: list_user.into(),
            ..Self::default()
        }
    }

    pub fn with_reveal_padding(mut self, reveal_padding: u32) -> Self {
        self.reveal_padding = reveal_padding;
        self
    }

    pub fn with_on_event(
        mut self,
        on_event: impl Fn(&CellListEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(Arc::new(on_event));
        self
    }
}

impl Default for CellListOptions {
    fn default() -> Self {
        Self {
            list_user: String::from("notebook"),
            reveal_padding: 30,
            on_event: None,
        }
    }
}

impl Clone for CellListOptions {
    fn clone(&self) -> Self {
        Self {
            list_user: self.list_user.clone(),
            reveal_padding: self.reveal_padding,
            on_event: self.on_event.clone(),
        }
    }
}

impl core::fmt::Debug for CellListOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellListOptions")
            .field("list_user", &self.list_user)
            .field("reveal_padding", &self.reveal_padding)
            .field("on_event", &self.on_event.as_ref().map(|_| ".."))
            .finish()
    }
}
