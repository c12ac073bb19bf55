//! Previous-snapshot storage

use crate::state::PageState;

/// Single-slot holder of the previous page state
#[derive(Debug, Default)]
pub struct SnapshotStore {
    previous: Option<PageState>,
}

impl SnapshotStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new state, returning the one it displaces
    pub fn update(&mut self, state: PageState) -> Option<PageState> {
        self.previous.replace(state)
    }

    /// The most recently stored state
    #[must_use]
    pub fn previous(&self) -> Option<&PageState> {
        self.previous.as_ref()
    }

    /// Drop the stored state
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
