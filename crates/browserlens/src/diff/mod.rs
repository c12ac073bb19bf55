//! State diffing between consecutive observations
//!
//! [`StateDiffer`] compares the current page state against the stored
//! previous one and emits a filtered [`Delta`]. On the first call, or when
//! the caller forces it after a navigation, it returns a full-state delta
//! instead of a diff. The differ never fails; anything it cannot diff
//! falls back to full state.

mod filter;
mod store;
mod tree;


use std::collections::HashSet;
use std::fmt::Write as _;

pub use filter::SemanticFilter;
pub use store::SnapshotStore;
pub use tree::diff_trees;

use crate::refs::NodeRef;
use crate::state::{Delta, PageState, StateNode};

/// Maximum number of landmarks listed in the unchanged summary
const SUMMARY_LANDMARK_LIMIT: usize = 5;

/// Compares the current page state against the stored previous one
#[derive(Debug, Default)]
pub struct StateDiffer {
    store: SnapshotStore,
    filter: SemanticFilter,
}

impl StateDiffer {
    /// Create a differ with an empty snapshot store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the previous snapshot and store `current`
    ///
    /// Returns a full-state delta on the first call.
    pub fn diff(&mut self, current: &PageState) -> Delta {
        let previous = self.store.update(current.clone());

        let Some(previous) = previous else {
            return Delta::full_state(
                current.step,
                current.representation_type,
                current.node_count(),
            );
        };

        let delta = tree::diff_trees(
            &previous.root,
            &current.root,
            current.step,
            current.representation_type,
        );
        let mut delta = self.filter.filter(delta);
        delta.unchanged_summary = summarize_unchanged(&current.root, &delta);
        delta
    }

    /// URL of the previously stored state, `None` on the first step
    #[must_use]
    pub fn previous_url(&self) -> Option<&str> {
        self.store.previous().map(|state| state.url.as_str())
    }

    /// Store `current` and return a full-state delta without diffing
    ///
    /// Used by the observer on navigation events.
    pub fn force_full_state(&mut self, current: &PageState) -> Delta {
        self.store.update(current.clone());
        Delta::full_state(
            current.step,
            current.representation_type,
            current.node_count(),
        )
    }

    /// Drop the stored snapshot
    pub fn reset(&mut self) {
        self.store.reset();
    }
}

/// Compact summary of what did not change
///
/// Lists top-level children whose entire subtree touches no added, removed,
/// or changed ref.
fn summarize_unchanged(root: &StateNode, delta: &Delta) -> String {
    if delta.unchanged_count == 0 {
        return String::new();
    }

    let mut noisy_refs: HashSet<NodeRef> = delta.changed.iter().map(|change| change.node_ref).collect();
    noisy_refs.extend(delta.added.iter().map(|node| node.node_ref));
    noisy_refs.extend(delta.removed.iter().map(|node| node.node_ref));

    let mut stable_landmarks: Vec<String> = Vec::new();
    for child in &root.children {
        if subtree_touches(child, &noisy_refs) {
            continue;
        }
        let label = if child.name.is_empty() {
            child.role.clone()
        } else {
            child.name.clone()
        };
        let leaves = child.leaf_count();
        if leaves > 1 {
            stable_landmarks.push(format!("{label} ({leaves} items)"));
        } else {
            stable_landmarks.push(label);
        }
    }

    if stable_landmarks.is_empty() {
        return format!("{} nodes unchanged", delta.unchanged_count);
    }

    let mut joined = stable_landmarks
        .iter()
        .take(SUMMARY_LANDMARK_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if stable_landmarks.len() > SUMMARY_LANDMARK_LIMIT {
        let _ = write!(
            joined,
            " and {} more",
            stable_landmarks.len() - SUMMARY_LANDMARK_LIMIT
        );
    }
    format!("{joined} — unchanged")
}

fn subtree_touches(node: &StateNode, refs: &HashSet<NodeRef>) -> bool {
    if refs.contains(&node.node_ref) {
        return true;
    }
    node.children.iter().any(|child| subtree_touches(child, refs))
}
