//! Diff result types

use std::collections::BTreeMap;
use std::fmt;

use super::RepresentationType;
use super::node::StateNode;
use crate::refs::NodeRef;

/// A semantic property compared between matched nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prop {
    /// Current input value
    Value,
    /// Checked tri-state
    Checked,
    /// Expanded tri-state
    Expanded,
    /// Disabled flag
    Disabled,
    /// Focused flag
    Focused,
    /// aria-live region value
    Live,
}

impl Prop {
    /// The property name as rendered in deltas
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Checked => "checked",
            Self::Expanded => "expanded",
            Self::Disabled => "disabled",
            Self::Focused => "focused",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value captured on either side of a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    /// String-valued properties (`value`, `live`)
    Text(String),
    /// Tri-state properties (`checked`, `expanded`)
    Toggle(Option<bool>),
    /// Boolean properties (`disabled`, `focused`)
    Flag(bool),
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Toggle(None) => f.write_str("unset"),
            Self::Toggle(Some(state)) => write!(f, "{state}"),
            Self::Flag(state) => write!(f, "{state}"),
        }
    }
}

/// A change to a single node between two consecutive snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeChange {
    /// Stable reference of the changed node
    pub node_ref: NodeRef,

    /// Role at the time of the new observation
    pub role: String,

    /// Accessible name at the time of the new observation
    pub name: String,

    /// Semantic properties that differ, as `(old, new)` pairs
    pub changed_props: BTreeMap<Prop, (PropValue, PropValue)>,
}

/// The diff between two consecutive page states
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    /// Step number of the newer observation
    pub step: u64,

    /// Representation the newer observation was extracted with
    pub representation_type: RepresentationType,

    /// Nodes present only in the new tree, in source order
    pub added: Vec<StateNode>,

    /// Nodes present only in the old tree, in source order
    pub removed: Vec<StateNode>,

    /// Matched nodes whose semantic properties differ
    pub changed: Vec<NodeChange>,

    /// Number of nodes untouched by the diff
    pub unchanged_count: usize,

    /// Human-readable list of stable landmarks
    pub unchanged_summary: String,

    /// True when the differ could not or chose not to diff
    pub is_full_state: bool,
}

impl Delta {
    /// A full-state delta carrying no change lists
    #[must_use]
    pub fn full_state(step: u64, representation_type: RepresentationType, node_count: usize) -> Self {
        Self {
            step,
            representation_type,
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
            unchanged_count: node_count,
            unchanged_summary: String::new(),
            is_full_state: true,
        }
    }

    /// Whether the diff carries no changes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of added, removed, and changed entries
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}
