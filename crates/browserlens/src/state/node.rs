//! Normalized tree nodes

use crate::refs::{Fingerprint, NodeRef};

/// A single node in the normalized accessibility/DOM tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    /// Stable `@eN` reference
    pub node_ref: NodeRef,

    /// Normalized ARIA role (`button`, `textbox`, `link`, `heading`, ...)
    pub role: String,

    /// Accessible name, may be empty
    pub name: String,

    /// Current value for inputs and selects
    pub value: String,

    /// Checked state for checkboxes and radios, `None` when unset
    pub checked: Option<bool>,

    /// Expanded state for trees and accordions, `None` when unset
    pub expanded: Option<bool>,

    /// Whether the element is disabled
    pub disabled: bool,

    /// Whether the element currently holds focus
    pub focused: bool,

    /// aria-live region politeness (`polite`, `assertive`), empty when not live
    pub live: String,

    /// Child nodes in source order
    pub children: Vec<StateNode>,
}

impl StateNode {
    /// Create a node with default property values
    #[must_use]
    pub fn new(node_ref: NodeRef, role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_ref,
            role: role.into(),
            name: name.into(),
            value: String::new(),
            checked: None,
            expanded: None,
            disabled: false,
            focused: false,
            live: String::new(),
            children: Vec::new(),
        }
    }

    /// Set the current value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the checked tri-state
    #[must_use]
    pub fn with_checked(mut self, checked: Option<bool>) -> Self {
        self.checked = checked;
        self
    }

    /// Set the expanded tri-state
    #[must_use]
    pub fn with_expanded(mut self, expanded: Option<bool>) -> Self {
        self.expanded = expanded;
        self
    }

    /// Set the disabled flag
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the focused flag
    #[must_use]
    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the aria-live region value
    #[must_use]
    pub fn with_live(mut self, live: impl Into<String>) -> Self {
        self.live = live.into();
        self
    }

    /// Append a child node
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// The identity key for re-identification across observations
    #[must_use]
    pub fn fingerprint(&self, parent_role: &str) -> Fingerprint {
        Fingerprint::new(self.role.clone(), self.name.clone(), parent_role)
    }

    /// Total number of nodes in this subtree, including `self`
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Number of leaves in this subtree
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(Self::leaf_count).sum()
        }
    }
}
