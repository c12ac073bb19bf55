//! Stable node reference management
//!
//! Backing identifiers from the browser (DOM node ids, accessibility node
//! ids) change between observations. [`RefManager`] keys nodes by their
//! `(role, name, parent_role)` fingerprint instead and hands out compact
//! `@eN` labels that survive re-extraction and representation switches, so
//! the agent can keep referring to "that Login button" across turns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A stable node reference of the form `@e<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    /// Create a reference from its 1-based index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The numeric index behind the label
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@e{}", self.0)
    }
}

impl FromStr for NodeRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .strip_prefix("@e")
            .and_then(|digits| digits.parse::<u32>().ok())
            .filter(|index| *index > 0)
            .ok_or_else(|| format!("invalid reference '{s}'. Expected format: @e<n>"))?;
        Ok(Self(index))
    }
}

/// The identity key used to re-identify a node across observations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Normalized ARIA role
    pub role: String,

    /// Accessible name
    pub name: String,

    /// Role of the parent node, empty for the root
    pub parent_role: String,
}

impl Fingerprint {
    /// Create a fingerprint from its three components
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        name: impl Into<String>,
        parent_role: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            parent_role: parent_role.into(),
        }
    }
}

/// Issues and maintains stable `@eN` references
///
/// A fingerprint that has been seen before gets the same reference on every
/// subsequent step, even if the underlying node shuffled around in the tree.
/// New fingerprints get the next available index.
#[derive(Debug, Default)]
pub struct RefManager {
    counter: u32,
    by_fingerprint: HashMap<Fingerprint, NodeRef>,
    by_ref: HashMap<NodeRef, Fingerprint>,
}

impl RefManager {
    /// Create an empty manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reference for a fingerprint, allocating the next `@eN`
    /// when the fingerprint has never been seen on this manager
    pub fn get_or_create(&mut self, fingerprint: &Fingerprint) -> NodeRef {
        if let Some(existing) = self.by_fingerprint.get(fingerprint) {
            return *existing;
        }
        self.counter += 1;
        let node_ref = NodeRef::new(self.counter);
        self.by_fingerprint.insert(fingerprint.clone(), node_ref);
        self.by_ref.insert(node_ref, fingerprint.clone());
        node_ref
    }

    /// Look up the fingerprint a reference was allocated for
    #[must_use]
    pub fn lookup(&self, node_ref: NodeRef) -> Option<&Fingerprint> {
        self.by_ref.get(&node_ref)
    }

    /// Clear both mappings and the counter
    pub fn reset(&mut self) {
        self.counter = 0;
        self.by_fingerprint.clear();
        self.by_ref.clear();
    }

    /// Total number of references allocated so far
    #[must_use]
    pub fn total_refs(&self) -> u32 {
        self.counter
    }
}
