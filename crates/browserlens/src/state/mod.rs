//! Core data model shared across the observation pipeline

mod delta;
mod node;
mod signals;

use std::fmt;

pub use delta::{Delta, NodeChange, Prop, PropValue};
pub use node::StateNode;
pub use signals::{PageSignals, PageType};

pub(crate) use signals::origin_of;

/// The representation a page state was extracted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationType {
    /// Full accessibility tree, text only
    A11yTree,
    /// Distilled DOM walk, text only
    DistilledDom,
    /// Screenshot plus a skeletal accessibility tree
    Vision,
    /// Accessibility tree plus a targeted screenshot
    Hybrid,
}

impl RepresentationType {
    /// Lowercase label used in formatted output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A11yTree => "a11y_tree",
            Self::DistilledDom => "distilled_dom",
            Self::Vision => "vision",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RepresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full snapshot of a page at a given moment
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    /// Page URL at extraction time
    pub url: String,

    /// Page title at extraction time
    pub title: String,

    /// Representation this state was extracted with
    pub representation_type: RepresentationType,

    /// Root of the normalized tree
    pub root: StateNode,

    /// Base64 JPEG screenshot when the representation includes vision
    pub screenshot_b64: Option<String>,

    /// Observer step number that produced this state
    pub step: u64,
}

impl PageState {
    /// Create a state without a screenshot; the observer stamps `step`
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        representation_type: RepresentationType,
        root: StateNode,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            representation_type,
            root,
            screenshot_b64: None,
            step: 0,
        }
    }

    /// Total number of nodes in the tree
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

/// What [`crate::observer::Observer::observe`] returns to the agent
#[derive(Debug, Clone)]
pub struct ObservationResult {
    /// Monotonic step number of this observation
    pub step: u64,

    /// Page URL at observation time
    pub url: String,

    /// Representation chosen for this observation
    pub representation_type: RepresentationType,

    /// LLM-ready text, either a full state or a delta
    pub formatted_text: String,

    /// The computed diff, `None` when diffing is disabled
    pub delta: Option<Delta>,

    /// The extracted page state backing this observation
    pub page_state: PageState,

    /// Token count of `formatted_text`
    pub token_count: usize,

    /// Wall-clock duration of the whole observation in milliseconds
    pub latency_ms: f64,

    /// True when a computed diff was discarded in favor of full state
    pub diff_discarded: bool,
}
