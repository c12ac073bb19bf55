//! Router input signals

use std::fmt;

/// Coarse page classification derived from the URL path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageType {
    /// Login, signup, checkout and similar form-centric pages
    Form,
    /// Admin panels, analytics, metric views
    Dashboard,
    /// Long-form reading content
    Article,
    /// Search and result listings
    Search,
    /// Anything else
    #[default]
    Unknown,
}

impl PageType {
    /// Lowercase label used in logs and formatted output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Dashboard => "dashboard",
            Self::Article => "article",
            Self::Search => "search",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fast page characteristics collected before choosing a representation
#[derive(Debug, Clone, PartialEq)]
pub struct PageSignals {
    /// URL the signals were collected for
    pub url: String,

    /// Whether the page contains `canvas` or `[data-canvas]` elements
    pub has_canvas: bool,

    /// Whether any canvas exposes a WebGL context
    pub has_webgl: bool,

    /// Ratio of interactive elements with an accessible name, in `[0, 1]`
    pub a11y_coverage: f64,

    /// Total DOM element count
    pub dom_node_count: u64,

    /// Maximum DOM nesting depth
    pub dom_max_depth: u32,

    /// Average child count across DOM elements
    pub dom_avg_children: f64,

    /// URL-derived page classification
    pub page_type: PageType,
}

impl PageSignals {
    /// Default signals for a URL, as used when profiling fails
    #[must_use]
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            has_canvas: false,
            has_webgl: false,
            a11y_coverage: 0.0,
            dom_node_count: 0,
            dom_max_depth: 0,
            dom_avg_children: 0.0,
            page_type: PageType::Unknown,
        }
    }

    /// The `scheme://host[:port]` prefix used as the signal cache key
    #[must_use]
    pub fn origin(&self) -> String {
        origin_of(&self.url)
    }
}

/// Derive `scheme://host[:port]` from a URL, falling back to the raw string
/// when it does not parse or has no host
pub(crate) fn origin_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.origin() {
            origin @ url::Origin::Tuple(..) => origin.ascii_serialization(),
            url::Origin::Opaque(_) => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}
