//! Fast, cheap page characterization for the router

use serde::Deserialize;
use tracing::warn;

use crate::page::Page;
use crate::state::{PageSignals, PageType};

/// Interactive counts, DOM shape, and canvas/WebGL presence in one pass
const PAGE_PROFILE_JS: &str = r#"() => {
    const interactive = document.querySelectorAll(
        'a[href], button, input, select, textarea, ' +
        '[role="button"], [role="link"], [role="checkbox"], ' +
        '[role="radio"], [role="combobox"], [role="listbox"], ' +
        '[role="menuitem"], [role="tab"], [role="switch"]'
    );

    const allNodes = document.querySelectorAll('*');
    let maxDepth = 0;
    let totalChildren = 0;
    const nodeCount = allNodes.length;
    for (const el of allNodes) {
        let depth = 0;
        let cur = el;
        while (cur.parentElement) { depth++; cur = cur.parentElement; }
        if (depth > maxDepth) maxDepth = depth;
        totalChildren += el.children.length;
    }

    const canvases = document.querySelectorAll('canvas, [data-canvas]');
    let hasWebGL = false;
    for (const c of canvases) {
        if (c.tagName === 'CANVAS') {
            try {
                if (c.getContext('webgl') || c.getContext('webgl2')) {
                    hasWebGL = true;
                }
            } catch (_) {}
        }
    }

    return {
        interactiveCount: interactive.length,
        nodeCount,
        maxDepth,
        avgChildren: nodeCount > 0 ? totalChildren / nodeCount : 0,
        hasCanvas: canvases.length > 0,
        hasWebGL,
    };
}"#;

/// Count of interactive elements with an accessible name
const NAMED_INTERACTIVE_JS: &str = r#"() => {
    const els = document.querySelectorAll(
        'a[href], button, input, select, textarea, ' +
        '[role="button"], [role="link"], [role="checkbox"], ' +
        '[role="radio"], [role="combobox"], [role="listbox"], ' +
        '[role="menuitem"], [role="tab"], [role="switch"]'
    );
    let named = 0;
    for (const el of els) {
        const label =
            el.getAttribute('aria-label') ||
            el.getAttribute('aria-labelledby') ||
            el.getAttribute('title') ||
            el.getAttribute('placeholder') ||
            el.innerText?.trim() ||
            el.value?.trim();
        if (label) named++;
    }
    return named;
}"#;

/// URL path substrings mapped to page types
const PAGE_TYPE_PATTERNS: &[(PageType, &[&str])] = &[
    (
        PageType::Form,
        &["/login", "/signup", "/register", "/checkout", "/contact", "/form"],
    ),
    (
        PageType::Dashboard,
        &["/dashboard", "/admin", "/analytics", "/metrics", "/stats"],
    ),
    (
        PageType::Article,
        &["/article", "/blog", "/post", "/news", "/wiki"],
    ),
    (PageType::Search, &["/search", "/results", "/find", "/query"]),
];

/// The page-profile payload, coerced defensively
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProfile {
    interactive_count: u64,
    node_count: u64,
    max_depth: u32,
    avg_children: f64,
    has_canvas: bool,
    #[serde(rename = "hasWebGL")]
    has_webgl: bool,
}

/// Collects [`PageSignals`] used by the adaptive router
#[derive(Debug, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    /// Create a new extractor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Profile the page
    ///
    /// Evaluation failures degrade to default signals for the current URL,
    /// which route to the vision fallback.
    pub async fn extract(&self, page: &dyn Page) -> PageSignals {
        let url = page.url();
        let mut signals = PageSignals::for_url(&url);
        signals.page_type = classify_page_type(&url);

        let profile = match page.evaluate(PAGE_PROFILE_JS).await {
            Ok(payload) => serde_json::from_value::<RawProfile>(payload).unwrap_or_else(|error| {
                warn!(%error, "malformed page profile payload, using defaults");
                RawProfile::default()
            }),
            Err(error) => {
                warn!(%error, "page profiling failed, using default signals");
                return signals;
            }
        };

        signals.has_canvas = profile.has_canvas;
        signals.has_webgl = profile.has_webgl;
        signals.dom_node_count = profile.node_count;
        signals.dom_max_depth = profile.max_depth;
        signals.dom_avg_children = profile.avg_children;
        signals.a11y_coverage = self.coverage(page, profile.interactive_count).await;

        signals
    }

    /// Ratio of interactive elements carrying an accessible name
    #[allow(clippy::cast_precision_loss)]
    async fn coverage(&self, page: &dyn Page, total_interactive: u64) -> f64 {
        if total_interactive == 0 {
            return 1.0;
        }

        let named = match page.evaluate(NAMED_INTERACTIVE_JS).await {
            Ok(payload) => payload.as_f64().unwrap_or(0.0),
            Err(error) => {
                warn!(%error, "coverage probe failed");
                0.0
            }
        };

        (named / total_interactive as f64).min(1.0)
    }
}

/// Classify a page from its URL path
pub(crate) fn classify_page_type(url: &str) -> PageType {
    let path = url::Url::parse(url)
        .map(|parsed| parsed.path().to_lowercase())
        .unwrap_or_default();

    for (page_type, patterns) in PAGE_TYPE_PATTERNS {
        if patterns.iter().any(|pattern| path.contains(pattern)) {
            return *page_type;
        }
    }
    PageType::Unknown
}
