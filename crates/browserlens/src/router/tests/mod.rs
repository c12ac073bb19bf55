//! Unit tests for signals, strategy, and the adaptive router

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{AdaptiveRouter, HeuristicStrategy, RepresentationStrategy, SignalExtractor};
use crate::page::{AxNode, Page, PageError, PageResult, ScreenshotOptions};
use super::signals::classify_page_type;
use crate::state::{PageSignals, PageType, RepresentationType};

fn signals(coverage: f64) -> PageSignals {
    let mut signals = PageSignals::for_url("https://example.com");
    signals.a11y_coverage = coverage;
    signals.dom_node_count = 500;
    signals.dom_max_depth = 8;
    signals.dom_avg_children = 2.5;
    signals
}

// =============================================================================
// HeuristicStrategy
// =============================================================================

#[test]
fn test_high_coverage_selects_a11y_tree() {
    let strategy = HeuristicStrategy::new();
    assert_eq!(strategy.select(&signals(0.9)), RepresentationType::A11yTree);
}

#[test]
fn test_canvas_with_low_coverage_selects_hybrid() {
    let strategy = HeuristicStrategy::new();
    let mut probe = signals(0.3);
    probe.has_canvas = true;
    assert_eq!(strategy.select(&probe), RepresentationType::Hybrid);
}

#[test]
fn test_webgl_with_low_coverage_selects_hybrid() {
    let strategy = HeuristicStrategy::new();
    let mut probe = signals(0.4);
    probe.has_webgl = true;
    assert_eq!(strategy.select(&probe), RepresentationType::Hybrid);
}

#[test]
fn test_canvas_with_high_coverage_selects_a11y_tree() {
    // Canvas present but a11y is good, no need for vision
    let strategy = HeuristicStrategy::new();
    let mut probe = signals(0.9);
    probe.has_canvas = true;
    assert_eq!(strategy.select(&probe), RepresentationType::A11yTree);
}

#[test]
fn test_moderate_coverage_small_dom_selects_distilled_dom() {
    let strategy = HeuristicStrategy::new();
    let mut probe = signals(0.6);
    probe.dom_node_count = 800;
    assert_eq!(strategy.select(&probe), RepresentationType::DistilledDom);
}

#[test]
fn test_moderate_coverage_large_dom_selects_hybrid() {
    let strategy = HeuristicStrategy::new();
    let mut probe = signals(0.6);
    probe.dom_node_count = 3000;
    assert_eq!(strategy.select(&probe), RepresentationType::Hybrid);
}

#[test]
fn test_very_low_coverage_selects_vision() {
    let strategy = HeuristicStrategy::new();
    assert_eq!(strategy.select(&signals(0.1)), RepresentationType::Vision);
}

#[test]
fn test_strategy_is_deterministic() {
    let strategy = HeuristicStrategy::new();
    let probe = signals(0.55);
    let first = strategy.select(&probe);
    for _ in 0..10 {
        assert_eq!(strategy.select(&probe), first);
    }
}

// =============================================================================
// Page classification and origins
// =============================================================================

#[test]
fn test_classify_page_type_from_path() {
    assert_eq!(classify_page_type("https://shop.example/checkout/step2"), PageType::Form);
    assert_eq!(classify_page_type("https://app.example/admin"), PageType::Dashboard);
    assert_eq!(classify_page_type("https://news.example/article/42"), PageType::Article);
    assert_eq!(classify_page_type("https://example.com/search?q=x"), PageType::Search);
    assert_eq!(classify_page_type("https://example.com/pricing"), PageType::Unknown);
}

#[test]
fn test_origin_extraction() {
    let mut probe = PageSignals::for_url("https://app.example.com/dashboard?tab=1");
    assert_eq!(probe.origin(), "https://app.example.com");

    probe.url = "http://localhost:3000/page".to_string();
    assert_eq!(probe.origin(), "http://localhost:3000");
}

// =============================================================================
// SignalExtractor and AdaptiveRouter
// =============================================================================

/// A page whose profiling payloads are canned; counts evaluate calls
struct ProfiledPage {
    url: Mutex<String>,
    profile: Value,
    named: Value,
    profile_evals: AtomicUsize,
    fail_evaluate: bool,
}

impl ProfiledPage {
    fn new(url: &str, profile: Value, named: Value) -> Self {
        Self {
            url: Mutex::new(url.to_string()),
            profile,
            named,
            profile_evals: AtomicUsize::new(0),
            fail_evaluate: false,
        }
    }

    fn failing(url: &str) -> Self {
        let mut page = Self::new(url, json!({}), json!(0));
        page.fail_evaluate = true;
        page
    }

    fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }
}

#[async_trait]
impl Page for ProfiledPage {
    fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn title(&self) -> PageResult<String> {
        Ok("Profiled".to_string())
    }

    async fn evaluate(&self, script: &str) -> PageResult<Value> {
        if self.fail_evaluate {
            return Err(PageError::Evaluation("boom".to_string()));
        }
        if script.contains("interactiveCount") {
            self.profile_evals.fetch_add(1, Ordering::SeqCst);
            Ok(self.profile.clone())
        } else {
            Ok(self.named.clone())
        }
    }

    async fn accessibility_tree(&self) -> PageResult<Vec<AxNode>> {
        Ok(Vec::new())
    }

    async fn screenshot(&self, _options: ScreenshotOptions) -> PageResult<Vec<u8>> {
        Err(PageError::Screenshot("not supported".to_string()))
    }
}

fn profile(interactive: u64, node_count: u64, has_canvas: bool) -> Value {
    json!({
        "interactiveCount": interactive,
        "nodeCount": node_count,
        "maxDepth": 12,
        "avgChildren": 2.0,
        "hasCanvas": has_canvas,
        "hasWebGL": false,
    })
}

#[tokio::test]
async fn test_signal_extractor_computes_coverage() {
    let page = ProfiledPage::new("https://example.com", profile(4, 900, false), json!(2));
    let extractor = SignalExtractor::new();

    let probe = extractor.extract(&page).await;
    assert!((probe.a11y_coverage - 0.5).abs() < f64::EPSILON);
    assert_eq!(probe.dom_node_count, 900);
    assert!(!probe.has_canvas);
}

#[tokio::test]
async fn test_signal_extractor_coverage_is_full_without_interactives() {
    let page = ProfiledPage::new("https://example.com", profile(0, 50, false), json!(0));
    let extractor = SignalExtractor::new();

    let probe = extractor.extract(&page).await;
    assert!((probe.a11y_coverage - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_signal_extractor_degrades_on_evaluation_failure() {
    let page = ProfiledPage::failing("https://example.com/login");
    let extractor = SignalExtractor::new();

    let probe = extractor.extract(&page).await;
    assert!((probe.a11y_coverage - 0.0).abs() < f64::EPSILON);
    assert_eq!(probe.page_type, PageType::Form);

    // Default signals route to the vision fallback
    let strategy = HeuristicStrategy::new();
    assert_eq!(strategy.select(&probe), RepresentationType::Vision);
}

#[tokio::test]
async fn test_router_caches_signals_per_origin() {
    let page = ProfiledPage::new("https://example.com/a", profile(0, 50, false), json!(0));
    let mut router = AdaptiveRouter::new();

    router.get_signals(&page).await;
    router.get_signals(&page).await;
    assert_eq!(page.profile_evals.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_router_cache_hit_rewrites_url() {
    let page = ProfiledPage::new("https://example.com/a", profile(0, 50, false), json!(0));
    let mut router = AdaptiveRouter::new();

    router.get_signals(&page).await;
    page.set_url("https://example.com/b");
    let probe = router.get_signals(&page).await;

    assert_eq!(probe.url, "https://example.com/b");
    assert_eq!(page.profile_evals.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_router_invalidate_cache_forces_reprofile() {
    let page = ProfiledPage::new("https://example.com/a", profile(0, 50, false), json!(0));
    let mut router = AdaptiveRouter::new();

    router.get_signals(&page).await;
    router.invalidate_cache(Some("https://example.com/other"));
    router.get_signals(&page).await;
    assert_eq!(page.profile_evals.load(Ordering::SeqCst), 2);

    router.invalidate_cache(None);
    router.get_signals(&page).await;
    assert_eq!(page.profile_evals.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_router_select_applies_strategy() {
    let page = ProfiledPage::new("https://example.com", profile(0, 50, false), json!(0));
    let mut router = AdaptiveRouter::new();

    // Zero interactives means full coverage, hence the plain tree
    assert_eq!(router.select(&page).await, RepresentationType::A11yTree);
}

#[tokio::test]
async fn test_router_override_bypasses_strategy() {
    let page = ProfiledPage::new("https://example.com", profile(0, 50, false), json!(0));
    let mut router =
        AdaptiveRouter::new().with_override(Box::new(|_| RepresentationType::Vision));

    assert_eq!(router.select(&page).await, RepresentationType::Vision);
}
