//! Unit tests for the extractors

use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::{Engine as _, general_purpose::STANDARD};
use serde_json::{Value, json};

use super::{A11yExtractor, DomExtractor, Extractor, HybridExtractor, VisionExtractor, a11y};
use crate::page::{AxNode, Page, PageError, PageResult, ScreenshotOptions};
use crate::refs::RefManager;
use crate::state::RepresentationType;

fn ax_node(payload: Value) -> AxNode {
    serde_json::from_value(payload).expect("valid test payload")
}

/// Flat accessibility payload: a web area with a heading, a pruned empty
/// container, and a button
fn simple_tree() -> Vec<AxNode> {
    vec![
        ax_node(json!({
            "nodeId": "1",
            "role": {"value": "RootWebArea"},
            "name": {"value": "Demo"},
            "childIds": ["2", "3", "4"],
        })),
        ax_node(json!({
            "nodeId": "2",
            "parentId": "1",
            "role": {"value": "heading"},
            "name": {"value": "Welcome"},
        })),
        ax_node(json!({
            "nodeId": "3",
            "parentId": "1",
            "role": {"value": "GenericContainer"},
        })),
        ax_node(json!({
            "nodeId": "4",
            "parentId": "1",
            "role": {"value": "button"},
            "name": {"value": "Submit"},
            "properties": [
                {"name": "disabled", "value": {"value": true}},
            ],
        })),
    ]
}

/// Configurable stub page
struct StubPage {
    url: String,
    ax: Option<Vec<AxNode>>,
    dom_payload: Option<Value>,
    boxes_payload: Value,
    screenshot: Option<Vec<u8>>,
    fail_clipped: bool,
    captured: Mutex<Vec<ScreenshotOptions>>,
}

impl StubPage {
    fn new() -> Self {
        Self {
            url: "https://example.com".to_string(),
            ax: Some(simple_tree()),
            dom_payload: None,
            boxes_payload: json!([]),
            screenshot: None,
            fail_clipped: false,
            captured: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Page for StubPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn title(&self) -> PageResult<String> {
        Ok("Stub Page".to_string())
    }

    async fn evaluate(&self, script: &str) -> PageResult<Value> {
        if script.contains("serializeNode") {
            return self
                .dom_payload
                .clone()
                .ok_or_else(|| PageError::Evaluation("no dom payload".to_string()));
        }
        if script.contains("getBoundingClientRect") {
            return Ok(self.boxes_payload.clone());
        }
        Err(PageError::Evaluation("unexpected script".to_string()))
    }

    async fn accessibility_tree(&self) -> PageResult<Vec<AxNode>> {
        self.ax
            .clone()
            .ok_or_else(|| PageError::AccessibilityUnavailable("gone".to_string()))
    }

    async fn screenshot(&self, options: ScreenshotOptions) -> PageResult<Vec<u8>> {
        if self.fail_clipped && options.clip.is_some() {
            return Err(PageError::Screenshot("clip failed".to_string()));
        }
        self.captured.lock().unwrap().push(options);
        self.screenshot
            .clone()
            .ok_or_else(|| PageError::Screenshot("no screenshot".to_string()))
    }
}

// =============================================================================
// A11y extraction
// =============================================================================

#[tokio::test]
async fn test_a11y_normalizes_roles_and_prunes_wrappers() {
    let page = StubPage::new();
    let mut refs = RefManager::new();

    let state = A11yExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert_eq!(state.representation_type, RepresentationType::A11yTree);
    assert_eq!(state.root.role, "document");
    assert_eq!(state.root.name, "Demo");
    // The empty GenericContainer is pruned
    assert_eq!(state.root.children.len(), 2);
    assert_eq!(state.root.children[0].role, "heading");
    assert_eq!(state.root.children[1].role, "button");
    assert!(state.root.children[1].disabled);
}

#[tokio::test]
async fn test_a11y_reparents_through_ignored_nodes() {
    let nodes = vec![
        ax_node(json!({
            "nodeId": "1",
            "role": {"value": "RootWebArea"},
            "name": {"value": "Demo"},
            "childIds": ["2"],
        })),
        ax_node(json!({
            "nodeId": "2",
            "parentId": "1",
            "ignored": true,
            "childIds": ["3"],
        })),
        ax_node(json!({
            "nodeId": "3",
            "parentId": "2",
            "role": {"value": "button"},
            "name": {"value": "Buried"},
        })),
    ];
    let mut refs = RefManager::new();

    let root = a11y::build_tree(&nodes, &mut refs);

    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].role, "button");
    assert_eq!(root.children[0].name, "Buried");
}

#[tokio::test]
async fn test_a11y_refs_are_stable_across_extractions() {
    let page = StubPage::new();
    let mut refs = RefManager::new();
    let extractor = A11yExtractor::new();

    let first = extractor.extract(&page, &mut refs).await.unwrap();
    let second = extractor.extract(&page, &mut refs).await.unwrap();

    assert_eq!(first.root.node_ref, second.root.node_ref);
    assert_eq!(
        first.root.children[1].node_ref,
        second.root.children[1].node_ref
    );
}

#[tokio::test]
async fn test_a11y_unavailable_tree_degrades_to_document_stub() {
    let mut page = StubPage::new();
    page.ax = None;
    let mut refs = RefManager::new();

    let state = A11yExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert_eq!(state.root.role, "document");
    assert!(state.root.children.is_empty());
}

#[tokio::test]
async fn test_a11y_live_region_politeness_is_kept() {
    let nodes = vec![ax_node(json!({
        "nodeId": "1",
        "role": {"value": "status"},
        "name": {"value": "Saving"},
        "properties": [
            {"name": "live", "value": {"value": "polite"}},
        ],
    }))];
    let mut refs = RefManager::new();

    let root = a11y::build_tree(&nodes, &mut refs);
    assert_eq!(root.live, "polite");
}

// =============================================================================
// Distilled DOM extraction
// =============================================================================

#[tokio::test]
async fn test_dom_extraction_converts_payload() {
    let mut page = StubPage::new();
    page.dom_payload = Some(json!({
        "role": "main",
        "name": "",
        "value": "",
        "checked": null,
        "expanded": null,
        "disabled": false,
        "children": [
            {
                "role": "textbox",
                "name": "Search",
                "value": "laptop",
                "checked": null,
                "expanded": null,
                "disabled": false,
                "children": [],
            },
            {
                "role": "button",
                "name": "Filters",
                "value": "",
                "checked": null,
                "expanded": "true",
                "disabled": true,
                "children": [],
            },
        ],
    }));
    let mut refs = RefManager::new();

    let state = DomExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert_eq!(state.representation_type, RepresentationType::DistilledDom);
    assert_eq!(state.root.role, "main");
    assert_eq!(state.root.children[0].value, "laptop");
    assert_eq!(state.root.children[1].expanded, Some(true));
    assert!(state.root.children[1].disabled);
}

#[tokio::test]
async fn test_dom_malformed_payload_degrades_to_document_stub() {
    let mut page = StubPage::new();
    page.dom_payload = Some(Value::Null);
    let mut refs = RefManager::new();

    let state = DomExtractor::new().extract(&page, &mut refs).await.unwrap();
    assert_eq!(state.root.role, "document");
}

#[tokio::test]
async fn test_dom_evaluation_failure_is_an_error() {
    let page = StubPage::new();
    let mut refs = RefManager::new();

    assert!(DomExtractor::new().extract(&page, &mut refs).await.is_err());
}

// =============================================================================
// Vision extraction
// =============================================================================

#[tokio::test]
async fn test_vision_attaches_screenshot_and_skeleton() {
    let mut page = StubPage::new();
    page.screenshot = Some(b"jpeg-bytes".to_vec());
    let mut refs = RefManager::new();

    let state = VisionExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert_eq!(state.representation_type, RepresentationType::Vision);
    assert_eq!(state.screenshot_b64, Some(STANDARD.encode(b"jpeg-bytes")));
    // The skeleton is still there so diffs have something to compare
    assert_eq!(state.root.children.len(), 2);
}

#[tokio::test]
async fn test_vision_screenshot_failure_degrades() {
    let page = StubPage::new();
    let mut refs = RefManager::new();

    let state = VisionExtractor::new().extract(&page, &mut refs).await.unwrap();
    assert!(state.screenshot_b64.is_none());
}

// =============================================================================
// Hybrid extraction
// =============================================================================

#[tokio::test]
async fn test_hybrid_without_regions_has_no_screenshot() {
    let mut page = StubPage::new();
    page.screenshot = Some(b"jpeg-bytes".to_vec());
    let mut refs = RefManager::new();

    let state = HybridExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert_eq!(state.representation_type, RepresentationType::Hybrid);
    assert!(state.screenshot_b64.is_none());
    assert!(page.captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_hybrid_single_region_is_clipped() {
    let mut page = StubPage::new();
    page.screenshot = Some(b"jpeg-bytes".to_vec());
    page.boxes_payload = json!([{"x": -4.0, "y": 20.0, "width": 300.0, "height": 150.0}]);
    let mut refs = RefManager::new();

    let state = HybridExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert!(state.screenshot_b64.is_some());
    let captured = page.captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let clip = captured[0].clip.expect("clipped capture");
    // Negative offsets are clamped
    assert!((clip.x - 0.0).abs() < f64::EPSILON);
    assert!((clip.width - 300.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_hybrid_multiple_regions_capture_viewport() {
    let mut page = StubPage::new();
    page.screenshot = Some(b"jpeg-bytes".to_vec());
    page.boxes_payload = json!([
        {"x": 0.0, "y": 0.0, "width": 100.0, "height": 100.0},
        {"x": 200.0, "y": 0.0, "width": 100.0, "height": 100.0},
    ]);
    let mut refs = RefManager::new();

    let state = HybridExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert!(state.screenshot_b64.is_some());
    let captured = page.captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].clip.is_none());
}

#[tokio::test]
async fn test_hybrid_clip_failure_falls_back_to_viewport() {
    let mut page = StubPage::new();
    page.screenshot = Some(b"jpeg-bytes".to_vec());
    page.boxes_payload = json!([{"x": 0.0, "y": 0.0, "width": 100.0, "height": 100.0}]);
    page.fail_clipped = true;
    let mut refs = RefManager::new();

    let state = HybridExtractor::new().extract(&page, &mut refs).await.unwrap();

    assert!(state.screenshot_b64.is_some());
    let captured = page.captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].clip.is_none());
}
