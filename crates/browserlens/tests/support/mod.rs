//! Scripted in-memory page for pipeline tests

use std::sync::Mutex;

use async_trait::async_trait;
use browserlens::page::{AxNode, Page, PageError, PageResult, ScreenshotOptions};
use serde_json::{Value, json};

/// Install a subscriber once so `RUST_LOG=browserlens=debug` surfaces
/// pipeline tracing during test runs
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Build a raw accessibility node from a JSON literal
pub fn ax_node(payload: Value) -> AxNode {
    serde_json::from_value(payload).expect("valid test payload")
}

/// A document root with the given child node ids
pub fn ax_root(title: &str, child_ids: &[&str]) -> AxNode {
    ax_node(json!({
        "nodeId": "1",
        "role": {"value": "RootWebArea"},
        "name": {"value": title},
        "childIds": child_ids,
    }))
}

/// A leaf node under the root
pub fn ax_leaf(node_id: &str, role: &str, name: &str) -> AxNode {
    ax_node(json!({
        "nodeId": node_id,
        "parentId": "1",
        "role": {"value": role},
        "name": {"value": name},
    }))
}

/// A leaf node carrying a value
pub fn ax_valued_leaf(node_id: &str, role: &str, name: &str, value: &str) -> AxNode {
    ax_node(json!({
        "nodeId": node_id,
        "parentId": "1",
        "role": {"value": role},
        "name": {"value": name},
        "value": {"value": value},
    }))
}

/// A page whose state is scripted by the test
pub struct ScriptedPage {
    url: Mutex<String>,
    title: String,
    tree: Mutex<Vec<AxNode>>,
    profile: Mutex<Value>,
    named: Mutex<Value>,
    dom_payload: Value,
    boxes_payload: Value,
    screenshot: Option<Vec<u8>>,
}

impl ScriptedPage {
    /// A page with no interactive elements, which routes to the plain
    /// accessibility tree
    pub fn new(url: &str, tree: Vec<AxNode>) -> Self {
        Self {
            url: Mutex::new(url.to_string()),
            title: "Scripted Page".to_string(),
            tree: Mutex::new(tree),
            profile: Mutex::new(json!({
                "interactiveCount": 0,
                "nodeCount": 40,
                "maxDepth": 6,
                "avgChildren": 2.0,
                "hasCanvas": false,
                "hasWebGL": false,
            })),
            named: Mutex::new(json!(0)),
            dom_payload: json!({
                "role": "main",
                "name": "",
                "value": "",
                "checked": null,
                "expanded": null,
                "disabled": false,
                "children": [],
            }),
            boxes_payload: json!([{"x": 10.0, "y": 10.0, "width": 200.0, "height": 100.0}]),
            screenshot: Some(b"jpeg-bytes".to_vec()),
        }
    }

    /// Replace the accessibility tree for the next observation
    pub fn set_tree(&self, tree: Vec<AxNode>) {
        *self.tree.lock().unwrap() = tree;
    }

    /// Simulate a navigation
    pub fn set_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }

    /// Replace the router profile payload
    pub fn set_profile(&self, interactive: u64, named: u64, has_canvas: bool) {
        *self.profile.lock().unwrap() = json!({
            "interactiveCount": interactive,
            "nodeCount": 40,
            "maxDepth": 6,
            "avgChildren": 2.0,
            "hasCanvas": has_canvas,
            "hasWebGL": false,
        });
        *self.named.lock().unwrap() = json!(named);
    }
}

#[async_trait]
impl Page for ScriptedPage {
    fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn title(&self) -> PageResult<String> {
        Ok(self.title.clone())
    }

    async fn evaluate(&self, script: &str) -> PageResult<Value> {
        if script.contains("interactiveCount") {
            return Ok(self.profile.lock().unwrap().clone());
        }
        if script.contains("named++") {
            return Ok(self.named.lock().unwrap().clone());
        }
        if script.contains("serializeNode") {
            return Ok(self.dom_payload.clone());
        }
        if script.contains("getBoundingClientRect") {
            return Ok(self.boxes_payload.clone());
        }
        Err(PageError::Evaluation("unexpected script".to_string()))
    }

    async fn accessibility_tree(&self) -> PageResult<Vec<AxNode>> {
        Ok(self.tree.lock().unwrap().clone())
    }

    async fn screenshot(&self, _options: ScreenshotOptions) -> PageResult<Vec<u8>> {
        self.screenshot
            .clone()
            .ok_or_else(|| PageError::Screenshot("no screenshot".to_string()))
    }
}
