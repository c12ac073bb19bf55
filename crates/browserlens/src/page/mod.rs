//! The browser page capability consumed by the observation pipeline
//!
//! The pipeline never talks to a concrete driver. Anything that can report
//! its URL and title, evaluate a script, produce a raw accessibility tree,
//! and take a screenshot can be observed. Payloads crossing this boundary
//! come from injected scripts and the debug protocol and are treated as
//! untrusted: every field is optional and coerced defensively.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Result type for page capability operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors reported by a page capability implementation
#[derive(Debug, Error)]
pub enum PageError {
    /// Script evaluation failed or timed out
    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    /// The accessibility tree could not be captured
    #[error("accessibility tree unavailable: {0}")]
    AccessibilityUnavailable(String),

    /// Screenshot capture failed
    #[error("screenshot capture failed: {0}")]
    Screenshot(String),

    /// The page is gone or the transport to it is broken
    #[error("page unavailable: {0}")]
    Unavailable(String),
}

/// A live browser page
///
/// Implementations wrap a driver page (e.g. a CDP session). Within one
/// observer, calls must be serialized by the caller; the pipeline itself
/// holds no lock.
#[async_trait]
pub trait Page: Send + Sync {
    /// Current page URL
    fn url(&self) -> String;

    /// Current document title
    async fn title(&self) -> PageResult<String>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> PageResult<Value>;

    /// Capture the full accessibility tree as a flat node list
    async fn accessibility_tree(&self) -> PageResult<Vec<AxNode>>;

    /// Take a JPEG screenshot
    async fn screenshot(&self, options: ScreenshotOptions) -> PageResult<Vec<u8>>;
}

/// One node of the raw accessibility-tree payload
///
/// Mirrors the debug protocol's full-AX-tree node shape. Nodes arrive as a
/// flat list; tree structure is encoded in `child_ids`/`parent_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxNode {
    /// Engine-assigned node id, unstable across observations
    pub node_id: String,

    /// Whether the engine marked this node as ignored
    pub ignored: bool,

    /// Role envelope
    pub role: Option<AxValue>,

    /// Accessible name envelope
    pub name: Option<AxValue>,

    /// Current value envelope
    pub value: Option<AxValue>,

    /// Named property envelopes (checked, expanded, disabled, ...)
    pub properties: Vec<AxProperty>,

    /// Child node ids in source order
    pub child_ids: Vec<String>,

    /// Parent node id, absent on the root
    pub parent_id: Option<String>,
}

impl AxNode {
    /// The value envelope of a named property, if present
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&AxValue> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_ref())
    }
}

/// The value envelope wrapping every scalar in the raw payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AxValue {
    /// The concrete value; engines send strings, bools, or numbers
    pub value: Value,
}

impl AxValue {
    /// Coerce to a string, accepting any scalar the engine happens to send
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match &self.value {
            Value::String(text) => Some(text.clone()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Coerce to a plain boolean; anything but `true`/`"true"` is false
    #[must_use]
    pub fn as_flag(&self) -> bool {
        match &self.value {
            Value::Bool(flag) => *flag,
            Value::String(text) => text == "true",
            _ => false,
        }
    }

    /// Coerce to a tri-state; `None` when the value is not boolean-like
    #[must_use]
    pub fn as_tristate(&self) -> Option<bool> {
        match &self.value {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => Some(text == "true"),
            _ => None,
        }
    }
}

/// A named property attached to a raw accessibility node
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AxProperty {
    /// Property name (`checked`, `expanded`, `disabled`, `focused`, `live`, ...)
    pub name: String,

    /// Property value envelope
    pub value: Option<AxValue>,
}

/// A clip rectangle in CSS pixels
///
/// Also the shape returned by the canvas-region discovery script.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Clip {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Rectangle width
    pub width: f64,
    /// Rectangle height
    pub height: f64,
}

/// Options for a JPEG screenshot capture
#[derive(Debug, Clone)]
pub struct ScreenshotOptions {
    /// JPEG quality, 0-100
    pub quality: u8,

    /// Capture the whole scrollable page instead of the viewport
    pub full_page: bool,

    /// Restrict the capture to a rectangle
    pub clip: Option<Clip>,
}

impl ScreenshotOptions {
    /// Viewport-only capture
    #[must_use]
    pub const fn viewport(quality: u8) -> Self {
        Self {
            quality,
            full_page: false,
            clip: None,
        }
    }

    /// Whole-page capture
    #[must_use]
    pub const fn whole_page(quality: u8) -> Self {
        Self {
            quality,
            full_page: true,
            clip: None,
        }
    }

    /// Capture clipped to a rectangle
    #[must_use]
    pub const fn clipped(clip: Clip, quality: u8) -> Self {
        Self {
            quality,
            full_page: false,
            clip: Some(clip),
        }
    }
}
