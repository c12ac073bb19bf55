//! Hybrid extractor: accessibility tree plus targeted screenshots
//!
//! Gives the agent the structured text it can act on (click, type) plus
//! visual context for regions accessibility cannot describe.

use async_trait::async_trait;
use base64::engine::{Engine as _, general_purpose::STANDARD};
use tracing::warn;

use super::{Extractor, ExtractResult, a11y, fallback_document, page_title};
use crate::page::{Clip, Page, ScreenshotOptions};
use crate::refs::RefManager;
use crate::state::{PageState, RepresentationType};

const CLIPPED_QUALITY: u8 = 80;
const VIEWPORT_QUALITY: u8 = 75;

/// Bounding boxes of canvas and declared visual regions
const VISUAL_REGION_JS: &str = r"() => {
    const canvases = document.querySelectorAll('canvas, [data-canvas], [data-visual]');
    const boxes = [];
    for (const c of canvases) {
        const r = c.getBoundingClientRect();
        if (r.width > 0 && r.height > 0) {
            boxes.push({ x: r.left, y: r.top, width: r.width, height: r.height });
        }
    }
    return boxes;
}";

/// Extracts the full accessibility tree plus a cropped screenshot of
/// canvas/WebGL regions
#[derive(Debug, Default)]
pub struct HybridExtractor;

impl HybridExtractor {
    /// Create a new extractor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for HybridExtractor {
    fn representation_type(&self) -> RepresentationType {
        RepresentationType::Hybrid
    }

    async fn extract(&self, page: &dyn Page, refs: &mut RefManager) -> ExtractResult<PageState> {
        let url = page.url();

        let nodes = match page.accessibility_tree().await {
            Ok(nodes) => Some(nodes),
            Err(error) => {
                warn!(%error, "accessibility tree unavailable, emitting document stub");
                None
            }
        };
        let screenshot_b64 = capture_visual_regions(page).await;
        let title = page_title(page).await;

        let root = match &nodes {
            Some(nodes) => a11y::build_tree(nodes, refs),
            None => fallback_document(refs),
        };

        let mut state = PageState::new(url, title, RepresentationType::Hybrid, root);
        state.screenshot_b64 = screenshot_b64;
        Ok(state)
    }
}

/// Screenshot the canvas regions
///
/// A single region is captured with a clip; several regions (or a failed
/// clip) degrade to a viewport capture; no regions means no screenshot.
async fn capture_visual_regions(page: &dyn Page) -> Option<String> {
    let boxes: Vec<Clip> = match page.evaluate(VISUAL_REGION_JS).await {
        Ok(payload) => serde_json::from_value(payload).unwrap_or_else(|error| {
            warn!(%error, "malformed visual region payload");
            Vec::new()
        }),
        Err(error) => {
            warn!(%error, "visual region discovery failed");
            Vec::new()
        }
    };

    if boxes.is_empty() {
        return None;
    }

    if boxes.len() == 1 {
        let clip = Clip {
            x: boxes[0].x.max(0.0),
            y: boxes[0].y.max(0.0),
            width: boxes[0].width,
            height: boxes[0].height,
        };
        match page.screenshot(ScreenshotOptions::clipped(clip, CLIPPED_QUALITY)).await {
            Ok(bytes) => return Some(STANDARD.encode(&bytes)),
            Err(error) => {
                warn!(%error, "clipped capture failed, falling back to viewport");
            }
        }
    }

    match page.screenshot(ScreenshotOptions::viewport(VIEWPORT_QUALITY)).await {
        Ok(bytes) => Some(STANDARD.encode(&bytes)),
        Err(error) => {
            warn!(%error, "viewport capture failed, proceeding without visual");
            None
        }
    }
}
