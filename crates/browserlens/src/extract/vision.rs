//! Screenshot (vision) extractor
//!
//! For canvas-heavy or poorly-labelled pages where text representations
//! lose too much information. The accessibility skeleton is still built so
//! the differ has something to compare.

use async_trait::async_trait;
use base64::engine::{Engine as _, general_purpose::STANDARD};
use tracing::warn;

use super::{Extractor, ExtractResult, a11y, fallback_document, page_title};
use crate::page::{Page, ScreenshotOptions};
use crate::refs::RefManager;
use crate::state::{PageState, RepresentationType};

const SCREENSHOT_QUALITY: u8 = 75;

/// Extracts a screenshot plus the accessibility skeleton
#[derive(Debug, Default)]
pub struct VisionExtractor {
    full_page: bool,
}

impl VisionExtractor {
    /// Create a viewport-only extractor
    #[must_use]
    pub const fn new() -> Self {
        Self { full_page: false }
    }

    /// Capture the whole scrollable page instead of the viewport
    #[must_use]
    pub fn with_full_page(mut self, full_page: bool) -> Self {
        self.full_page = full_page;
        self
    }
}

#[async_trait]
impl Extractor for VisionExtractor {
    fn representation_type(&self) -> RepresentationType {
        RepresentationType::Vision
    }

    async fn extract(&self, page: &dyn Page, refs: &mut RefManager) -> ExtractResult<PageState> {
        let url = page.url();

        let options = if self.full_page {
            ScreenshotOptions::whole_page(SCREENSHOT_QUALITY)
        } else {
            ScreenshotOptions::viewport(SCREENSHOT_QUALITY)
        };
        let screenshot_b64 = match page.screenshot(options).await {
            Ok(bytes) => Some(STANDARD.encode(&bytes)),
            Err(error) => {
                warn!(%error, "screenshot failed, proceeding without visual");
                None
            }
        };

        let nodes = match page.accessibility_tree().await {
            Ok(nodes) => Some(nodes),
            Err(error) => {
                warn!(%error, "accessibility tree unavailable, emitting document stub");
                None
            }
        };
        let title = page_title(page).await;

        let root = match &nodes {
            Some(nodes) => a11y::build_tree(nodes, refs),
            None => fallback_document(refs),
        };

        let mut state = PageState::new(url, title, RepresentationType::Vision, root);
        state.screenshot_b64 = screenshot_b64;
        Ok(state)
    }
}
