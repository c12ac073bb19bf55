//! Page-state extractors
//!
//! Four ways of turning live browser state into one normalized [`StateNode`]
//! tree, so the downstream differ works uniformly regardless of which
//! representation the router picked. All extractors stamp refs through the
//! observer's shared [`RefManager`], which keeps `@eN` labels stable when
//! the router switches representations mid-session.
//!
//! Every extractor finishes its page I/O before building the tree; a call
//! cancelled at an await point has therefore mutated nothing.

mod a11y;
mod dom;
mod error;
mod hybrid;
mod vision;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use tracing::warn;

pub use a11y::A11yExtractor;
pub use dom::DomExtractor;
pub use error::{ExtractError, ExtractResult};
pub use hybrid::HybridExtractor;
pub use vision::VisionExtractor;

use crate::page::Page;
use crate::refs::RefManager;
use crate::state::{PageState, RepresentationType, StateNode};

/// Contract shared by all extractors
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The representation this extractor produces
    fn representation_type(&self) -> RepresentationType;

    /// Produce a page state from live browser state
    async fn extract(&self, page: &dyn Page, refs: &mut RefManager) -> ExtractResult<PageState>;
}

/// Fetch the page title, degrading to an empty string on failure
pub(crate) async fn page_title(page: &dyn Page) -> String {
    match page.title().await {
        Ok(title) => title,
        Err(error) => {
            warn!(%error, "title unavailable");
            String::new()
        }
    }
}

/// The one-node tree emitted when no accessibility data is available
pub(crate) fn fallback_document(refs: &mut RefManager) -> StateNode {
    let fingerprint = crate::refs::Fingerprint::new("document", "", "");
    StateNode::new(refs.get_or_create(&fingerprint), "document", "")
}
