//! Accessibility-tree extractor
//!
//! Consumes the raw debug-protocol accessibility tree and normalizes it:
//! engine-internal role names are mapped to canonical roles, ignored
//! intermediate nodes are pruned with their non-ignored descendants
//! re-parented onto the nearest kept ancestor, and nameless structural
//! wrappers without kept children are dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::{Extractor, ExtractResult, fallback_document, page_title};
use crate::page::{AxNode, AxValue, Page};
use crate::refs::RefManager;
use crate::state::{PageState, RepresentationType, StateNode};

/// Engine-internal role names mapped to canonical roles
///
/// These vary across browsers and versions; keep the table explicit.
const ROLE_NORMALIZATION: &[(&str, &str)] = &[
    ("RootWebArea", "document"),
    ("StaticText", "text"),
    ("LineBreak", "text"),
    ("InlineTextBox", "text"),
    ("GenericContainer", "generic"),
    ("LayoutTable", "table"),
    ("LayoutTableRow", "row"),
    ("LayoutTableCell", "cell"),
];

/// Roles with no semantic meaning of their own; dropped when nameless and
/// childless
const STRUCTURAL_ROLES: &[&str] = &["generic", "none", "presentation", "text", "document"];

fn normalize_role(raw: &str) -> &str {
    ROLE_NORMALIZATION
        .iter()
        .find(|(internal, _)| *internal == raw)
        .map_or(raw, |(_, canonical)| canonical)
}

/// Extracts the full accessibility tree
#[derive(Debug, Default)]
pub struct A11yExtractor;

impl A11yExtractor {
    /// Create a new extractor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for A11yExtractor {
    fn representation_type(&self) -> RepresentationType {
        RepresentationType::A11yTree
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
        let title = page_title(page).await;

        let root = match &nodes {
            Some(nodes) => build_tree(nodes, refs),
            None => fallback_document(refs),
        };

        Ok(PageState::new(url, title, RepresentationType::A11yTree, root))
    }
}

/// Build a normalized tree from the raw flat node list
///
/// Shared with the vision and hybrid extractors, which also need the
/// accessibility skeleton so diffs have something to compare.
pub(crate) fn build_tree(nodes: &[AxNode], refs: &mut RefManager) -> StateNode {
    if nodes.is_empty() {
        return fallback_document(refs);
    }

    let by_id: HashMap<&str, &AxNode> = nodes
        .iter()
        .map(|node| (node.node_id.as_str(), node))
        .collect();

    // Root is the node without a parent; first node as a last resort
    let root = nodes
        .iter()
        .find(|node| node.parent_id.as_deref().is_none_or(str::is_empty))
        .unwrap_or(&nodes[0]);

    convert_node(root, &by_id, refs, "")
}

fn convert_node(
    raw: &AxNode,
    by_id: &HashMap<&str, &AxNode>,
    refs: &mut RefManager,
    parent_role: &str,
) -> StateNode {
    let raw_role = raw
        .role
        .as_ref()
        .and_then(AxValue::as_text)
        .filter(|role| !role.is_empty())
        .unwrap_or_else(|| "generic".to_string());
    let role = normalize_role(&raw_role).to_string();

    let name = raw
        .name
        .as_ref()
        .and_then(AxValue::as_text)
        .unwrap_or_default();
    let value = raw
        .value
        .as_ref()
        .and_then(AxValue::as_text)
        .unwrap_or_default();

    let live = raw
        .property("live")
        .and_then(AxValue::as_text)
        .filter(|politeness| !politeness.is_empty() && politeness != "off" && politeness != "none")
        .unwrap_or_default();

    let fingerprint = crate::refs::Fingerprint::new(role.clone(), name.clone(), parent_role);
    let node_ref = refs.get_or_create(&fingerprint);

    let mut node = StateNode::new(node_ref, role.clone(), name)
        .with_value(value)
        .with_checked(raw.property("checked").and_then(AxValue::as_tristate))
        .with_expanded(raw.property("expanded").and_then(AxValue::as_tristate))
        .with_disabled(raw.property("disabled").is_some_and(AxValue::as_flag))
        .with_focused(raw.property("focused").is_some_and(AxValue::as_flag))
        .with_live(live);

    for child_id in &raw.child_ids {
        let Some(child_raw) = by_id.get(child_id.as_str()) else {
            continue;
        };
        if child_raw.ignored {
            // Re-parent the non-ignored descendants onto this node
            for grandchild in collect_unignored(child_raw, by_id, refs, &role) {
                if is_interesting(&grandchild) {
                    node.children.push(grandchild);
                }
            }
        } else {
            let child = convert_node(child_raw, by_id, refs, &role);
            if is_interesting(&child) {
                node.children.push(child);
            }
        }
    }

    node
}

/// Non-ignored descendants of an ignored node, flattened one level up
fn collect_unignored(
    ignored: &AxNode,
    by_id: &HashMap<&str, &AxNode>,
    refs: &mut RefManager,
    parent_role: &str,
) -> Vec<StateNode> {
    let mut kept = Vec::new();
    for child_id in &ignored.child_ids {
        let Some(child_raw) = by_id.get(child_id.as_str()) else {
            continue;
        };
        if child_raw.ignored {
            kept.extend(collect_unignored(child_raw, by_id, refs, parent_role));
        } else {
            kept.push(convert_node(child_raw, by_id, refs, parent_role));
        }
    }
    kept
}

/// Whether a converted node is worth keeping
fn is_interesting(node: &StateNode) -> bool {
    if !STRUCTURAL_ROLES.contains(&node.role.as_str()) {
        return true;
    }
    !node.name.is_empty() || !node.children.is_empty()
}
