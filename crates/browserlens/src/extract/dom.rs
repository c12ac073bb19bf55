//! Distilled-DOM extractor
//!
//! Walks the page's DOM through a single injected script, keeping only tags
//! with semantic weight and synthesizing a role and accessible name for
//! each. Layout divs, spans, and other non-interactive wrappers are pruned
//! in the page before the payload ever crosses the boundary.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{Extractor, ExtractResult, fallback_document, page_title};
use crate::page::Page;
use crate::refs::{Fingerprint, RefManager};
use crate::state::{PageState, RepresentationType, StateNode};

/// The distillation script
///
/// Keeps interactive elements, headings, landmarks, table/list elements,
/// form-related elements, images, and dialogs. Role synthesis: explicit
/// `role` attribute, else a tag-based map with `input` specialized by
/// `type`. Name synthesis: first non-empty of aria-label, title,
/// placeholder, alt, bounded inner text, value. Depth capped at 20.
const DOM_DISTILL_JS: &str = r#"() => {
    const KEPT_TAGS = new Set([
        'A', 'BUTTON', 'INPUT', 'SELECT', 'TEXTAREA', 'FORM',
        'H1', 'H2', 'H3', 'H4', 'H5', 'H6',
        'NAV', 'MAIN', 'HEADER', 'FOOTER', 'ASIDE', 'SECTION', 'ARTICLE',
        'TABLE', 'TH', 'TD', 'TR', 'UL', 'OL', 'LI',
        'LABEL', 'FIELDSET', 'LEGEND',
        'DIALOG', 'DETAILS', 'SUMMARY',
        'IMG',
    ]);

    function inputRole(el) {
        const t = (el.getAttribute('type') || 'text').toLowerCase();
        const map = {
            checkbox: 'checkbox', radio: 'radio', submit: 'button',
            button: 'button', reset: 'button', range: 'slider',
            search: 'searchbox',
        };
        return map[t] || 'textbox';
    }

    function getRole(el) {
        const role = el.getAttribute('role');
        if (role) return role;
        const tag = el.tagName.toLowerCase();
        const roleMap = {
            a: 'link', button: 'button', input: inputRole(el),
            select: 'combobox', textarea: 'textbox',
            h1: 'heading', h2: 'heading', h3: 'heading',
            h4: 'heading', h5: 'heading', h6: 'heading',
            nav: 'navigation', main: 'main', header: 'banner',
            footer: 'contentinfo', aside: 'complementary',
            section: 'region', article: 'article',
            table: 'table', ul: 'list', ol: 'list', li: 'listitem',
            dialog: 'dialog', details: 'group', img: 'img',
        };
        return roleMap[tag] || tag;
    }

    function getName(el) {
        return (
            el.getAttribute('aria-label') ||
            el.getAttribute('title') ||
            el.getAttribute('placeholder') ||
            el.getAttribute('alt') ||
            el.innerText?.trim().slice(0, 80) ||
            el.value?.trim() ||
            ''
        );
    }

    function serializeNode(el, depth) {
        if (depth > 20) return null;
        const tag = el.tagName;
        if (!tag) return null;

        const keep = KEPT_TAGS.has(tag);
        const children = [];
        for (const child of el.children) {
            const s = serializeNode(child, depth + 1);
            if (s) children.push(s);
        }

        if (!keep && children.length === 0) return null;

        return {
            role: getRole(el),
            name: getName(el),
            value: el.value || '',
            checked: el.checked !== undefined ? el.checked : null,
            expanded: el.getAttribute('aria-expanded'),
            disabled: el.disabled || el.getAttribute('aria-disabled') === 'true',
            children,
        };
    }

    return serializeNode(document.body, 0);
}"#;

/// One element of the distillation payload, coerced defensively
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDomNode {
    role: String,
    name: String,
    value: String,
    checked: Value,
    expanded: Value,
    disabled: bool,
    children: Vec<RawDomNode>,
}

/// `true`/`"true"` and friends to a tri-state
fn tristate(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => Some(text.eq_ignore_ascii_case("true")),
        _ => None,
    }
}

/// Extracts a distilled DOM tree
#[derive(Debug, Default)]
pub struct DomExtractor;

impl DomExtractor {
    /// Create a new extractor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for DomExtractor {
    fn representation_type(&self) -> RepresentationType {
        RepresentationType::DistilledDom
    }

    async fn extract(&self, page: &dyn Page, refs: &mut RefManager) -> ExtractResult<PageState> {
        let url = page.url();
        let payload = page.evaluate(DOM_DISTILL_JS).await?;
        let title = page_title(page).await;

        let root = match serde_json::from_value::<RawDomNode>(payload) {
            Ok(raw) => convert_node(&raw, refs, ""),
            Err(error) => {
                warn!(%error, "malformed DOM distillation payload, emitting document stub");
                fallback_document(refs)
            }
        };

        Ok(PageState::new(url, title, RepresentationType::DistilledDom, root))
    }
}

fn convert_node(raw: &RawDomNode, refs: &mut RefManager, parent_role: &str) -> StateNode {
    let role = if raw.role.is_empty() {
        "generic".to_string()
    } else {
        raw.role.clone()
    };

    let fingerprint = Fingerprint::new(role.clone(), raw.name.clone(), parent_role);
    let node_ref = refs.get_or_create(&fingerprint);

    let mut node = StateNode::new(node_ref, role.clone(), raw.name.clone())
        .with_value(raw.value.clone())
        .with_checked(tristate(&raw.checked))
        .with_expanded(tristate(&raw.expanded))
        .with_disabled(raw.disabled);

    for child_raw in &raw.children {
        node.children.push(convert_node(child_raw, refs, &role));
    }

    node
}
