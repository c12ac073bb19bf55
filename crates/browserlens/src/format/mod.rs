//! LLM-ready output rendering
//!
//! Renders a full page state or a delta as compact indented text and
//! enforces the token budget on the result.

mod budget;


use std::fmt::Write as _;

use tracing::debug;

pub use budget::TokenBudget;

use crate::state::{Delta, NodeChange, PageState, StateNode};

const INDENT: &str = "  ";

/// Marker appended when the state carries a screenshot
const VISUAL_MARKER: &str = "[VISUAL: screenshot attached]";

/// Renders page states and deltas for the agent
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    budget: TokenBudget,
    max_tokens: usize,
}

impl OutputFormatter {
    /// Create a formatter with the given token budget
    #[must_use]
    pub const fn new(max_tokens: usize) -> Self {
        Self {
            budget: TokenBudget::new(),
            max_tokens,
        }
    }

    /// Render the complete tree, budgeted; returns `(text, token_count)`
    #[must_use]
    pub fn format_full_state(&self, state: &PageState) -> (String, usize) {
        self.budgeted(render_full(state))
    }

    /// Render a delta, budgeted; returns `(text, token_count)`
    #[must_use]
    pub fn format_delta(&self, delta: &Delta, state: &PageState) -> (String, usize) {
        self.budgeted(render_delta(delta, state))
    }

    fn budgeted(&self, text: String) -> (String, usize) {
        let (text, truncated) = self.budget.truncate(&text, self.max_tokens);
        if truncated {
            debug!(max_tokens = self.max_tokens, "output truncated to fit token budget");
        }
        let token_count = self.budget.count(&text);
        (text, token_count)
    }
}

fn render_full(state: &PageState) -> String {
    let mut lines = vec![
        format!("[FULL PAGE STATE — step {}]", state.step),
        format!("URL: {}", state.url),
        format!("Title: {}", state.title),
        format!("Representation: {}", state.representation_type),
        String::new(),
    ];
    render_node(&mut lines, &state.root, 0);

    if state.screenshot_b64.is_some() {
        lines.push(String::new());
        lines.push(VISUAL_MARKER.to_string());
    }

    lines.join("\n")
}

fn render_delta(delta: &Delta, state: &PageState) -> String {
    let total = delta.total_changes();
    let plural = if total == 1 { "" } else { "s" };
    let mut lines = vec![
        format!("[DELTA — step {} — {total} change{plural}]", delta.step),
        format!("URL: {}", state.url),
        String::new(),
    ];

    if !delta.added.is_empty() {
        lines.push("ADDED:".to_string());
        for node in &delta.added {
            let mut subtree = Vec::new();
            render_node(&mut subtree, node, 0);
            lines.extend(subtree.into_iter().map(|line| format!("  {line}")));
        }
    }

    if !delta.removed.is_empty() {
        lines.push("REMOVED:".to_string());
        for node in &delta.removed {
            let name = quoted_name(&node.name);
            lines.push(format!("  - {}{} [{}]", node.role, name, node.node_ref));
        }
    }

    if !delta.changed.is_empty() {
        lines.push("CHANGED:".to_string());
        for change in &delta.changed {
            lines.push(render_change(change));
        }
    }

    if !delta.unchanged_summary.is_empty() {
        lines.push(format!("UNCHANGED: {}", delta.unchanged_summary));
    }

    if state.screenshot_b64.is_some() {
        lines.push(String::new());
        lines.push(VISUAL_MARKER.to_string());
    }

    lines.join("\n")
}

/// One `- <role> "<name>" [<ref>] (<props>)` line per node, depth-first
fn render_node(lines: &mut Vec<String>, node: &StateNode, depth: usize) {
    let indent = INDENT.repeat(depth);

    let mut label = node.role.clone();
    if !node.name.is_empty() {
        let _ = write!(label, " \"{}\"", node.name);
    }

    let mut props: Vec<String> = Vec::new();
    if !node.value.is_empty() {
        props.push(format!("value: {:?}", node.value));
    }
    if let Some(checked) = node.checked {
        props.push(format!("checked: {checked}"));
    }
    if let Some(expanded) = node.expanded {
        props.push(format!("expanded: {expanded}"));
    }
    if node.disabled {
        props.push("disabled".to_string());
    }
    if node.focused {
        props.push("focused".to_string());
    }
    let props_text = if props.is_empty() {
        String::new()
    } else {
        format!(" ({})", props.join(", "))
    };

    lines.push(format!("{indent}- {label} [{}]{props_text}", node.node_ref));

    for child in &node.children {
        render_node(lines, child, depth + 1);
    }
}

fn render_change(change: &NodeChange) -> String {
    let name = quoted_name(&change.name);
    let props = change
        .changed_props
        .iter()
        .map(|(prop, (old, new))| format!("{prop}: {old} → {new}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("  - {}{} [{}] — {}", change.role, name, change.node_ref, props)
}

fn quoted_name(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!(" \"{name}\"")
    }
}
