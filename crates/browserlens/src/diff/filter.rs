//! Semantic noise filter
//!
//! Strips low-signal churn from a delta before it reaches the agent:
//! timer/clock updates, ad content, and noisy live-region chatter. Alerts,
//! dialogs, interactive-state changes, and real input edits always pass.

use std::sync::LazyLock;

use regex::Regex;

use crate::state::{Delta, NodeChange, Prop, PropValue, StateNode};

/// Patterns that indicate timer, clock, or live-counter content
static TIMER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // HH:MM or HH:MM:SS
        r"^\d{1,2}:\d{2}(:\d{2})?$",
        // "N seconds ago" and friends
        r"(?i)^\d+\s*(second|minute|hour|sec|min)s?\s*ago$",
        r"(?i)^(just now|moments ago)$",
        // Pure percentage, e.g. progress bars
        r"^\d{1,3}%$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("timer pattern compiles"))
    .collect()
});

/// Names that typically indicate decorative or ad content
static AD_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)advertisement|sponsored|promoted|ad choice|ad by").expect("ad pattern compiles")
});

/// Live-region roles that change frequently but carry little agent-relevant
/// information
const NOISY_LIVE_ROLES: &[&str] = &["status", "timer", "marquee", "log"];

/// Roles whose name is plain text rather than a control label
const TEXT_LIKE_ROLES: &[&str] = &["text", "StaticText", "generic"];

/// Removes low-signal changes from a delta
#[derive(Debug, Default)]
pub struct SemanticFilter;

impl SemanticFilter {
    /// Create a new filter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Strip noisy entries; applying the filter twice equals applying it
    /// once
    #[must_use]
    pub fn filter(&self, mut delta: Delta) -> Delta {
        delta.added.retain(|node| !is_noisy_node(node));
        delta.removed.retain(|node| !is_noisy_node(node));
        delta.changed.retain(|change| !is_noisy_change(change));
        delta
    }
}

fn is_noisy_node(node: &StateNode) -> bool {
    if AD_HINTS.is_match(&node.name) {
        return true;
    }
    if TEXT_LIKE_ROLES.contains(&node.role.as_str()) && is_timer_text(&node.name) {
        return true;
    }
    !node.live.is_empty() && NOISY_LIVE_ROLES.contains(&node.role.as_str())
}

fn is_noisy_change(change: &NodeChange) -> bool {
    if AD_HINTS.is_match(&change.name) {
        return true;
    }
    // Only the value changed, and to something timer-like
    if change.changed_props.len() == 1
        && let Some((_, PropValue::Text(new_value))) = change.changed_props.get(&Prop::Value)
    {
        return is_timer_text(new_value);
    }
    false
}

fn is_timer_text(text: &str) -> bool {
    let text = text.trim();
    TIMER_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}
