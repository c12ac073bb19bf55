//! Tree diff between two normalized trees
//!
//! Matching strategy, in priority order: exact ref match (reliable when
//! refs persist), then `(role, name, parent_role)` fingerprint match
//! against not-yet-matched old nodes. Structural reshuffling that does not
//! change a node's fingerprint is intentionally invisible.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::refs::NodeRef;
use crate::state::{Delta, NodeChange, Prop, PropValue, RepresentationType, StateNode};

/// Diff two trees into added/removed/changed lists
pub fn diff_trees(
    old_root: &StateNode,
    new_root: &StateNode,
    step: u64,
    representation_type: RepresentationType,
) -> Delta {
    let old_index = index_nodes(old_root);
    let new_index = index_nodes(new_root);

    let old_by_ref: HashMap<NodeRef, usize> = old_index
        .iter()
        .enumerate()
        .map(|(position, entry)| (entry.node.node_ref, position))
        .collect();

    let mut added: Vec<StateNode> = Vec::new();
    let mut changed: Vec<NodeChange> = Vec::new();
    let mut matched_old: HashSet<NodeRef> = HashSet::new();

    for entry in &new_index {
        let old_node = if let Some(&position) = old_by_ref.get(&entry.node.node_ref) {
            Some(old_index[position].node)
        } else {
            find_by_fingerprint(&old_index, &matched_old, entry).map(|matched| matched.node)
        };

        match old_node {
            Some(old_node) => {
                matched_old.insert(old_node.node_ref);
                let changed_props = compare_props(old_node, entry.node);
                if !changed_props.is_empty() {
                    changed.push(NodeChange {
                        node_ref: entry.node.node_ref,
                        role: entry.node.role.clone(),
                        name: entry.node.name.clone(),
                        changed_props,
                    });
                }
            }
            None => added.push(entry.node.clone()),
        }
    }

    let removed: Vec<StateNode> = old_index
        .iter()
        .filter(|entry| !matched_old.contains(&entry.node.node_ref))
        .map(|entry| entry.node.clone())
        .collect();

    let unchanged_count = new_index.len().saturating_sub(added.len() + changed.len());

    Delta {
        step,
        representation_type,
        added,
        removed,
        changed,
        unchanged_count,
        unchanged_summary: String::new(),
        is_full_state: false,
    }
}

struct IndexEntry<'tree> {
    node: &'tree StateNode,
    parent_role: &'tree str,
}

/// Depth-first flat index of a tree; on duplicate refs the first
/// occurrence wins
fn index_nodes(root: &StateNode) -> Vec<IndexEntry<'_>> {
    let mut index = Vec::new();
    let mut seen = HashSet::new();
    walk(root, "", &mut index, &mut seen);
    index
}

fn walk<'tree>(
    node: &'tree StateNode,
    parent_role: &'tree str,
    index: &mut Vec<IndexEntry<'tree>>,
    seen: &mut HashSet<NodeRef>,
) {
    if seen.insert(node.node_ref) {
        index.push(IndexEntry { node, parent_role });
    }
    for child in &node.children {
        walk(child, &node.role, index, seen);
    }
}

/// First unmatched old node with the same fingerprint as `target`
fn find_by_fingerprint<'index, 'tree>(
    old_index: &'index [IndexEntry<'tree>],
    matched_old: &HashSet<NodeRef>,
    target: &IndexEntry<'_>,
) -> Option<&'index IndexEntry<'tree>> {
    old_index.iter().find(|entry| {
        !matched_old.contains(&entry.node.node_ref)
            && entry.node.role == target.node.role
            && entry.node.name == target.node.name
            && entry.parent_role == target.parent_role
    })
}

/// Semantic attributes that differ between two matched nodes
fn compare_props(old: &StateNode, new: &StateNode) -> BTreeMap<Prop, (PropValue, PropValue)> {
    let mut changed_props = BTreeMap::new();

    if old.value != new.value {
        changed_props.insert(
            Prop::Value,
            (
                PropValue::Text(old.value.clone()),
                PropValue::Text(new.value.clone()),
            ),
        );
    }
    if old.checked != new.checked {
        changed_props.insert(
            Prop::Checked,
            (PropValue::Toggle(old.checked), PropValue::Toggle(new.checked)),
        );
    }
    if old.expanded != new.expanded {
        changed_props.insert(
            Prop::Expanded,
            (
                PropValue::Toggle(old.expanded),
                PropValue::Toggle(new.expanded),
            ),
        );
    }
    if old.disabled != new.disabled {
        changed_props.insert(
            Prop::Disabled,
            (PropValue::Flag(old.disabled), PropValue::Flag(new.disabled)),
        );
    }
    if old.focused != new.focused {
        changed_props.insert(
            Prop::Focused,
            (PropValue::Flag(old.focused), PropValue::Flag(new.focused)),
        );
    }
    if old.live != new.live {
        changed_props.insert(
            Prop::Live,
            (
                PropValue::Text(old.live.clone()),
                PropValue::Text(new.live.clone()),
            ),
        );
    }

    changed_props
}
