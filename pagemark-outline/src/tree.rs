//! Tree reconciliation: flat lists with parent references ⇄ nested trees.
//!
//! [`flatten`] emits entries in pre-order so every parent precedes its
//! descendants, which is the order the sync engine replays creates in.
//! [`nest`] never fails: entries whose parent is missing, lives in another
//! language, or sits on a parent cycle become roots.

use crate::entry::{OutlineEntry, OutlineNode, OutlinePatch};
use pagemark_types::{Language, OutlineId};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Builds a forest from a flat list.
///
/// Root order and sibling order follow the input order. Parents resolve only
/// among entries of the same language. Duplicate ids resolve to the first
/// occurrence.
pub fn nest(entries: Vec<OutlineEntry>) -> Vec<OutlineNode> {
    let n = entries.len();

    let mut by_key: HashMap<(&OutlineId, &Language), usize> = HashMap::with_capacity(n);
    for (i, e) in entries.iter().enumerate() {
        by_key.entry((&e.id, &e.language)).or_insert(i);
    }

    let parent_of: Vec<Option<usize>> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let parent = e.parent_id.as_ref()?;
            match by_key.get(&(parent, &e.language)) {
                Some(&p) if p != i => Some(p),
                Some(_) => None,
                None => {
                    debug!(
                        "Outline entry {} has unresolved parent {}, treating as root",
                        e.id, parent
                    );
                    None
                }
            }
        })
        .collect();
    drop(by_key);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, parent) in parent_of.iter().enumerate() {
        if let Some(p) = parent {
            children[*p].push(i);
        }
    }

    // Anything not reachable from a true root hangs off a parent cycle.
    let mut reachable = vec![false; n];
    let mut stack: Vec<usize> = (0..n).filter(|&i| parent_of[i].is_none()).collect();
    while let Some(i) = stack.pop() {
        if !reachable[i] {
            reachable[i] = true;
            stack.extend(children[i].iter().copied());
        }
    }

    let mut slots: Vec<Option<OutlineEntry>> = entries.into_iter().map(Some).collect();
    let mut placed = vec![false; n];
    let mut roots = Vec::new();

    for i in 0..n {
        if placed[i] {
            continue;
        }
        if parent_of[i].is_some() && reachable[i] {
            continue;
        }
        if !reachable[i] {
            warn!(
                "Outline entry {:?} is part of a parent cycle, promoting to root",
                slots[i].as_ref().map(|e| &e.id)
            );
        }
        if let Some(node) = build(i, &children, &mut slots, &mut placed) {
            roots.push(node);
        }
    }

    roots
}

fn build(
    i: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<OutlineEntry>],
    placed: &mut [bool],
) -> Option<OutlineNode> {
    placed[i] = true;
    let entry = slots[i].take()?;
    let mut node = OutlineNode::leaf(entry);
    for &c in &children[i] {
        if placed[c] {
            continue;
        }
        if let Some(child) = build(c, children, slots, placed) {
            node.children.push(child);
        }
    }
    Some(node)
}

/// Flattens a forest in pre-order, dropping `children` and keeping each
/// entry's `parent_id` as is.
#[must_use]
pub fn flatten(tree: &[OutlineNode]) -> Vec<OutlineEntry> {
    let mut out = Vec::with_capacity(tree.iter().map(OutlineNode::size).sum());
    for node in tree {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into(node: &OutlineNode, out: &mut Vec<OutlineEntry>) {
    out.push(node.entry.clone());
    for child in &node.children {
        flatten_into(child, out);
    }
}

/// Rewrites every `parent_id` to match the tree shape (roots get `None`).
///
/// Trees read from hand-written JSON often carry nesting without parent ids.
pub fn relink(tree: &mut [OutlineNode]) {
    for node in tree.iter_mut() {
        node.entry.parent_id = None;
        relink_children(node);
    }
}

fn relink_children(node: &mut OutlineNode) {
    let id = node.entry.id.clone();
    for child in &mut node.children {
        child.entry.parent_id = Some(id.clone());
        relink_children(child);
    }
}

/// Splits a mixed-language list, keeping input order inside each language.
#[must_use]
pub fn group_by_language(entries: Vec<OutlineEntry>) -> BTreeMap<Language, Vec<OutlineEntry>> {
    let mut groups: BTreeMap<Language, Vec<OutlineEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.language.clone()).or_default().push(entry);
    }
    groups
}

/// Entries of one language, in input order.
#[must_use]
pub fn filter_language(entries: &[OutlineEntry], language: &Language) -> Vec<OutlineEntry> {
    entries
        .iter()
        .filter(|e| &e.language == language)
        .cloned()
        .collect()
}

/// How a new flat outline differs from the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineDiff {
    /// Same ids, shape, titles and pages.
    Unchanged,
    /// Same ids, shape and order; only titles and/or pages changed.
    FieldEdits(Vec<(OutlineId, OutlinePatch)>),
    /// Entries added, removed, reordered or re-parented.
    Structural,
}

/// Compares two flat outlines position by position.
#[must_use]
pub fn diff(previous: &[OutlineEntry], next: &[OutlineEntry]) -> OutlineDiff {
    if previous.len() != next.len() {
        return OutlineDiff::Structural;
    }

    let mut edits = Vec::new();
    for (old, new) in previous.iter().zip(next) {
        if old.id != new.id || old.parent_id != new.parent_id || old.language != new.language {
            return OutlineDiff::Structural;
        }

        let patch = OutlinePatch {
            title: (old.title != new.title).then(|| new.title.clone()),
            page: (old.page != new.page).then_some(new.page),
            parent_id: None,
        };
        if !patch.is_empty() {
            edits.push((new.id.clone(), patch));
        }
    }

    if edits.is_empty() {
        OutlineDiff::Unchanged
    } else {
        OutlineDiff::FieldEdits(edits)
    }
}
