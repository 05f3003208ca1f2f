//! In-memory editing buffer for one language's outline.
//!
//! The buffer is opened from the current tree, edited, then either saved
//! (committing the working copy) or cancelled (restoring the snapshot).
//! Every edit is checked against the document's page count; a rejected edit
//! leaves the buffer untouched.

use crate::entry::{OutlineEntry, OutlineNode};
use crate::error::{OutlineError, OutlineResult};
use crate::tree::flatten;
use crate::validate::{check_page, check_title};
use chrono::Utc;
use pagemark_types::{Language, OutlineId};
use tracing::debug;

/// Direction for [`OutlineEditor::move_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Editing buffer bound to a language and a page count.
#[derive(Debug, Clone)]
pub struct OutlineEditor {
    language: Language,
    max_pages: u32,
    snapshot: Vec<OutlineNode>,
    working: Vec<OutlineNode>,
}

impl OutlineEditor {
    /// Opens a buffer over `outline`, snapshotting it for [`cancel`](Self::cancel).
    pub fn open(language: Language, max_pages: u32, outline: Vec<OutlineNode>) -> Self {
        Self {
            language,
            max_pages,
            snapshot: outline.clone(),
            working: outline,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// The working tree.
    pub fn items(&self) -> &[OutlineNode] {
        &self.working
    }

    /// Total number of entries, at any depth.
    pub fn len(&self) -> usize {
        self.working.iter().map(OutlineNode::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Returns true if the working tree differs from the snapshot.
    pub fn is_dirty(&self) -> bool {
        self.working != self.snapshot
    }

    /// Adds a new entry at the end of the roots, or of `parent`'s children.
    pub fn add_item(
        &mut self,
        title: &str,
        page: u32,
        parent: Option<&OutlineId>,
    ) -> OutlineResult<OutlineId> {
        let title = check_title(title)?;
        check_page(page, self.max_pages)?;

        let entry = OutlineEntry::draft(title, page, parent.cloned(), self.language.clone());
        let id = entry.id.clone();
        let node = OutlineNode::leaf(entry);

        match parent {
            None => self.working.push(node),
            Some(parent_id) => find_mut(&mut self.working, parent_id)
                .ok_or_else(|| OutlineError::NotFound(parent_id.clone()))?
                .children
                .push(node),
        }

        debug!("Added outline item {} on page {}", id, page);
        Ok(id)
    }

    /// Replaces an entry's title and page.
    pub fn edit_item(&mut self, id: &OutlineId, title: &str, page: u32) -> OutlineResult<()> {
        let title = check_title(title)?;
        check_page(page, self.max_pages)?;

        let node =
            find_mut(&mut self.working, id).ok_or_else(|| OutlineError::NotFound(id.clone()))?;
        node.entry.title = title;
        node.entry.page = page;
        node.entry.updated_at = Utc::now();
        Ok(())
    }

    /// Removes an entry together with its subtree.
    pub fn remove_item(&mut self, id: &OutlineId) -> OutlineResult<OutlineNode> {
        let (siblings, pos) =
            locate(&mut self.working, id).ok_or_else(|| OutlineError::NotFound(id.clone()))?;
        Ok(siblings.remove(pos))
    }

    /// Swaps an entry with its neighbouring sibling.
    ///
    /// Returns `false` when the entry is already first (`Up`) or last (`Down`).
    pub fn move_item(&mut self, id: &OutlineId, direction: MoveDirection) -> OutlineResult<bool> {
        let (siblings, pos) =
            locate(&mut self.working, id).ok_or_else(|| OutlineError::NotFound(id.clone()))?;
        let target = match direction {
            MoveDirection::Up if pos > 0 => pos - 1,
            MoveDirection::Down if pos + 1 < siblings.len() => pos + 1,
            _ => return Ok(false),
        };
        siblings.swap(pos, target);
        Ok(true)
    }

    /// Moves an entry (with its subtree) under `parent`, or to the roots.
    pub fn set_parent(&mut self, id: &OutlineId, parent: Option<&OutlineId>) -> OutlineResult<()> {
        let node = find(&self.working, id).ok_or_else(|| OutlineError::NotFound(id.clone()))?;
        if let Some(parent_id) = parent {
            if node.find(parent_id).is_some() {
                return Err(OutlineError::Cycle(id.clone()));
            }
            if find(&self.working, parent_id).is_none() {
                return Err(OutlineError::NotFound(parent_id.clone()));
            }
        }

        let mut node = self.remove_item(id)?;
        node.entry.parent_id = parent.cloned();
        node.entry.updated_at = Utc::now();

        match parent {
            None => self.working.push(node),
            Some(parent_id) => match find_mut(&mut self.working, parent_id) {
                Some(target) => target.children.push(node),
                None => return Err(OutlineError::NotFound(parent_id.clone())),
            },
        }
        Ok(())
    }

    /// Discards all edits since the last save (or open).
    pub fn cancel(&mut self) {
        self.working = self.snapshot.clone();
    }

    /// Commits the working tree and returns it with its pre-order flat form.
    pub fn save(&mut self) -> (Vec<OutlineNode>, Vec<OutlineEntry>) {
        self.snapshot = self.working.clone();
        let flat = flatten(&self.working);
        (self.working.clone(), flat)
    }
}

fn find<'a>(nodes: &'a [OutlineNode], id: &OutlineId) -> Option<&'a OutlineNode> {
    nodes.iter().find_map(|n| n.find(id))
}

fn find_mut<'a>(nodes: &'a mut [OutlineNode], id: &OutlineId) -> Option<&'a mut OutlineNode> {
    for node in nodes.iter_mut() {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Finds the sibling list holding `id` and its position in it.
fn locate<'a>(
    nodes: &'a mut Vec<OutlineNode>,
    id: &OutlineId,
) -> Option<(&'a mut Vec<OutlineNode>, usize)> {
    if let Some(pos) = nodes.iter().position(|n| n.id() == id) {
        return Some((nodes, pos));
    }
    for node in nodes.iter_mut() {
        if let Some(found) = locate(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}
