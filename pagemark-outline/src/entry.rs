//! Outline entity model.
//!
//! An [`OutlineEntry`] is the flat, storage-shaped record: a title bound to a
//! page, with an optional back-reference to its parent. An [`OutlineNode`] is
//! the same entry materialized as a tree node with ordered children.
//!
//! Field names serialize in camelCase to match the publication API.

use chrono::{DateTime, Utc};
use pagemark_types::{Language, OutlineId};
use serde::{Deserialize, Serialize};

/// One table-of-contents entry in flat (storage) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub id: OutlineId,
    pub title: String,
    /// 1-indexed page number.
    pub page: u32,
    /// Back-reference only; a parent never owns its children.
    #[serde(default)]
    pub parent_id: Option<OutlineId>,
    #[serde(default)]
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutlineEntry {
    /// Mints a local entry with a fresh id, stamped now.
    pub fn draft(
        title: impl Into<String>,
        page: u32,
        parent_id: Option<OutlineId>,
        language: Language,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OutlineId::generate(),
            title: title.into(),
            page,
            parent_id,
            language,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds the create-one payload for this entry under `parent_id`.
    ///
    /// The parent is passed explicitly because replayed entries must point
    /// at the server id of their already-created parent, not at their own
    /// (local) `parent_id`.
    #[must_use]
    pub fn to_new(&self, parent_id: Option<OutlineId>) -> NewOutline {
        NewOutline {
            title: self.title.clone(),
            page: self.page,
            parent_id,
            language: self.language.clone(),
        }
    }

    /// Applies a partial update and bumps `updated_at`.
    pub fn apply_patch(&mut self, patch: &OutlinePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(parent_id) = &patch.parent_id {
            self.parent_id = parent_id.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// An outline entry materialized as a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    #[serde(flatten)]
    pub entry: OutlineEntry,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Wraps an entry as a leaf.
    #[must_use]
    pub fn leaf(entry: OutlineEntry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &OutlineId {
        &self.entry.id
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::size).sum::<usize>()
    }

    /// Finds a node by id in this subtree.
    #[must_use]
    pub fn find(&self, id: &OutlineId) -> Option<&OutlineNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Create-one payload sent to the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOutline {
    pub title: String,
    pub page: u32,
    /// Serialized as explicit `null` for roots.
    pub parent_id: Option<OutlineId>,
    pub language: Language,
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// `Some(None)` clears the parent; `None` leaves it alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<OutlineId>>,
}

impl OutlinePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.page.is_none() && self.parent_id.is_none()
    }
}
