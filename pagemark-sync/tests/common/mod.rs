#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use pagemark_outline::{NewOutline, OutlineEntry, OutlineNode, OutlinePatch};
use pagemark_sync::{MemoryCollection, OutlineCollection, SyncError, SyncResult};
use pagemark_types::{Language, OutlineId, PublicationId};
use std::sync::Mutex;

/// One observed call against the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Get(OutlineId),
    Create {
        payload: NewOutline,
        assigned: OutlineId,
    },
    Update(OutlineId, OutlinePatch),
    Delete(OutlineId),
}

/// In-memory collection that records every call and can fail on demand.
#[derive(Default)]
pub struct RecordingCollection {
    pub inner: MemoryCollection,
    calls: Mutex<Vec<Call>>,
    fail_language: Mutex<Option<Language>>,
    fail_list: Mutex<bool>,
}

impl RecordingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every create for `language` fail with a remote error.
    pub fn fail_creates_for(&self, language: Language) {
        *self.fail_language.lock().unwrap() = Some(language);
    }

    pub fn fail_lists(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<(NewOutline, OutlineId)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { payload, assigned } => Some((payload, assigned)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl OutlineCollection for RecordingCollection {
    fn provider_name(&self) -> &'static str {
        "Recording"
    }

    async fn list_outlines(&self, publication: &PublicationId) -> SyncResult<Vec<OutlineEntry>> {
        self.record(Call::List);
        if *self.fail_list.lock().unwrap() {
            return Err(SyncError::Network("connection refused".into()));
        }
        self.inner.list_outlines(publication).await
    }

    async fn get_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
    ) -> SyncResult<OutlineEntry> {
        self.record(Call::Get(id.clone()));
        self.inner.get_outline(publication, id).await
    }

    async fn create_outline(
        &self,
        publication: &PublicationId,
        outline: &NewOutline,
    ) -> SyncResult<OutlineEntry> {
        let failing = self.fail_language.lock().unwrap().clone();
        if failing.as_ref() == Some(&outline.language) {
            return Err(SyncError::Remote {
                status: 500,
                message: "boom".into(),
            });
        }
        let created = self.inner.create_outline(publication, outline).await?;
        self.record(Call::Create {
            payload: outline.clone(),
            assigned: created.id.clone(),
        });
        Ok(created)
    }

    async fn update_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
        patch: &OutlinePatch,
    ) -> SyncResult<OutlineEntry> {
        self.record(Call::Update(id.clone(), patch.clone()));
        self.inner.update_outline(publication, id, patch).await
    }

    async fn delete_outline(&self, publication: &PublicationId, id: &OutlineId) -> SyncResult<()> {
        self.record(Call::Delete(id.clone()));
        self.inner.delete_outline(publication, id).await
    }
}

pub fn publication() -> PublicationId {
    PublicationId::parse("pub-1").unwrap()
}

/// A stored entry with a fixed id.
pub fn stored(id: &str, title: &str, parent: Option<&str>, language: &Language) -> OutlineEntry {
    let now = Utc::now();
    OutlineEntry {
        id: OutlineId::parse(id).unwrap(),
        title: title.to_string(),
        page: 1,
        parent_id: parent.map(|p| OutlineId::parse(p).unwrap()),
        language: language.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// A local node with children.
pub fn node(title: &str, page: u32, children: Vec<OutlineNode>) -> OutlineNode {
    let mut node = OutlineNode::leaf(OutlineEntry::draft(title, page, None, Language::en()));
    node.children = children;
    node
}
