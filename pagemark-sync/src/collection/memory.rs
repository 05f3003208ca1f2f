//! In-process outline collection.
//!
//! Behaves like the HTTP API: ids and timestamps are assigned on create,
//! deleting a missing entry succeeds, updating one fails with `NotFound`.

use super::remote::OutlineCollection;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use chrono::Utc;
use pagemark_outline::{NewOutline, OutlineEntry, OutlinePatch};
use pagemark_types::{OutlineId, PublicationId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Outline collection held in memory.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    outlines: RwLock<HashMap<PublicationId, Vec<OutlineEntry>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts entries verbatim, keeping their ids.
    pub async fn seed(&self, publication: &PublicationId, entries: Vec<OutlineEntry>) {
        self.outlines
            .write()
            .await
            .entry(publication.clone())
            .or_default()
            .extend(entries);
    }

    /// Current entries of a publication in insertion order.
    pub async fn snapshot(&self, publication: &PublicationId) -> Vec<OutlineEntry> {
        self.outlines
            .read()
            .await
            .get(publication)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl OutlineCollection for MemoryCollection {
    fn provider_name(&self) -> &'static str {
        "Memory"
    }

    async fn list_outlines(&self, publication: &PublicationId) -> SyncResult<Vec<OutlineEntry>> {
        Ok(self.snapshot(publication).await)
    }

    async fn get_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
    ) -> SyncResult<OutlineEntry> {
        self.outlines
            .read()
            .await
            .get(publication)
            .and_then(|entries| entries.iter().find(|e| &e.id == id))
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("outline {id}")))
    }

    async fn create_outline(
        &self,
        publication: &PublicationId,
        outline: &NewOutline,
    ) -> SyncResult<OutlineEntry> {
        let now = Utc::now();
        let entry = OutlineEntry {
            id: OutlineId::generate(),
            title: outline.title.clone(),
            page: outline.page,
            parent_id: outline.parent_id.clone(),
            language: outline.language.clone(),
            created_at: now,
            updated_at: now,
        };

        self.outlines
            .write()
            .await
            .entry(publication.clone())
            .or_default()
            .push(entry.clone());

        debug!("Created in-memory outline {}", entry.id);
        Ok(entry)
    }

    async fn update_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
        patch: &OutlinePatch,
    ) -> SyncResult<OutlineEntry> {
        let mut outlines = self.outlines.write().await;
        let entry = outlines
            .get_mut(publication)
            .and_then(|entries| entries.iter_mut().find(|e| &e.id == id))
            .ok_or_else(|| SyncError::NotFound(format!("outline {id}")))?;

        entry.apply_patch(patch);
        Ok(entry.clone())
    }

    async fn delete_outline(&self, publication: &PublicationId, id: &OutlineId) -> SyncResult<()> {
        if let Some(entries) = self.outlines.write().await.get_mut(publication) {
            entries.retain(|e| &e.id != id);
        }
        Ok(())
    }
}
