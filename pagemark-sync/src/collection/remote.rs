//! Remote outline collection abstraction.
//!
//! The collection only offers point operations. There is no batch or
//! "replace subtree" call, which is why the sync engine replays trees one
//! entry at a time.

use crate::error::SyncResult;
use async_trait::async_trait;
use pagemark_outline::{NewOutline, OutlineEntry, OutlinePatch};
use pagemark_types::{OutlineId, PublicationId};

/// Abstract remote outline store.
#[async_trait]
pub trait OutlineCollection: Send + Sync {
    /// Returns the name of the backing store.
    fn provider_name(&self) -> &'static str;

    /// Lists every outline entry of a publication, all languages mixed.
    async fn list_outlines(&self, publication: &PublicationId) -> SyncResult<Vec<OutlineEntry>>;

    /// Fetches one entry.
    async fn get_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
    ) -> SyncResult<OutlineEntry>;

    /// Creates one entry. The store assigns `id`, `createdAt` and `updatedAt`.
    async fn create_outline(
        &self,
        publication: &PublicationId,
        outline: &NewOutline,
    ) -> SyncResult<OutlineEntry>;

    /// Applies a partial update to one entry.
    async fn update_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
        patch: &OutlinePatch,
    ) -> SyncResult<OutlineEntry>;

    /// Deletes one entry. Deleting an entry that is already gone succeeds.
    async fn delete_outline(&self, publication: &PublicationId, id: &OutlineId) -> SyncResult<()>;
}
