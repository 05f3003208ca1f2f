//! Outline sync engine.
//!
//! Replays outline trees against an [`OutlineCollection`] that only offers
//! point operations. A replace deletes the language's current entries one by
//! one, then creates the new tree in pre-order so every child is created with
//! its parent's freshly assigned id. Nothing is rolled back: a failure leaves
//! the remote with whatever prefix was already applied.

use crate::collection::OutlineCollection;
use crate::error::{SyncError, SyncResult};
use pagemark_outline::{
    diff, filter_language, flatten, group_by_language, nest, DraftStore, NewOutline, OutlineDiff,
    OutlineEntry, OutlineNode, relink,
};
use pagemark_types::{Language, OutlineId, PublicationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for each remote call (ms).
    pub timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Result of publishing one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LanguageOutcome {
    /// Entries created for the language, in creation order.
    Published { created: Vec<OutlineEntry> },
    /// The language failed; its drafts, if any, were kept.
    Failed { error: String },
}

/// Per-language results of [`SyncEngine::publish_all`] or [`SyncEngine::promote`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub languages: BTreeMap<Language, LanguageOutcome>,
}

impl PublishReport {
    /// Languages that went through.
    pub fn succeeded(&self) -> Vec<&Language> {
        self.languages
            .iter()
            .filter(|(_, o)| matches!(o, LanguageOutcome::Published { .. }))
            .map(|(l, _)| l)
            .collect()
    }

    /// Languages that failed, with their error message.
    pub fn failed(&self) -> Vec<(&Language, &str)> {
        self.languages
            .iter()
            .filter_map(|(l, o)| match o {
                LanguageOutcome::Failed { error } => Some((l, error.as_str())),
                LanguageOutcome::Published { .. } => None,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed().is_empty()
    }

    fn record(&mut self, language: Language, result: SyncResult<Vec<OutlineEntry>>) {
        let outcome = match result {
            Ok(created) => LanguageOutcome::Published { created },
            Err(e) => LanguageOutcome::Failed {
                error: e.to_string(),
            },
        };
        self.languages.insert(language, outcome);
    }
}

/// Orchestrates outline persistence against a remote collection.
#[derive(Clone)]
pub struct SyncEngine {
    collection: Arc<dyn OutlineCollection>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(collection: Arc<dyn OutlineCollection>, config: SyncConfig) -> Self {
        Self { collection, config }
    }

    pub fn collection(&self) -> &Arc<dyn OutlineCollection> {
        &self.collection
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs one remote call under the configured timeout.
    async fn timed<T>(
        &self,
        action: &str,
        call: impl Future<Output = SyncResult<T>>,
    ) -> SyncResult<T> {
        match tokio::time::timeout(self.config.request_timeout(), call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} on {} timed out after {:?}",
                    action,
                    self.collection.provider_name(),
                    self.config.request_timeout()
                );
                Err(SyncError::Timeout)
            }
        }
    }

    /// All entries of a publication, every language.
    pub async fn list_all(&self, publication: &PublicationId) -> SyncResult<Vec<OutlineEntry>> {
        self.timed("list outlines", self.collection.list_outlines(publication))
            .await
    }

    /// Entries of one language, flat, in remote order.
    pub async fn list_language(
        &self,
        publication: &PublicationId,
        language: &Language,
    ) -> SyncResult<Vec<OutlineEntry>> {
        let all = self.list_all(publication).await?;
        Ok(filter_language(&all, language))
    }

    /// The nested outline of one language.
    pub async fn fetch_tree(
        &self,
        publication: &PublicationId,
        language: &Language,
    ) -> SyncResult<Vec<OutlineNode>> {
        Ok(nest(self.list_language(publication, language).await?))
    }

    /// Replaces the outline of `(publication, language)` with `tree`.
    ///
    /// Deletes every existing entry of the language first, sequentially,
    /// then creates `tree` top-down. Returns the created entries in creation
    /// (pre-order) order. An empty `tree` just clears the language.
    pub async fn replace_outline(
        &self,
        publication: &PublicationId,
        language: &Language,
        tree: &[OutlineNode],
    ) -> SyncResult<Vec<OutlineEntry>> {
        let existing = self.list_language(publication, language).await?;
        debug!(
            "Replacing {} outline of {}: {} existing, {} new",
            language,
            publication,
            existing.len(),
            tree.iter().map(OutlineNode::size).sum::<usize>()
        );

        for entry in &existing {
            self.timed(
                "delete outline",
                self.collection.delete_outline(publication, &entry.id),
            )
            .await?;
        }

        let created = self.create_tree(publication, language, tree).await?;
        info!(
            "Replaced {} outline of {} with {} entries",
            language,
            publication,
            created.len()
        );
        Ok(created)
    }

    /// Creates `tree` without touching existing entries.
    ///
    /// Each child is sent with the server id of its already-created parent;
    /// roots are sent with `parentId: null`. Every entry is stamped with
    /// `language`.
    pub async fn create_tree(
        &self,
        publication: &PublicationId,
        language: &Language,
        tree: &[OutlineNode],
    ) -> SyncResult<Vec<OutlineEntry>> {
        let mut created = Vec::with_capacity(tree.iter().map(OutlineNode::size).sum());
        let mut pending: Vec<(&OutlineNode, Option<OutlineId>)> =
            tree.iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent_id)) = pending.pop() {
            let payload = NewOutline {
                language: language.clone(),
                ..node.entry.to_new(parent_id)
            };
            let entry = self
                .timed(
                    "create outline",
                    self.collection.create_outline(publication, &payload),
                )
                .await?;

            pending.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(entry.id.clone()))),
            );
            created.push(entry);
        }

        Ok(created)
    }

    /// Persists an edited tree, choosing the cheapest sequence of calls.
    ///
    /// `previous` is the language's flat outline as last fetched from the
    /// remote. Parent links are taken from the shape of `tree`. Field-only
    /// edits (same ids, shape and order) are sent as partial updates;
    /// anything structural falls back to
    /// [`replace_outline`](Self::replace_outline). Returns the language's
    /// resulting flat outline.
    pub async fn save_edits(
        &self,
        publication: &PublicationId,
        language: &Language,
        previous: &[OutlineEntry],
        tree: &[OutlineNode],
    ) -> SyncResult<Vec<OutlineEntry>> {
        let mut shaped = tree.to_vec();
        relink(&mut shaped);
        let next = flatten(&shaped);
        match diff(previous, &next) {
            OutlineDiff::Unchanged => {
                debug!("{} outline of {} unchanged", language, publication);
                Ok(previous.to_vec())
            }
            OutlineDiff::FieldEdits(edits) => {
                let mut result = previous.to_vec();
                for (id, patch) in &edits {
                    let updated = self
                        .timed(
                            "update outline",
                            self.collection.update_outline(publication, id, patch),
                        )
                        .await?;
                    if let Some(slot) = result.iter_mut().find(|e| &e.id == id) {
                        *slot = updated;
                    }
                }
                info!(
                    "Updated {} entries of the {} outline of {}",
                    edits.len(),
                    language,
                    publication
                );
                Ok(result)
            }
            OutlineDiff::Structural => self.replace_outline(publication, language, &shaped).await,
        }
    }

    /// Creates every staged draft under `publication`.
    ///
    /// Nothing is deleted first. The staged flat list is nested on its local
    /// ids so the draft hierarchy is recreated with server ids; entries with
    /// an unresolvable parent are created as roots. A language's draft is
    /// cleared only if all of its creates succeeded.
    pub async fn promote(
        &self,
        publication: &PublicationId,
        drafts: &mut DraftStore,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        for language in drafts.languages() {
            let tree = nest(drafts.staged(&language).to_vec());
            let result = self.create_tree(publication, &language, &tree).await;
            match &result {
                Ok(created) => {
                    info!("Promoted {} {} draft entries", created.len(), language);
                    drafts.clear(&language);
                }
                Err(e) => warn!("Failed to promote {} draft: {}", language, e),
            }
            report.record(language, result);
        }

        report
    }

    /// Republishes every language of `publication`, drafts included.
    ///
    /// Remote entries are grouped by language, staged drafts override their
    /// language, and each non-empty language is replaced independently. A
    /// failing language is reported and the others still run. Drafts of
    /// languages that succeeded are cleared.
    pub async fn publish_all(
        &self,
        publication: &PublicationId,
        drafts: &mut DraftStore,
    ) -> SyncResult<PublishReport> {
        let mut languages = group_by_language(self.list_all(publication).await?);
        for language in drafts.languages() {
            languages.insert(language.clone(), drafts.staged(&language).to_vec());
        }

        let mut report = PublishReport::default();
        for (language, entries) in languages {
            if entries.is_empty() {
                continue;
            }
            let tree = nest(entries);
            let result = self.replace_outline(publication, &language, &tree).await;
            match &result {
                Ok(_) => {
                    drafts.clear(&language);
                }
                Err(e) => warn!("Failed to publish {} outline: {}", language, e),
            }
            report.record(language, result);
        }

        Ok(report)
    }
}
