//! Editor session context.
//!
//! One `EditorSession` exists per editing session. It owns the persisted
//! outline cache, the draft store and the active language, and decides where
//! a save goes: to the remote when a publication exists, to the drafts
//! otherwise.

use crate::engine::{PublishReport, SyncEngine};
use crate::error::SyncResult;
use pagemark_outline::{
    combined_view, flatten, group_by_language, nest, relink, DraftStore, OutlineEditor,
    OutlineEntry, OutlineNode,
};
use pagemark_types::{Language, PublicationId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Where a [`EditorSession::save`] ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the publication; holds the language's resulting entries.
    Persisted(Vec<OutlineEntry>),
    /// Staged as a draft; holds the number of staged entries.
    Staged(usize),
}

/// Session-scoped outline state.
pub struct EditorSession {
    engine: SyncEngine,
    publication: Option<PublicationId>,
    persisted: BTreeMap<Language, Vec<OutlineEntry>>,
    drafts: DraftStore,
    active: Language,
}

impl EditorSession {
    /// Starts a session, loading the publication's outlines if there is one.
    pub async fn init(
        engine: SyncEngine,
        publication: Option<PublicationId>,
        drafts: DraftStore,
    ) -> SyncResult<Self> {
        let mut session = Self {
            engine,
            publication,
            persisted: BTreeMap::new(),
            drafts,
            active: Language::default(),
        };
        session.refresh().await?;
        info!(
            "Editor session started ({} persisted languages, {} drafts)",
            session.persisted.len(),
            session.drafts.languages().len()
        );
        Ok(session)
    }

    /// Reloads the persisted cache from the remote.
    pub async fn refresh(&mut self) -> SyncResult<()> {
        self.persisted = match &self.publication {
            Some(publication) => group_by_language(self.engine.list_all(publication).await?),
            None => BTreeMap::new(),
        };
        Ok(())
    }

    /// Persists drafts and drops all cached state.
    pub async fn teardown(self) -> SyncResult<()> {
        self.drafts.persist().await?;
        debug!("Editor session closed");
        Ok(())
    }

    pub fn publication(&self) -> Option<&PublicationId> {
        self.publication.as_ref()
    }

    pub fn active_language(&self) -> &Language {
        &self.active
    }

    pub fn set_active_language(&mut self, language: Language) {
        self.active = language;
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    /// Persisted flat entries of a language.
    pub fn persisted(&self, language: &Language) -> &[OutlineEntry] {
        self.persisted
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// What the viewer shows: persisted entries followed by staged ones.
    pub fn outline(&self, language: &Language) -> Vec<OutlineNode> {
        combined_view(
            self.persisted(language),
            self.drafts.staged(language),
            language,
        )
    }

    /// Opens an editor on the language's current outline.
    ///
    /// With a publication the editor works on the persisted tree, so that
    /// [`save`](Self::save) can diff against it. Without one it works on the
    /// staged draft.
    pub fn open_editor(&self, language: &Language, max_pages: u32) -> OutlineEditor {
        let tree = match self.publication {
            Some(_) => nest(self.persisted(language).to_vec()),
            None => self.drafts.display(language).to_vec(),
        };
        OutlineEditor::open(language.clone(), max_pages, tree)
    }

    /// Saves an edited tree for `language`.
    pub async fn save(
        &mut self,
        language: &Language,
        tree: &[OutlineNode],
    ) -> SyncResult<SaveOutcome> {
        let Some(publication) = &self.publication else {
            let mut shaped = tree.to_vec();
            relink(&mut shaped);
            let flat = flatten(&shaped);
            let count = flat.len();
            self.drafts.stage_edit(language, flat);
            self.drafts.persist().await?;
            return Ok(SaveOutcome::Staged(count));
        };

        let previous = self.persisted(language).to_vec();
        let entries = self
            .engine
            .save_edits(publication, language, &previous, tree)
            .await?;
        self.persisted.insert(language.clone(), entries.clone());
        Ok(SaveOutcome::Persisted(entries))
    }

    /// Publishes everything under `publication` and binds the session to it.
    pub async fn publish(&mut self, publication: PublicationId) -> SyncResult<PublishReport> {
        let report = self
            .engine
            .publish_all(&publication, &mut self.drafts)
            .await?;
        self.publication = Some(publication);
        self.drafts.persist().await?;
        self.refresh().await?;
        Ok(report)
    }
}
