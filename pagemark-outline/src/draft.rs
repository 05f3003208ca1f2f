//! Draft/staging store for outlines edited before a publication exists.
//!
//! Drafts are keyed by language. Each [`DraftStore::stage_edit`] overwrites
//! the previous draft for that language and refreshes the nested display
//! cache, so the editor renders staged outlines exactly like persisted ones.
//!
//! The store is optionally backed by a JSON file shaped as
//! `{ "<lang>": [OutlineEntry, ...] }`.

use crate::entry::{OutlineEntry, OutlineNode};
use crate::error::OutlineResult;
use crate::tree::{filter_language, nest};
use pagemark_types::{Language, OutlineId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Draft persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// File holding staged outlines between sessions.
    pub path: PathBuf,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pagemark-drafts.json"),
        }
    }
}

/// Staged outlines per language, with a nested display cache.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    path: Option<PathBuf>,
    staged: BTreeMap<Language, Vec<OutlineEntry>>,
    display: BTreeMap<Language, Vec<OutlineNode>>,
}

impl DraftStore {
    /// Creates an empty store that lives in memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that persists to `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Loads drafts from `path`. A missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> OutlineResult<Self> {
        let path = path.into();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No draft file at {:?}, starting empty", path);
                return Ok(Self::with_path(path));
            }
            Err(e) => return Err(e.into()),
        };

        let staged: BTreeMap<Language, Vec<OutlineEntry>> = serde_json::from_slice(&bytes)?;
        let mut store = Self::with_path(path);
        for (language, entries) in staged {
            store.stage_edit(&language, entries);
        }
        info!("Loaded drafts for {} language(s)", store.staged.len());
        Ok(store)
    }

    /// Writes all drafts to the backing file, if there is one.
    pub async fn persist(&self) -> OutlineResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&self.staged)?;
        fs::write(path, json).await?;
        debug!("Persisted drafts to {:?}", path);
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replaces the draft for `language`.
    ///
    /// Every entry is stamped with `language`, whatever it carried before.
    /// An empty list removes the draft.
    pub fn stage_edit(&mut self, language: &Language, mut entries: Vec<OutlineEntry>) {
        if entries.is_empty() {
            self.clear(language);
            return;
        }
        for entry in &mut entries {
            entry.language = language.clone();
        }
        self.display.insert(language.clone(), nest(entries.clone()));
        self.staged.insert(language.clone(), entries);
        debug!("Staged draft outline for {}", language);
    }

    /// The staged flat list for `language` (empty if none).
    pub fn staged(&self, language: &Language) -> &[OutlineEntry] {
        self.staged.get(language).map(Vec::as_slice).unwrap_or_default()
    }

    /// The cached nested tree for `language` (empty if none).
    pub fn display(&self, language: &Language) -> &[OutlineNode] {
        self.display.get(language).map(Vec::as_slice).unwrap_or_default()
    }

    /// Languages with a staged draft, in sorted order.
    pub fn languages(&self) -> Vec<Language> {
        self.staged.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Drops the draft for `language`, returning what was staged.
    pub fn clear(&mut self, language: &Language) -> Vec<OutlineEntry> {
        self.display.remove(language);
        self.staged.remove(language).unwrap_or_default()
    }

    /// Drops every draft.
    pub fn clear_all(&mut self) {
        self.staged.clear();
        self.display.clear();
    }
}

/// Persisted entries of `language` followed by its staged entries, nested.
///
/// Staged entries are relabelled `temp-<n>` (their index in the draft) so
/// they can never collide with server ids; their parent links are remapped
/// the same way.
pub fn combined_view(
    persisted: &[OutlineEntry],
    staged: &[OutlineEntry],
    language: &Language,
) -> Vec<OutlineNode> {
    let mut combined = filter_language(persisted, language);
    let drafts = filter_language(staged, language);

    let relabel: HashMap<OutlineId, OutlineId> = drafts
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), OutlineId::temporary(i)))
        .collect();

    combined.extend(drafts.into_iter().enumerate().map(|(i, mut entry)| {
        entry.id = OutlineId::temporary(i);
        entry.parent_id = entry
            .parent_id
            .map(|parent| relabel.get(&parent).cloned().unwrap_or(parent));
        entry
    }));

    nest(combined)
}
