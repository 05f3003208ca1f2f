//! Operations behind the `pagemark` command line.
//!
//! Each function takes the engine or draft file it works on, so the binary
//! only parses arguments and prints the JSON these return.

use anyhow::{Context, Result};
use pagemark_outline::{
    DraftStore, OutlineEntry, OutlineNode, combined_view, flatten, group_by_language, nest,
    relink, validate,
};
use pagemark_pdf::{BookmarkImporter, LopdfSource, PdfSource};
use pagemark_sync::{
    EditorSession, HttpCollectionConfig, HttpOutlineCollection, PublishReport, SyncConfig,
    SyncEngine,
};
use pagemark_types::{Language, PublicationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api_base_url: String,
    /// Draft file used while no publication exists.
    pub drafts: PathBuf,
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let http = HttpCollectionConfig::default();
        Self {
            api_base_url: http.api_base_url,
            drafts: PathBuf::from("pagemark-drafts.json"),
            timeout_secs: http.timeout_secs,
        }
    }
}

impl CliConfig {
    pub fn http(&self) -> HttpCollectionConfig {
        HttpCollectionConfig {
            api_base_url: self.api_base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// The engine deadline matches the HTTP client's.
    pub fn sync(&self) -> SyncConfig {
        SyncConfig {
            timeout_ms: self.timeout_secs.saturating_mul(1000),
        }
    }

    /// Engine over the publication API.
    pub fn engine(&self) -> Result<SyncEngine> {
        let collection =
            HttpOutlineCollection::new(self.http()).context("Failed to create API client")?;
        Ok(SyncEngine::new(Arc::new(collection), self.sync()))
    }
}

/// Outline of one PDF language variant as read from its bookmarks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub language: Language,
    pub num_pages: u32,
    pub entries: usize,
    /// `true` when the PDF had no bookmarks and the staged draft was kept.
    pub from_fallback: bool,
    pub outline: Vec<OutlineNode>,
}

/// Imports the bookmarks of `pdf`. With `stage` the result replaces the
/// language's draft; a PDF without bookmarks leaves the draft as it was.
pub async fn import_pdf(
    pdf: &Path,
    language: &Language,
    drafts: &Path,
    stage: bool,
) -> Result<ImportSummary> {
    let source = LopdfSource::open(pdf)
        .await
        .with_context(|| format!("Failed to open {}", pdf.display()))?;
    let mut store = DraftStore::load(drafts)
        .await
        .context("Failed to load drafts")?;

    let fallback = store.display(language).to_vec();
    let outline = BookmarkImporter::new(language.clone())
        .import_or_fallback(&source, fallback.clone())
        .await;
    let from_fallback = outline == fallback;

    if stage && !from_fallback {
        store.stage_edit(language, flatten(&outline));
        store.persist().await.context("Failed to save drafts")?;
        info!("Staged {} imported entries for {}", store.staged(language).len(), language);
    }

    Ok(ImportSummary {
        language: language.clone(),
        num_pages: source.num_pages(),
        entries: outline.iter().map(OutlineNode::size).sum(),
        from_fallback,
        outline,
    })
}

/// Reads a nested outline from a JSON file.
pub async fn read_tree(path: &Path) -> Result<Vec<OutlineNode>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not an outline tree", path.display()))
}

/// Stamps `language` on every node, takes parent links from the nesting
/// and checks the tree before it is sent.
fn prepare(tree: &mut [OutlineNode], language: &Language, max_pages: Option<u32>) -> Result<()> {
    fn stamp(nodes: &mut [OutlineNode], language: &Language) {
        for node in nodes {
            node.entry.language = language.clone();
            stamp(&mut node.children, language);
        }
    }
    stamp(tree, language);
    relink(tree);
    validate(&flatten(tree), max_pages.unwrap_or(u32::MAX)).context("Invalid outline")
}

/// Persisted outlines of a publication, nested, per language.
pub async fn list_outlines(
    engine: &SyncEngine,
    publication: &PublicationId,
    language: Option<&Language>,
) -> Result<BTreeMap<Language, Vec<OutlineNode>>> {
    let entries = match language {
        Some(language) => engine.list_language(publication, language).await,
        None => engine.list_all(publication).await,
    }
    .context("Failed to load outlines")?;

    Ok(group_by_language(entries)
        .into_iter()
        .map(|(language, entries)| (language, nest(entries)))
        .collect())
}

/// Replaces one language of a publication with `tree`.
pub async fn replace_outline(
    engine: &SyncEngine,
    publication: &PublicationId,
    language: &Language,
    mut tree: Vec<OutlineNode>,
    max_pages: Option<u32>,
) -> Result<Vec<OutlineEntry>> {
    prepare(&mut tree, language, max_pages)?;
    engine
        .replace_outline(publication, language, &tree)
        .await
        .context("Failed to save outline")
}

/// Replaces a language's draft with `tree`. Returns the staged entry count.
pub async fn stage_draft(
    drafts: &Path,
    language: &Language,
    mut tree: Vec<OutlineNode>,
    max_pages: Option<u32>,
) -> Result<usize> {
    prepare(&mut tree, language, max_pages)?;
    let mut store = DraftStore::load(drafts)
        .await
        .context("Failed to load drafts")?;
    store.stage_edit(language, flatten(&tree));
    store.persist().await.context("Failed to save drafts")?;
    Ok(store.staged(language).len())
}

/// Staged drafts as the editor would show them, under temporary ids.
pub async fn show_drafts(
    drafts: &Path,
    language: Option<&Language>,
) -> Result<BTreeMap<Language, Vec<OutlineNode>>> {
    let store = DraftStore::load(drafts)
        .await
        .context("Failed to load drafts")?;
    let languages = match language {
        Some(language) => vec![language.clone()],
        None => store.languages(),
    };

    Ok(languages
        .into_iter()
        .map(|language| {
            let view = combined_view(&[], store.staged(&language), &language);
            (language, view)
        })
        .collect())
}

/// Creates the staged drafts under `publication` without touching what is
/// already there.
pub async fn promote_drafts(
    engine: &SyncEngine,
    publication: &PublicationId,
    drafts: &Path,
) -> Result<PublishReport> {
    let mut store = DraftStore::load(drafts)
        .await
        .context("Failed to load drafts")?;
    let report = engine.promote(publication, &mut store).await;
    store.persist().await.context("Failed to save drafts")?;
    Ok(report)
}

/// Republishes every language of `publication`, drafts included.
pub async fn publish(
    engine: SyncEngine,
    publication: PublicationId,
    drafts: &Path,
) -> Result<PublishReport> {
    let store = DraftStore::load(drafts)
        .await
        .context("Failed to load drafts")?;
    let mut session = EditorSession::init(engine, None, store)
        .await
        .context("Failed to start session")?;
    let report = session
        .publish(publication)
        .await
        .context("Failed to publish")?;
    session.teardown().await.context("Failed to save drafts")?;
    Ok(report)
}
