//! Converts a document's native bookmarks into outline nodes.

use crate::error::PdfResult;
use crate::source::{Bookmark, DestValue, Destination, PdfSource};
use pagemark_outline::{OutlineEntry, OutlineNode};
use pagemark_types::{Language, OutlineId};
use tracing::{debug, info, warn};

/// Page assigned when a bookmark's destination cannot be resolved.
pub const FALLBACK_PAGE: u32 = 1;

/// Imports bookmarks for one language.
///
/// A bookmark whose destination cannot be resolved lands on
/// [`FALLBACK_PAGE`]; its siblings and children are imported as usual.
#[derive(Debug, Clone)]
pub struct BookmarkImporter {
    language: Language,
}

impl BookmarkImporter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Imports the document outline. A document without one yields an
    /// empty list.
    pub async fn import(&self, source: &dyn PdfSource) -> PdfResult<Vec<OutlineNode>> {
        let Some(bookmarks) = source.get_outline().await? else {
            debug!("Document has no outline");
            return Ok(Vec::new());
        };

        // Pages are resolved in pre-order so the synchronous build below can
        // consume them in the same order.
        let mut pages = Vec::with_capacity(bookmarks.iter().map(Bookmark::size).sum());
        let mut stack: Vec<&Bookmark> = bookmarks.iter().rev().collect();
        while let Some(bookmark) = stack.pop() {
            pages.push(self.resolve_page(source, bookmark).await);
            stack.extend(bookmark.items.iter().rev());
        }

        let mut pages = pages.into_iter();
        let nodes = self.build(&bookmarks, None, &mut pages);
        info!(
            "Imported {} bookmarks for {}",
            nodes.iter().map(OutlineNode::size).sum::<usize>(),
            self.language
        );
        Ok(nodes)
    }

    /// Imports the outline, or returns `fallback` when the document has
    /// none or it cannot be read.
    pub async fn import_or_fallback(
        &self,
        source: &dyn PdfSource,
        fallback: Vec<OutlineNode>,
    ) -> Vec<OutlineNode> {
        match self.import(source).await {
            Ok(nodes) if !nodes.is_empty() => nodes,
            Ok(_) => fallback,
            Err(e) => {
                warn!("Failed to read outline, using stored outline: {}", e);
                fallback
            }
        }
    }

    fn build(
        &self,
        bookmarks: &[Bookmark],
        parent: Option<&OutlineId>,
        pages: &mut impl Iterator<Item = u32>,
    ) -> Vec<OutlineNode> {
        let mut nodes = Vec::with_capacity(bookmarks.len());
        for bookmark in bookmarks {
            let page = pages.next().unwrap_or(FALLBACK_PAGE);
            let title = match bookmark.title.trim() {
                "" => format!("Page {page}"),
                title => title.to_string(),
            };
            let entry = OutlineEntry::draft(title, page, parent.cloned(), self.language.clone());
            let children = self.build(&bookmark.items, Some(&entry.id), pages);
            nodes.push(OutlineNode { entry, children });
        }
        nodes
    }

    async fn resolve_page(&self, source: &dyn PdfSource, bookmark: &Bookmark) -> u32 {
        match page_for(source, bookmark.dest.as_ref()).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                debug!("Bookmark {:?} has no usable destination", bookmark.title);
                FALLBACK_PAGE
            }
            Err(e) => {
                warn!("Failed to resolve bookmark {:?}: {}", bookmark.title, e);
                FALLBACK_PAGE
            }
        }
    }
}

/// 1-indexed page a destination points at, if it points anywhere valid.
async fn page_for(source: &dyn PdfSource, dest: Option<&Destination>) -> PdfResult<Option<u32>> {
    let explicit = match dest {
        None => return Ok(None),
        Some(Destination::Explicit(values)) => values.clone(),
        Some(Destination::Named(name)) => match source.get_destination(name).await? {
            Some(values) => values,
            None => return Ok(None),
        },
    };

    let index = match explicit.first() {
        Some(DestValue::Ref(page)) => source.get_page_index(page).await?,
        // Some producers write a page index instead of a reference.
        Some(DestValue::Integer(i)) => match u32::try_from(*i) {
            Ok(i) => i,
            Err(_) => return Ok(None),
        },
        _ => return Ok(None),
    };

    let page = index.saturating_add(1);
    Ok((page <= source.num_pages()).then_some(page))
}
