//! [`PdfSource`] backed by lopdf.
//!
//! Walks `/Outlines` through `/First` and `/Next` links, reads `/Dest`
//! entries and `/A` GoTo actions, and resolves named destinations through
//! the `/Names` → `/Dests` name tree or the legacy catalog `/Dests`
//! dictionary.

use crate::error::{PdfError, PdfResult};
use crate::source::{Bookmark, DestValue, Destination, PageInfo, PageRef, PdfSource};
use async_trait::async_trait;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Outline nesting deeper than this is cut off.
const MAX_OUTLINE_DEPTH: usize = 64;
/// Upper bound on siblings at one outline level.
const MAX_SIBLINGS: usize = 10_000;
/// Upper bound on name tree and page tree recursion.
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when no `/MediaBox` is found.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A PDF document parsed with lopdf.
pub struct LopdfSource {
    doc: Document,
    /// 1-based page number to page object.
    pages: BTreeMap<u32, ObjectId>,
    /// Page object to 0-based index.
    page_index: HashMap<ObjectId, u32>,
}

impl std::fmt::Debug for LopdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfSource")
            .field("pages", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl LopdfSource {
    /// Parses a document held in memory.
    pub fn from_bytes(bytes: &[u8]) -> PdfResult<Self> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages();
        let page_index = pages
            .iter()
            .map(|(&number, &id)| (id, number.saturating_sub(1)))
            .collect();

        debug!("Loaded PDF with {} pages", pages.len());
        Ok(Self {
            doc,
            pages,
            page_index,
        })
    }

    /// Reads and parses a file without blocking the runtime.
    pub async fn open(path: impl AsRef<Path>) -> PdfResult<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        tokio::task::spawn_blocking(move || Self::from_bytes(&bytes))
            .await
            .map_err(|e| PdfError::Task(e.to_string()))?
    }

    /// Follows indirect references (bounded) to the underlying object.
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> Option<&'a Object> {
        for _ in 0..MAX_TREE_DEPTH {
            match obj {
                Object::Reference(id) => obj = self.doc.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        None
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj)?.as_dict().ok()
    }

    fn catalog(&self) -> Option<&Dictionary> {
        self.resolve_dict(self.doc.trailer.get(b"Root").ok()?)
    }

    fn outline_root(&self) -> Option<ObjectId> {
        let outlines = self.resolve_dict(self.catalog()?.get(b"Outlines").ok()?)?;
        match outlines.get(b"First") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    }

    fn walk_outline(
        &self,
        first: ObjectId,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<Bookmark> {
        let mut items = Vec::new();
        if depth >= MAX_OUTLINE_DEPTH {
            warn!("Outline deeper than {} levels, truncating", MAX_OUTLINE_DEPTH);
            return items;
        }

        let mut current = Some(first);
        while let Some(id) = current {
            if items.len() >= MAX_SIBLINGS || !visited.insert(id) {
                break;
            }
            let Some(dict) = self.doc.get_object(id).ok().and_then(|o| o.as_dict().ok()) else {
                break;
            };

            let title = dict
                .get(b"Title")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(object_text)
                .unwrap_or_default();
            let children = match dict.get(b"First") {
                Ok(Object::Reference(child)) => self.walk_outline(*child, depth + 1, visited),
                _ => Vec::new(),
            };

            items.push(Bookmark {
                title,
                dest: self.bookmark_dest(dict),
                items: children,
            });

            current = match dict.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
        items
    }

    /// `/Dest` first, then the `/D` of a GoTo action.
    fn bookmark_dest(&self, item: &Dictionary) -> Option<Destination> {
        if let Some(dest) = item.get(b"Dest").ok().and_then(|d| self.to_destination(d)) {
            return Some(dest);
        }

        let action = self.resolve_dict(item.get(b"A").ok()?)?;
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo" => {
                self.to_destination(action.get(b"D").ok()?)
            }
            _ => None,
        }
    }

    fn to_destination(&self, obj: &Object) -> Option<Destination> {
        match self.resolve(obj)? {
            Object::String(bytes, _) => Some(Destination::Named(decode_text(bytes))),
            Object::Name(name) => Some(Destination::Named(
                String::from_utf8_lossy(name).into_owned(),
            )),
            Object::Array(values) => Some(Destination::Explicit(
                values.iter().map(to_dest_value).collect(),
            )),
            Object::Dictionary(dict) => self.to_destination(dict.get(b"D").ok()?),
            _ => None,
        }
    }

    /// Explicit array of a name-table value (array, or dictionary with `/D`).
    fn dest_array(&self, value: &Object) -> Option<Vec<DestValue>> {
        match self.resolve(value)? {
            Object::Array(values) => Some(values.iter().map(to_dest_value).collect()),
            Object::Dictionary(dict) => self.dest_array(dict.get(b"D").ok()?),
            _ => None,
        }
    }

    fn lookup_name_tree<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &str,
        depth: usize,
    ) -> Option<&'a Object> {
        if depth >= MAX_TREE_DEPTH {
            return None;
        }

        if let Some(names) = node
            .get(b"Names")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
        {
            for pair in names.chunks(2) {
                let [key, value] = pair else { continue };
                let key = self.resolve(key).and_then(object_text);
                if key.as_deref() == Some(name) {
                    return Some(value);
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| self.resolve_dict(kid))
            .find_map(|kid| self.lookup_name_tree(kid, name, depth + 1))
    }

    fn named_destination(&self, name: &str) -> Option<Vec<DestValue>> {
        let catalog = self.catalog()?;

        let from_tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|o| self.resolve_dict(o))
            .and_then(|names| names.get(b"Dests").ok())
            .and_then(|o| self.resolve_dict(o))
            .and_then(|tree| self.lookup_name_tree(tree, name, 0))
            .and_then(|value| self.dest_array(value));
        if from_tree.is_some() {
            return from_tree;
        }

        let legacy = self.resolve_dict(catalog.get(b"Dests").ok()?)?;
        self.dest_array(legacy.get(name.as_bytes()).ok()?)
    }

    /// Looks `key` up on the page, then on its `/Parent` chain.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return self.resolve(value);
            }
            node = self.resolve_dict(node.get(b"Parent").ok()?)?;
        }
        None
    }
}

fn to_dest_value(obj: &Object) -> DestValue {
    match obj {
        Object::Reference((num, generation)) => DestValue::Ref(PageRef::new(*num, *generation)),
        Object::Integer(i) => DestValue::Integer(*i),
        Object::Real(r) => DestValue::Number(f64::from(*r)),
        Object::Name(name) => DestValue::Name(String::from_utf8_lossy(name).into_owned()),
        _ => DestValue::Null,
    }
}

fn object_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decodes a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[async_trait]
impl PdfSource for LopdfSource {
    fn num_pages(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    async fn get_page(&self, number: u32) -> PdfResult<PageInfo> {
        let out_of_range = || PdfError::PageOutOfRange {
            page: number,
            num_pages: self.num_pages(),
        };
        let id = *self.pages.get(&number).ok_or_else(out_of_range)?;
        let page = self
            .doc
            .get_object(id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .ok_or_else(|| PdfError::Malformed(format!("page {number} is not a dictionary")))?;

        let media_box = self
            .inherited(page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .and_then(|values| {
                let numbers: Vec<f64> = values.iter().filter_map(object_number).collect();
                <[f64; 4]>::try_from(numbers).ok()
            })
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let rotation = self
            .inherited(page, b"Rotate")
            .and_then(object_number)
            .map(|r| (r as i32).rem_euclid(360))
            .unwrap_or(0);

        Ok(PageInfo {
            number,
            width: (media_box[2] - media_box[0]).abs(),
            height: (media_box[3] - media_box[1]).abs(),
            rotation,
        })
    }

    async fn get_outline(&self) -> PdfResult<Option<Vec<Bookmark>>> {
        let Some(first) = self.outline_root() else {
            return Ok(None);
        };
        let bookmarks = self.walk_outline(first, 0, &mut HashSet::new());
        Ok((!bookmarks.is_empty()).then_some(bookmarks))
    }

    async fn get_destination(&self, name: &str) -> PdfResult<Option<Vec<DestValue>>> {
        Ok(self.named_destination(name))
    }

    async fn get_page_index(&self, page: &PageRef) -> PdfResult<u32> {
        self.page_index
            .get(&(page.num, page.generation))
            .copied()
            .ok_or_else(|| PdfError::UnknownPage(page.to_string()))
    }
}
