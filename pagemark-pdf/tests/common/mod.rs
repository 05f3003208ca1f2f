#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::{Document, Object, ObjectId, dictionary};
use pagemark_pdf::{
    Bookmark, DestValue, Destination, PageInfo, PageRef, PdfError, PdfResult, PdfSource,
};
use std::collections::HashMap;

// ── In-memory source ────────────────────────────────────────────

/// Document double: page `i` (0-based) is object `10 + i`.
#[derive(Default)]
pub struct FakeSource {
    pub pages: u32,
    pub outline: Option<Vec<Bookmark>>,
    pub named: HashMap<String, Vec<DestValue>>,
    pub outline_error: bool,
}

impl FakeSource {
    pub fn with_pages(pages: u32) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn outline(mut self, bookmarks: Vec<Bookmark>) -> Self {
        self.outline = Some(bookmarks);
        self
    }

    pub fn named(mut self, name: &str, dest: Vec<DestValue>) -> Self {
        self.named.insert(name.to_string(), dest);
        self
    }
}

pub fn page_ref(index: u32) -> PageRef {
    PageRef::new(10 + index, 0)
}

pub fn to_page(index: u32) -> Option<Destination> {
    Some(Destination::Explicit(vec![
        DestValue::Ref(page_ref(index)),
        DestValue::Name("Fit".into()),
    ]))
}

pub fn bookmark(title: &str, dest: Option<Destination>, items: Vec<Bookmark>) -> Bookmark {
    Bookmark {
        title: title.to_string(),
        dest,
        items,
    }
}

#[async_trait]
impl PdfSource for FakeSource {
    fn num_pages(&self) -> u32 {
        self.pages
    }

    async fn get_page(&self, number: u32) -> PdfResult<PageInfo> {
        if number == 0 || number > self.pages {
            return Err(PdfError::PageOutOfRange {
                page: number,
                num_pages: self.pages,
            });
        }
        Ok(PageInfo {
            number,
            width: 612.0,
            height: 792.0,
            rotation: 0,
        })
    }

    async fn get_outline(&self) -> PdfResult<Option<Vec<Bookmark>>> {
        if self.outline_error {
            return Err(PdfError::Malformed("broken /Outlines".into()));
        }
        Ok(self.outline.clone())
    }

    async fn get_destination(&self, name: &str) -> PdfResult<Option<Vec<DestValue>>> {
        Ok(self.named.get(name).cloned())
    }

    async fn get_page_index(&self, page: &PageRef) -> PdfResult<u32> {
        match page.num.checked_sub(10) {
            Some(index) if index < self.pages && page.generation == 0 => Ok(index),
            _ => Err(PdfError::UnknownPage(page.to_string())),
        }
    }
}

// ── Real documents ──────────────────────────────────────────────

/// Pages-only document skeleton; callers add outline objects before saving.
pub struct PdfBuilder {
    pub doc: Document,
    pub pages_id: ObjectId,
    pub page_ids: Vec<ObjectId>,
    pub catalog: lopdf::Dictionary,
}

impl PdfBuilder {
    pub fn new(page_count: usize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for _ in 0..page_count {
            page_ids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::from(id)).collect::<Vec<_>>(),
                "Count" => page_count as i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Rotate" => 90_i64,
            }),
        );

        Self {
            doc,
            pages_id,
            page_ids,
            catalog: dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            },
        }
    }

    pub fn explicit_dest(&self, index: usize) -> Object {
        Object::Array(vec![self.page_ids[index].into(), "Fit".into()])
    }

    /// Links `items` as siblings under an `/Outlines` dictionary and returns
    /// the ids of the item objects.
    pub fn outline(&mut self, items: Vec<lopdf::Dictionary>) -> Vec<ObjectId> {
        let outlines_id = self.doc.new_object_id();
        let ids = self.link_siblings(outlines_id, items);
        self.doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => ids[0],
                "Last" => ids[ids.len() - 1],
                "Count" => ids.len() as i64,
            }),
        );
        self.catalog.set("Outlines", outlines_id);
        ids
    }

    /// Hangs `items` under the existing outline item `parent`.
    pub fn children(&mut self, parent: ObjectId, items: Vec<lopdf::Dictionary>) -> Vec<ObjectId> {
        let ids = self.link_siblings(parent, items);
        if let Ok(Object::Dictionary(dict)) = self.doc.get_object_mut(parent) {
            dict.set("First", ids[0]);
            dict.set("Last", ids[ids.len() - 1]);
        }
        ids
    }

    fn link_siblings(&mut self, parent: ObjectId, items: Vec<lopdf::Dictionary>) -> Vec<ObjectId> {
        let ids: Vec<ObjectId> = items.iter().map(|_| self.doc.new_object_id()).collect();
        for (i, mut item) in items.into_iter().enumerate() {
            item.set("Parent", parent);
            if let Some(&next) = ids.get(i + 1) {
                item.set("Next", next);
            }
            if i > 0 {
                item.set("Prev", ids[i - 1]);
            }
            self.doc.objects.insert(ids[i], Object::Dictionary(item));
        }
        ids
    }

    pub fn save(mut self) -> Vec<u8> {
        let catalog_id = self.doc.add_object(self.catalog.clone());
        self.doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}
