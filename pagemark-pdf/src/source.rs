//! Narrow capability interface over a loaded PDF document.
//!
//! The bookmark importer and the renderer only ever see a [`PdfSource`], so
//! the parsing library behind it can change without touching either.

use crate::error::PdfResult;
use async_trait::async_trait;
use std::fmt;

/// Indirect reference to a page object (object number, generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRef {
    pub num: u32,
    pub generation: u16,
}

impl PageRef {
    pub fn new(num: u32, generation: u16) -> Self {
        Self { num, generation }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.generation)
    }
}

/// One element of an explicit destination array such as `[12 0 R /XYZ 0 792 0]`.
#[derive(Debug, Clone, PartialEq)]
pub enum DestValue {
    Ref(PageRef),
    Integer(i64),
    Number(f64),
    Name(String),
    Null,
}

/// Where a bookmark points.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// Named destination, resolved through the document's name table.
    Named(String),
    /// Explicit destination array; the first element designates the page.
    Explicit(Vec<DestValue>),
}

/// A node of the document's native outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub title: String,
    pub dest: Option<Destination>,
    pub items: Vec<Bookmark>,
}

impl Bookmark {
    /// Number of bookmarks in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.items.iter().map(Bookmark::size).sum::<usize>()
    }
}

/// Page geometry, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// 1-indexed page number.
    pub number: u32,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees (multiple of 90).
    pub rotation: i32,
}

/// The subset of a PDF document that Pagemark needs.
#[async_trait]
pub trait PdfSource: Send + Sync {
    /// Number of pages in the document.
    fn num_pages(&self) -> u32;

    /// Geometry of page `number` (1-indexed).
    async fn get_page(&self, number: u32) -> PdfResult<PageInfo>;

    /// The native outline, or `None` if the document has none.
    async fn get_outline(&self) -> PdfResult<Option<Vec<Bookmark>>>;

    /// Resolves a named destination to its explicit array.
    async fn get_destination(&self, name: &str) -> PdfResult<Option<Vec<DestValue>>>;

    /// Zero-based index of the page `page` refers to.
    async fn get_page_index(&self, page: &PageRef) -> PdfResult<u32>;
}
