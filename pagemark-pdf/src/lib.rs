//! PDF side of Pagemark.
//!
//! - [`PdfSource`]: the narrow view of a document the rest of the crate uses
//! - [`LopdfSource`]: that view over a file parsed with lopdf
//! - [`BookmarkImporter`]: native bookmarks to outline nodes with resolved pages
//! - [`RenderScheduler`]: one-at-a-time page renders with cancellation

mod error;
mod importer;
mod lopdf_source;
mod render;
mod source;

pub use error::{PdfError, PdfResult};
pub use importer::{BookmarkImporter, FALLBACK_PAGE};
pub use lopdf_source::LopdfSource;
pub use render::{PageRenderer, RenderOutcome, RenderScheduler};
pub use source::{Bookmark, DestValue, Destination, PageInfo, PageRef, PdfSource};

pub use tokio_util::sync::CancellationToken;
