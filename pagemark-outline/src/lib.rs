//! Outline model and reconciliation for Pagemark.
//!
//! A publication carries one table of contents per language. This crate holds
//! everything about those outlines that does not touch the network:
//! - [`OutlineEntry`] / [`OutlineNode`]: flat and nested forms of an entry
//! - [`nest`] / [`flatten`]: conversion between the two, with orphan and cycle fallback
//! - [`diff`]: classifies an edit as unchanged, field-only or structural
//! - [`validate`]: full invariant check for outlines from untrusted sources
//! - [`OutlineEditor`]: bounded in-memory editing with cancel/save
//! - [`DraftStore`]: per-language staging for outlines with no publication yet

mod draft;
mod editor;
mod entry;
mod error;
mod tree;
mod validate;

pub use draft::{combined_view, DraftConfig, DraftStore};
pub use editor::{MoveDirection, OutlineEditor};
pub use entry::{NewOutline, OutlineEntry, OutlineNode, OutlinePatch};
pub use error::{OutlineError, OutlineResult};
pub use tree::{diff, filter_language, flatten, group_by_language, nest, relink, OutlineDiff};
pub use validate::{check_page, check_title, validate};
