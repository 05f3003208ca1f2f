//! Core type definitions for Pagemark.
//!
//! This crate defines the small, dependency-light types shared by every
//! other crate in the workspace:
//! - Outline and publication identifiers (opaque strings, UUID v7 when minted locally)
//! - Document language tags
//!
//! Outline entries themselves live in `pagemark-outline`.

mod ids;
mod language;

pub use ids::{OutlineId, PublicationId};
pub use language::Language;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("invalid language tag: {0:?}")]
    InvalidLanguage(String),
}
