//! Error types for outline editing and validation.

use pagemark_types::{Language, OutlineId};
use thiserror::Error;

/// Result type for outline operations.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// Errors raised when an outline violates its invariants or an edit is rejected.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// Title is empty after trimming.
    #[error("outline title must not be empty")]
    EmptyTitle,

    /// Page lies outside `[1, total_pages]`.
    #[error("page {page} is out of range 1..={total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// Two entries share an id.
    #[error("duplicate outline id: {0}")]
    DuplicateId(OutlineId),

    /// Referenced entry does not exist.
    #[error("outline entry not found: {0}")]
    NotFound(OutlineId),

    /// Parent reference points at an id outside the set.
    #[error("entry {id} references missing parent {parent}")]
    MissingParent { id: OutlineId, parent: OutlineId },

    /// Parent belongs to another language variant.
    #[error("entry {id} ({language}) has parent {parent} in language {parent_language}")]
    CrossLanguageParent {
        id: OutlineId,
        language: Language,
        parent: OutlineId,
        parent_language: Language,
    },

    /// Entry is its own ancestor.
    #[error("outline entry {0} is its own ancestor")]
    Cycle(OutlineId),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while persisting drafts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
