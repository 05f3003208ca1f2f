//! Invariant checks for flat outlines.
//!
//! The editor calls [`check_page`] and [`check_title`] on every edit. Full-set
//! validation ([`validate`]) is available to callers that accept outlines from
//! untrusted sources (files, other devices). The sync engine does not validate
//! pages: it replays whatever tree it is given.

use crate::entry::OutlineEntry;
use crate::error::{OutlineError, OutlineResult};
use pagemark_types::OutlineId;
use std::collections::{HashMap, HashSet};

/// Rejects pages outside `[1, total_pages]`.
pub fn check_page(page: u32, total_pages: u32) -> OutlineResult<()> {
    if page == 0 || page > total_pages {
        return Err(OutlineError::PageOutOfRange { page, total_pages });
    }
    Ok(())
}

/// Trims a title, rejecting empty results.
pub fn check_title(title: &str) -> OutlineResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(OutlineError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Checks every invariant of a flat outline and reports the first violation.
///
/// Order of checks: titles and pages, id uniqueness, parent existence and
/// language, then acyclicity.
pub fn validate(entries: &[OutlineEntry], total_pages: u32) -> OutlineResult<()> {
    let mut by_id: HashMap<&OutlineId, &OutlineEntry> = HashMap::with_capacity(entries.len());
    for e in entries {
        check_title(&e.title)?;
        check_page(e.page, total_pages)?;
        if by_id.insert(&e.id, e).is_some() {
            return Err(OutlineError::DuplicateId(e.id.clone()));
        }
    }

    for e in entries {
        let Some(parent_id) = &e.parent_id else {
            continue;
        };
        let parent = by_id.get(parent_id).ok_or_else(|| OutlineError::MissingParent {
            id: e.id.clone(),
            parent: parent_id.clone(),
        })?;
        if parent.language != e.language {
            return Err(OutlineError::CrossLanguageParent {
                id: e.id.clone(),
                language: e.language.clone(),
                parent: parent_id.clone(),
                parent_language: parent.language.clone(),
            });
        }
    }

    for e in entries {
        let mut seen = HashSet::new();
        let mut current = e;
        while let Some(parent_id) = &current.parent_id {
            if parent_id == &e.id {
                return Err(OutlineError::Cycle(e.id.clone()));
            }
            if !seen.insert(parent_id) {
                return Err(OutlineError::Cycle(parent_id.clone()));
            }
            match by_id.get(parent_id) {
                Some(parent) => current = *parent,
                None => break,
            }
        }
    }

    Ok(())
}
