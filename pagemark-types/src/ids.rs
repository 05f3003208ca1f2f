//! Identifier types used throughout Pagemark.
//!
//! Identifiers are opaque strings: the remote store assigns its own ids and
//! we keep them verbatim. Ids minted locally (drafts, PDF imports) are UUID v7
//! so they sort by creation time.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix of the placeholder ids given to staged entries that have none.
const TEMPORARY_PREFIX: &str = "temp-";

/// Unique identifier for one outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineId(String);

impl OutlineId {
    /// Mints a new locally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Placeholder id for the `index`-th staged entry of a language.
    #[must_use]
    pub fn temporary(index: usize) -> Self {
        Self(format!("{TEMPORARY_PREFIX}{index}"))
    }

    /// Wraps an id assigned elsewhere (usually by the server).
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns true for `temp-<n>` placeholder ids.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OutlineId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for OutlineId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

/// Identifier of a publication, the aggregate that owns per-language outlines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationId(String);

impl PublicationId {
    /// Wraps a server-assigned publication id.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(TypeError::InvalidId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PublicationId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
