//! Document language tags.
//!
//! A publication carries one PDF and one outline per language. Tags are
//! short lower-case codes (`uz`, `ru`, `en`, `pt-br`).

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language tag of a document variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub const UZ: &'static str = "uz";
    pub const RU: &'static str = "ru";
    pub const EN: &'static str = "en";

    /// Parses and normalizes a tag.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let tag = s.trim().to_ascii_lowercase();
        let valid = !tag.is_empty()
            && tag.len() <= 16
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(TypeError::InvalidLanguage(s.to_string()));
        }
        Ok(Self(tag))
    }

    #[must_use]
    pub fn uz() -> Self {
        Self(Self::UZ.to_string())
    }

    #[must_use]
    pub fn ru() -> Self {
        Self(Self::RU.to_string())
    }

    #[must_use]
    pub fn en() -> Self {
        Self(Self::EN.to_string())
    }

    /// The languages the admin UI offers out of the box.
    #[must_use]
    pub fn builtin() -> [Language; 3] {
        [Self::uz(), Self::ru(), Self::en()]
    }

    /// Human readable name, if this is a built-in language.
    #[must_use]
    pub fn display_name(&self) -> Option<&'static str> {
        match self.0.as_str() {
            Self::UZ => Some("O'zbekcha"),
            Self::RU => Some("Русский"),
            Self::EN => Some("English"),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::uz()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Language {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}
