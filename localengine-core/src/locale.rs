//! Locale identifiers.
//!
//! A [`LocaleId`] is a normalized `language[-REGION]` tag. Normalization
//! lower-cases the language, upper-cases the region and accepts `_` as a
//! separator, so comparisons between identifiers are case-insensitive.

use crate::error::{LocalEngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized locale identifier (e.g. `es-ES`).
///
/// # Examples
///
/// ```
/// use localengine_core::LocaleId;
///
/// let locale = LocaleId::parse("es_mx").unwrap();
/// assert_eq!(locale.as_str(), "es-MX");
/// assert_eq!(locale.language(), "es");
/// assert_eq!(locale.region(), Some("MX"));
/// assert_eq!(locale, LocaleId::parse("ES-mx").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId {
    tag: String,
    language_len: usize,
}

impl LocaleId {
    /// Parse and normalize a locale tag.
    ///
    /// The language must be 2-3 ASCII letters; the optional region must be
    /// 2 ASCII letters or a 3-digit UN M.49 code.
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || LocalEngineError::InvalidLocale(tag.to_string());
        let mut parts = tag.trim().split(['-', '_']);

        let language = parts.next().filter(|l| is_language(l)).ok_or_else(invalid)?;
        let region = match parts.next() {
            Some(region) if is_region(region) => Some(region),
            Some(_) => return Err(invalid()),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        let mut normalized = language.to_ascii_lowercase();
        let language_len = normalized.len();
        if let Some(region) = region {
            normalized.push('-');
            normalized.push_str(&region.to_ascii_uppercase());
        }

        Ok(Self {
            tag: normalized,
            language_len,
        })
    }

    /// Build an identifier from already separated parts.
    pub fn new(language: &str, region: Option<&str>) -> Result<Self> {
        match region {
            Some(region) => Self::parse(&format!("{}-{}", language, region)),
            None => Self::parse(language),
        }
    }

    /// The normalized tag.
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    /// Lower-case language segment.
    pub fn language(&self) -> &str {
        &self.tag[..self.language_len]
    }

    /// Upper-case region segment, if any.
    pub fn region(&self) -> Option<&str> {
        self.tag.get(self.language_len + 1..)
    }

    /// Whether the identifier carries a region segment.
    pub fn has_region(&self) -> bool {
        self.tag.len() > self.language_len
    }

    /// The same locale with the region stripped (`es-MX` → `es`).
    pub fn language_only(&self) -> Self {
        Self {
            tag: self.language().to_string(),
            language_len: self.language_len,
        }
    }
}

fn is_language(segment: &str) -> bool {
    (2..=3).contains(&segment.len()) && segment.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_region(segment: &str) -> bool {
    (segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic()))
        || (segment.len() == 3 && segment.chars().all(|c| c.is_ascii_digit()))
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl FromStr for LocaleId {
    type Err = LocalEngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocaleId {
    type Error = LocalEngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LocaleId> for String {
    fn from(locale: LocaleId) -> Self {
        locale.tag
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.tag
    }
}

impl PartialEq<str> for LocaleId {
    fn eq(&self, other: &str) -> bool {
        self.tag.eq_ignore_ascii_case(other.trim()) || LocaleId::parse(other).is_ok_and(|o| &o == self)
    }
}

impl PartialEq<&str> for LocaleId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
