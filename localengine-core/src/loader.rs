//! Collaborator interfaces and the in-memory loader.
//!
//! The engine never reads files or talks to the network itself. Everything
//! behind a locale identifier is fetched through a [`Loader`], and the
//! startup locale may come from an [`AutoDetector`].

use crate::error::LoadError;
use crate::locale::LocaleId;
use crate::tree::TranslationTree;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive data shipped alongside a locale's translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Version of the translation file
    #[serde(default)]
    pub version: Option<String>,
    /// Date the translations were last updated
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Locale as declared by the source
    #[serde(default)]
    pub locale: Option<String>,
}

/// Result of a successful load.
#[derive(Debug, Clone, Default)]
pub struct LoadedLocale {
    pub tree: TranslationTree,
    pub metadata: Metadata,
}

impl LoadedLocale {
    pub fn new(tree: TranslationTree, metadata: Metadata) -> Self {
        Self { tree, metadata }
    }
}

/// Source of locale data.
///
/// Implementations own their transport and timeout policy. They must not
/// call back into the engine.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Fetch and parse the data for one locale.
    async fn load(&self, locale: &LocaleId) -> Result<LoadedLocale, LoadError>;

    /// Locales this source can provide.
    async fn list_available(&self) -> Result<Vec<LocaleId>, LoadError>;
}

/// Detects the user's preferred locale once at engine construction.
pub trait AutoDetector: Send + Sync {
    fn detect(&self) -> Option<LocaleId>;
}

/// Detector that always answers with a fixed locale (or nothing).
#[derive(Debug, Clone, Default)]
pub struct FixedDetector(pub Option<LocaleId>);

impl AutoDetector for FixedDetector {
    fn detect(&self) -> Option<LocaleId> {
        self.0.clone()
    }
}

/// Loader backed by a map held in memory.
///
/// Locales can be added and removed while an engine is using the loader,
/// which makes it suitable for embedded translations and for tests.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    locales: RwLock<HashMap<LocaleId, LoadedLocale>>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_locale(self, locale: LocaleId, tree: TranslationTree) -> Self {
        self.insert(locale, tree, Metadata::default());
        self
    }

    /// Add or replace the data for a locale.
    pub fn insert(&self, locale: LocaleId, tree: TranslationTree, metadata: Metadata) {
        self.locales
            .write()
            .insert(locale, LoadedLocale::new(tree, metadata));
    }

    /// Remove a locale; later loads of it fail with `NotFound`.
    pub fn remove(&self, locale: &LocaleId) -> bool {
        self.locales.write().remove(locale).is_some()
    }
}

#[async_trait]
impl Loader for MemoryLoader {
    async fn load(&self, locale: &LocaleId) -> Result<LoadedLocale, LoadError> {
        self.locales
            .read()
            .get(locale)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(locale.to_string()))
    }

    async fn list_available(&self) -> Result<Vec<LocaleId>, LoadError> {
        let mut locales: Vec<LocaleId> = self.locales.read().keys().cloned().collect();
        locales.sort();
        Ok(locales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[tokio::test]
    async fn test_memory_loader_load_and_remove() {
        let loader = MemoryLoader::new().with_locale(
            locale("en-US"),
            TranslationTree::new().with("greeting", "Hello"),
        );

        let loaded = loader.load(&locale("en-us")).await.unwrap();
        assert_eq!(loaded.tree.resolve_text("greeting"), Some("Hello"));

        assert!(loader.remove(&locale("en-US")));
        assert!(matches!(
            loader.load(&locale("en-US")).await,
            Err(LoadError::NotFound(tag)) if tag == "en-US"
        ));
    }

    #[tokio::test]
    async fn test_memory_loader_lists_sorted() {
        let loader = MemoryLoader::new()
            .with_locale(locale("fr-FR"), TranslationTree::new())
            .with_locale(locale("de-DE"), TranslationTree::new());

        let available = loader.list_available().await.unwrap();
        assert_eq!(available, vec![locale("de-DE"), locale("fr-FR")]);
    }

    #[test]
    fn test_metadata_deserializes_partial() {
        let metadata: Metadata = serde_json::from_str(r#"{"version": "1.2"}"#).unwrap();
        assert_eq!(metadata.version.as_deref(), Some("1.2"));
        assert_eq!(metadata.description, None);
    }

    #[test]
    fn test_fixed_detector() {
        assert_eq!(FixedDetector(Some(locale("ja-JP"))).detect(), Some(locale("ja-JP")));
        assert_eq!(FixedDetector::default().detect(), None);
    }
}
