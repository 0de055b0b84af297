//! Loader for JSON locale files on the local filesystem.

use async_trait::async_trait;
use localengine_core::{EngineConfig, LoadError, LoadedLocale, Loader, LocaleId, Metadata, TranslationTree};
use localengine_log::debug;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key of the metadata object inside a locale file.
const META_KEY: &str = "meta";

/// File stems probed inside a per-locale directory, after the tag itself.
const DIR_STEMS: [&str; 2] = ["locale", "translations"];

/// Reads `{base}/locales/*.json`.
///
/// For a locale `fr-FR` the files probed, in order, are:
///
/// - `locales/fr-FR.json`
/// - `locales/fr-FR/fr-FR.json`
/// - `locales/fr-FR/locale.json`
/// - `locales/fr-FR/translations.json`
///
/// A top-level `"meta"` object is read as [`Metadata`] and is not part of
/// the translation tree.
///
/// # Examples
///
/// ```no_run
/// use localengine_core::{EngineConfig, LocalEngine};
/// use localengine_loaders::JsonDirLoader;
/// use std::sync::Arc;
///
/// # async fn example() -> localengine_core::Result<()> {
/// let config = EngineConfig::new("./i18n");
/// let loader = JsonDirLoader::from_config(&config);
/// let engine = LocalEngine::new(Arc::new(loader), config).await?;
/// println!("{}", engine.get_text_or("greeting", "Hello").await);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonDirLoader {
    base: PathBuf,
}

impl JsonDirLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Loader rooted at the configured `base_path`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.base_path)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding the locale files.
    pub fn locales_dir(&self) -> PathBuf {
        self.base.join("locales")
    }

    /// Paths probed for `locale`, in order.
    pub fn candidate_paths(&self, locale: &LocaleId) -> Vec<PathBuf> {
        let dir = self.locales_dir();
        let tag = locale.as_str();
        let nested = dir.join(tag);

        let mut paths = vec![dir.join(format!("{}.json", tag)), nested.join(format!("{}.json", tag))];
        paths.extend(DIR_STEMS.iter().map(|stem| nested.join(format!("{}.json", stem))));
        paths
    }

    /// First existing file for `locale`.
    pub async fn locate(&self, locale: &LocaleId) -> Option<PathBuf> {
        for path in self.candidate_paths(locale) {
            if let Ok(meta) = tokio::fs::metadata(&path).await {
                if meta.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }
}

/// Parse the contents of a locale file.
pub fn parse_locale_json(locale: &LocaleId, content: &str) -> Result<LoadedLocale, LoadError> {
    let parse_error = |message: String| LoadError::Parse {
        locale: locale.to_string(),
        message,
    };

    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
    let serde_json::Value::Object(mut root) = value else {
        return Err(parse_error("top-level value must be an object".to_string()));
    };

    let metadata = match root.remove(META_KEY) {
        Some(meta @ serde_json::Value::Object(_)) => {
            serde_json::from_value::<Metadata>(meta).map_err(|e| parse_error(format!("invalid meta: {}", e)))?
        }
        Some(other) => {
            // Not a metadata block; keep it as a regular entry.
            root.insert(META_KEY.to_string(), other);
            Metadata::default()
        }
        None => Metadata::default(),
    };

    let tree = TranslationTree::from_json(serde_json::Value::Object(root)).unwrap_or_default();
    Ok(LoadedLocale::new(tree, metadata))
}

#[async_trait]
impl Loader for JsonDirLoader {
    async fn load(&self, locale: &LocaleId) -> Result<LoadedLocale, LoadError> {
        let path = self
            .locate(locale)
            .await
            .ok_or_else(|| LoadError::NotFound(locale.to_string()))?;

        debug!("Loading locale {} from {}", locale, path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        parse_locale_json(locale, &content)
    }

    async fn list_available(&self) -> Result<Vec<LocaleId>, LoadError> {
        let mut entries = match tokio::fs::read_dir(self.locales_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found = BTreeSet::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            let name = if file_type.is_dir() {
                path.file_name()
            } else if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem()
            } else {
                None
            };

            if let Some(locale) = name.and_then(|n| n.to_str()).and_then(|n| LocaleId::parse(n).ok()) {
                found.insert(locale);
            }
        }

        Ok(found.into_iter().collect())
    }
}
